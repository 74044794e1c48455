use bytemuck::{Pod, Zeroable};

/// Bytes per pixel in the frame buffer.
pub const BYTES_PER_PIXEL: usize = 4;

/// 8-bit RGBA color, laid out exactly as one pixel in the frame buffer.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash, Pod, Zeroable)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Unpacks `0xRRGGBBAA`.
    pub const fn from_u32(packed: u32) -> Self {
        let [r, g, b, a] = packed.to_be_bytes();
        Self::new(r, g, b, a)
    }

    /// Packs into `0xRRGGBBAA`.
    pub const fn to_u32(self) -> u32 {
        u32::from_be_bytes([self.r, self.g, self.b, self.a])
    }
}

/// Fixed-size, row-major RGBA frame buffer for the logical game surface.
///
/// Storage is allocated once in [`new`](Self::new) and never resized. Writes
/// outside the surface are clipped silently.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Box<[Rgba]>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            pixels: vec![Rgba::BLACK; len].into_boxed_slice(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row.
    pub fn stride(&self) -> u32 {
        self.width * BYTES_PER_PIXEL as u32
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Raw bytes in upload order.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    pub fn clear(&mut self, color: Rgba) {
        self.pixels.fill(color);
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        let in_bounds = (0..i64::from(self.width)).contains(&x) && (0..i64::from(self.height)).contains(&y);
        in_bounds.then(|| y as usize * self.width as usize + x as usize)
    }

    /// Returns `false` when the point is clipped.
    pub fn set_pixel(&mut self, x: i64, y: i64, color: Rgba) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.pixels[i] = color;
                true
            }
            None => false,
        }
    }

    pub fn get_pixel(&self, x: i64, y: i64) -> Option<Rgba> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Fills the rectangle clipped to the surface. Empty or negative sizes draw nothing.
    pub fn fill_rect(&mut self, x: i64, y: i64, w: i64, h: i64, color: Rgba) {
        let x0 = x.clamp(0, i64::from(self.width));
        let y0 = y.clamp(0, i64::from(self.height));
        let x1 = x.saturating_add(w).clamp(0, i64::from(self.width));
        let y1 = y.saturating_add(h).clamp(0, i64::from(self.height));
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let width = self.width as usize;
        for row in y0 as usize..y1 as usize {
            let start = row * width;
            self.pixels[start + x0 as usize..start + x1 as usize].fill(color);
        }
    }
}
