use anyhow::Result;
use ouroboros::self_referencing;
use winit::dpi::LogicalSize;
use winit::window::Window;

use crate::config::{HostConfig, PresentFailurePolicy};
use crate::device::{Gpu, GpuInit};
use crate::error::{DisplayInitError, PresentError};
use crate::window::Platform;

use super::blit::Blit;
use super::pixels::PixelBuffer;
use super::{Display, should_escalate};

#[self_referencing]
struct DisplayHandle {
    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

/// Exclusive owner of the window, GPU surface, frame texture and pixel buffer.
///
/// Field order is drop order: texture and pipeline, then surface and window,
/// then the pixel buffer.
pub struct EngineContext {
    blit: Blit,
    display: DisplayHandle,
    pixels: PixelBuffer,
    present_failure: PresentFailurePolicy,
    dropped_frames: u64,
}

impl EngineContext {
    /// Opens the output window and allocates display resources.
    ///
    /// Nothing partially built survives an error; whatever was created is
    /// dropped before returning.
    pub fn create(
        platform: &mut Platform,
        config: &HostConfig,
        gpu_init: GpuInit,
    ) -> std::result::Result<Self, DisplayInitError> {
        Self::try_create(platform, config, gpu_init).map_err(DisplayInitError)
    }

    fn try_create(platform: &mut Platform, config: &HostConfig, gpu_init: GpuInit) -> Result<Self> {
        anyhow::ensure!(
            config.game_width > 0 && config.game_height > 0,
            "game surface has zero size"
        );

        let (out_w, out_h) = config.output_size();
        let attrs = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(LogicalSize::new(out_w, out_h))
            .with_resizable(false);

        let window = platform.open_window(attrs)?;

        let display = DisplayHandleTryBuilder {
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()?;

        let blit = display.with_gpu(|gpu| {
            Blit::new(gpu.device(), gpu.surface_format(), config.game_width, config.game_height)
        });

        log::info!(
            "display ready: {}x{} surface shown at {}x{}",
            config.game_width,
            config.game_height,
            out_w,
            out_h
        );

        Ok(Self {
            blit,
            display,
            pixels: PixelBuffer::new(config.game_width, config.game_height),
            present_failure: config.present_failure,
            dropped_frames: 0,
        })
    }

    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    /// Frames skipped because the surface was unavailable.
    pub fn dropped_frames(&self) -> u64 {
        self.dropped_frames
    }
}

impl Drop for EngineContext {
    fn drop(&mut self) {
        if self.dropped_frames > 0 {
            log::warn!("{} frames were not presented", self.dropped_frames);
        }
        log::debug!("releasing display resources");
    }
}

impl Display for EngineContext {
    fn pixels_mut(&mut self) -> &mut PixelBuffer {
        &mut self.pixels
    }

    fn present(&mut self) -> std::result::Result<(), PresentError> {
        let blit = &self.blit;
        let pixels = &self.pixels;
        let policy = self.present_failure;

        let outcome = self.display.with_mut(|fields| {
            let gpu = fields.gpu;
            blit.upload(gpu.queue(), pixels);

            let mut frame = match gpu.begin_frame() {
                Ok(frame) => frame,
                Err(err) => {
                    let action = gpu.handle_surface_error(&err);
                    return Err((err, action));
                }
            };

            blit.draw(&mut frame.encoder, &frame.view);
            fields.window.pre_present_notify();
            gpu.submit(frame);
            Ok(())
        });

        match outcome {
            Ok(()) => Ok(()),
            Err((err, action)) if should_escalate(action, policy) => {
                log::error!("present failed: {err}");
                Err(PresentError::Surface(err))
            }
            Err((err, action)) => {
                self.dropped_frames += 1;
                log::warn!("frame dropped ({action:?}): {err}");
                Ok(())
            }
        }
    }
}
