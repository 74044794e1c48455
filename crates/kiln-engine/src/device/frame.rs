/// A single acquired swapchain frame.
///
/// Holding the surface texture blocks acquisition of the next one; hand it to
/// [`Gpu::submit`](super::Gpu::submit) in the same iteration it was acquired.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
