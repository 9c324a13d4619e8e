use crate::coords::Viewport;

/// GPU handles and surface facts for one frame.
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub surface_format: wgpu::TextureFormat,
    /// Surface size in physical pixels.
    pub surface: Viewport,
}

impl<'a> RenderCtx<'a> {
    pub fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        surface: Viewport,
    ) -> Self {
        Self { device, queue, surface_format, surface }
    }

    /// Whether writes to the surface are sRGB-encoded by the hardware.
    #[inline]
    pub fn surface_is_srgb(&self) -> bool {
        self.surface_format.is_srgb()
    }
}

/// The acquired surface texture and the encoder recording into it.
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub surface_view: &'a wgpu::TextureView,
}

impl<'a> RenderTarget<'a> {
    pub fn new(encoder: &'a mut wgpu::CommandEncoder, surface_view: &'a wgpu::TextureView) -> Self {
        Self { encoder, surface_view }
    }
}
