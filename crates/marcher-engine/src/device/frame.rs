/// The frame currently being recorded.
///
/// Holding the surface texture blocks acquisition of the next one, so a frame
/// lives from `begin_frame` to `end_frame` only.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
