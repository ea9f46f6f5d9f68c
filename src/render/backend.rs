use crate::{
    foundation::core::{FrameRgba, SurfaceSize},
    foundation::error::DockwarpResult,
    warp::params::{TargetRect, WarpParams},
};

/// A renderer that turns (source frame, progress) into a composited RGBA
/// frame covering the viewport.
pub trait WarpBackend {
    /// Reconfigure the output viewport; takes effect on the next `render`
    /// call without restarting anything.
    fn resize(&mut self, viewport: SurfaceSize) -> DockwarpResult<()>;

    /// Render one frame. `source` is the latest decoded video frame;
    /// `progress` is the driver's current scalar.
    fn render(&mut self, source: &FrameRgba, progress: f32) -> DockwarpResult<FrameRgba>;
}

#[derive(Clone, Copy, Debug)]
pub enum BackendKind {
    Cpu,
    #[cfg(feature = "gpu")]
    Gpu,
}

pub fn create_backend(
    kind: BackendKind,
    viewport: SurfaceSize,
    target: TargetRect,
    params: WarpParams,
) -> DockwarpResult<Box<dyn WarpBackend>> {
    match kind {
        BackendKind::Cpu => Ok(Box::new(crate::render::cpu::CpuWarpRenderer::new(
            viewport, target, params,
        )?)),
        #[cfg(feature = "gpu")]
        BackendKind::Gpu => Ok(Box::new(crate::render::gpu::GpuWarpRenderer::new(
            viewport, target, params,
        )?)),
    }
}
