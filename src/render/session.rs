//! The per-frame loop: poll the source, drive progress, render.
//!
//! Single-threaded and cooperative: the host invokes [`WarpSession::advance`]
//! once per presented frame with the current scroll offset. Progress updates
//! and frame decodes are asynchronous with respect to each other; the session
//! reads the most recently available value of each with no tearing protection
//! beyond "render whatever is current this frame".

use crate::{
    driver::scroll::{Ease, ProgressDriver, ScrollRange},
    foundation::core::{FrameRgba, SurfaceSize},
    foundation::error::DockwarpResult,
    render::backend::{BackendKind, WarpBackend, create_backend},
    warp::params::{TargetRect, WarpParams},
};

/// A decoded-video collaborator, polled (never pushed) by the session.
///
/// Readiness is single-assignment: once `poll_ready` has returned `true`,
/// `dimensions` must stay `Some` and constant, and `current_frame` must
/// return the latest decoded frame at those dimensions.
pub trait VideoSource {
    /// Cheap per-frame readiness probe. Returning `false` is not an error;
    /// the session idles and re-polls next frame.
    fn poll_ready(&mut self) -> DockwarpResult<bool>;

    /// Native pixel dimensions, `None` until ready.
    fn dimensions(&self) -> Option<SurfaceSize>;

    /// Latest decoded frame. Only called after `poll_ready` returned `true`.
    fn current_frame(&mut self) -> DockwarpResult<&FrameRgba>;
}

/// Session configuration; everything beyond viewport and scroll anchors has
/// sensible defaults.
#[derive(Clone, Copy, Debug)]
pub struct WarpSessionOpts {
    pub viewport: SurfaceSize,
    pub scroll_range: ScrollRange,
    pub ease: Ease,
    pub target: TargetRect,
    pub params: WarpParams,
    pub backend: BackendKind,
}

impl WarpSessionOpts {
    pub fn new(viewport: SurfaceSize, scroll_range: ScrollRange) -> Self {
        Self {
            viewport,
            scroll_range,
            ease: Ease::default(),
            target: TargetRect::default(),
            params: WarpParams::default(),
            backend: BackendKind::Cpu,
        }
    }
}

/// Owns the driver, the render backend and the video source for one effect
/// instance. All GPU/decoder resources are released when the session drops.
pub struct WarpSession<S: VideoSource> {
    driver: ProgressDriver,
    backend: Box<dyn WarpBackend>,
    source: S,
    ready: bool,
}

impl<S: VideoSource> WarpSession<S> {
    pub fn new(source: S, opts: WarpSessionOpts) -> DockwarpResult<Self> {
        let backend = create_backend(opts.backend, opts.viewport, opts.target, opts.params)?;
        Ok(Self {
            driver: ProgressDriver::new(opts.scroll_range, opts.ease),
            backend,
            source,
            ready: false,
        })
    }

    /// One frame of the loop.
    ///
    /// Returns `Ok(None)` while the source is not ready (the caller should
    /// simply present nothing and call again next frame), otherwise the
    /// composited frame for the current scroll offset.
    #[tracing::instrument(skip(self))]
    pub fn advance(&mut self, scroll_offset: f64) -> DockwarpResult<Option<FrameRgba>> {
        if !self.ready {
            if !self.source.poll_ready()? {
                return Ok(None);
            }
            self.ready = true;
            tracing::debug!(dimensions = ?self.source.dimensions(), "video source ready");
        }

        let frame = self.driver.update(scroll_offset);
        if let Some(revealed) = frame.reveal_changed {
            tracing::debug!(revealed, "reveal state changed");
        }

        let source_frame = self.source.current_frame()?;
        let out = self.backend.render(source_frame, frame.progress)?;
        Ok(Some(out))
    }

    /// Reconfigure the output viewport before the next frame.
    pub fn resize(&mut self, viewport: SurfaceSize) -> DockwarpResult<()> {
        tracing::debug!(?viewport, "resize");
        self.backend.resize(viewport)
    }

    pub fn progress(&self) -> f32 {
        self.driver.progress()
    }

    /// Companion-UI signal: true once progress has reached the reveal
    /// threshold, false again when scrolled back below it.
    pub fn revealed(&self) -> bool {
        self.driver.revealed()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/session.rs"]
mod tests;
