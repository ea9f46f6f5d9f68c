use std::path::Path;

use crate::{
    foundation::core::{FrameRgba, SurfaceSize},
    foundation::error::{DockwarpError, DockwarpResult},
    render::session::VideoSource,
};

/// A single still frame presented as an always-ready video source.
///
/// Useful for tests, the CLI and hosts that warp a poster image while the
/// real stream buffers.
pub struct StillSource {
    frame: FrameRgba,
}

impl StillSource {
    pub fn new(frame: FrameRgba) -> Self {
        Self { frame }
    }

    /// Decode any format the `image` crate recognizes into RGBA8.
    pub fn from_path(path: &Path) -> DockwarpResult<Self> {
        let img = image::open(path)
            .map_err(|e| DockwarpError::media(format!("decode '{}': {e}", path.display())))?
            .to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self {
            frame: FrameRgba::new(width, height, img.into_raw())?,
        })
    }
}

impl VideoSource for StillSource {
    fn poll_ready(&mut self) -> DockwarpResult<bool> {
        Ok(true)
    }

    fn dimensions(&self) -> Option<SurfaceSize> {
        Some(self.frame.size())
    }

    fn current_frame(&mut self) -> DockwarpResult<&FrameRgba> {
        Ok(&self.frame)
    }
}
