use crate::foundation::error::{DockwarpError, DockwarpResult};

/// Pixel dimensions of a render target or a decoded source frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> DockwarpResult<Self> {
        if width == 0 || height == 0 {
            return Err(DockwarpError::validation(
                "SurfaceSize dimensions must be > 0",
            ));
        }
        Ok(Self { width, height })
    }

    pub fn aspect(self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Straight-alpha RGBA8 frame, row-major, top row first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRgba {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl FrameRgba {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> DockwarpResult<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| DockwarpError::validation("FrameRgba dimensions overflow"))?;
        if width == 0 || height == 0 {
            return Err(DockwarpError::validation(
                "FrameRgba dimensions must be > 0",
            ));
        }
        if data.len() != expected {
            return Err(DockwarpError::validation(format!(
                "FrameRgba data length {} does not match {width}x{height}x4",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Fully transparent frame of the given size.
    pub fn transparent(size: SurfaceSize) -> Self {
        Self {
            width: size.width,
            height: size.height,
            data: vec![0; size.width as usize * size.height as usize * 4],
        }
    }

    pub fn size(&self) -> SurfaceSize {
        SurfaceSize {
            width: self.width,
            height: self.height,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let off = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.data[off],
            self.data[off + 1],
            self.data[off + 2],
            self.data[off + 3],
        ])
    }
}
