use crate::foundation::error::{DockwarpError, DockwarpResult};

/// Docked position and size of the surface at `progress = 0`, in normalized
/// UI space (top-left origin, both axes in `[0, 1]`).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TargetRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for TargetRect {
    fn default() -> Self {
        Self {
            x: 0.04,
            y: 0.4,
            width: 0.35,
            height: 0.5,
        }
    }
}

impl TargetRect {
    pub fn validate(&self) -> DockwarpResult<()> {
        let vals = [self.x, self.y, self.width, self.height];
        if vals.iter().any(|v| !v.is_finite()) {
            return Err(DockwarpError::validation("TargetRect fields must be finite"));
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(DockwarpError::validation(
                "TargetRect width and height must be > 0",
            ));
        }
        if self.x < 0.0 || self.y < 0.0 || self.x + self.width > 1.0 || self.y + self.height > 1.0 {
            return Err(DockwarpError::validation(
                "TargetRect must lie within the unit square",
            ));
        }
        Ok(())
    }

    pub fn max_x(&self) -> f32 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f32 {
        self.y + self.height
    }
}

/// Cosmetic tuning constants for the transition's curvature and wave terms.
///
/// `corner_radius` rounds the clipped silhouette; it is carried through both
/// backends but defaults to 0 (square corners), the only exercised value.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WarpParams {
    pub squeeze_intensity: f32,
    pub wave_intensity: f32,
    pub wave_frequency: f32,
    pub wave_speed: f32,
    pub corner_radius: f32,
}

impl Default for WarpParams {
    fn default() -> Self {
        Self {
            squeeze_intensity: 0.12,
            wave_intensity: 0.04,
            wave_frequency: 6.0,
            wave_speed: 12.0,
            corner_radius: 0.0,
        }
    }
}

impl WarpParams {
    pub fn validate(&self) -> DockwarpResult<()> {
        let vals = [
            self.squeeze_intensity,
            self.wave_intensity,
            self.wave_frequency,
            self.wave_speed,
            self.corner_radius,
        ];
        if vals.iter().any(|v| !v.is_finite()) {
            return Err(DockwarpError::validation("WarpParams fields must be finite"));
        }
        if self.corner_radius < 0.0 {
            return Err(DockwarpError::validation(
                "WarpParams corner_radius must be >= 0",
            ));
        }
        Ok(())
    }
}

/// Serializable bundle of the two tuning structs, used by the CLI's
/// `--config` JSON file.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct WarpConfig {
    pub target: TargetRect,
    pub params: WarpParams,
}

impl WarpConfig {
    pub fn validate(&self) -> DockwarpResult<()> {
        self.target.validate()?;
        self.params.validate()
    }
}
