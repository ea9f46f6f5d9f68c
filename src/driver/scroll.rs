//! Scroll-to-progress mapping.
//!
//! The driver consumes a raw scroll offset (or any monotonic external
//! timeline position) once per presented frame and produces the clamped
//! progress scalar the renderer uniforms consume. Scroll physics, inertia and
//! pinning are the host's concern; scrolling backward simply drives progress
//! back toward 0, with no hysteresis.

use crate::foundation::error::{DockwarpError, DockwarpResult};

/// Progress level at which the companion overlay UI (play controls) reveals.
pub const REVEAL_THRESHOLD: f32 = 0.95;

#[derive(Clone, Copy, Debug, Default, serde::Serialize, serde::Deserialize)]
pub enum Ease {
    #[default]
    Linear,
    InQuad,
    OutQuad,
    InOutQuad,
    InCubic,
    OutCubic,
    InOutCubic,
}

impl Ease {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InQuad => t * t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
            Self::InCubic => t * t * t,
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
        }
    }
}

/// Start/end scroll anchors of the trigger region, in whatever unit the host
/// scroll system reports (pixels, unitless timeline position, ...).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScrollRange {
    pub start: f64,
    pub end: f64,
}

impl ScrollRange {
    pub fn new(start: f64, end: f64) -> DockwarpResult<Self> {
        if !start.is_finite() || !end.is_finite() {
            return Err(DockwarpError::validation(
                "ScrollRange anchors must be finite",
            ));
        }
        if start >= end {
            return Err(DockwarpError::validation(
                "ScrollRange start must be < end",
            ));
        }
        Ok(Self { start, end })
    }
}

/// One per-frame driver output.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DriverFrame {
    pub progress: f32,
    /// `Some(new_state)` exactly on the frame the reveal state toggles.
    pub reveal_changed: Option<bool>,
}

/// Maps scroll offsets to the progress scalar and tracks the reveal state.
///
/// Progress is purely a function of the current offset; the only retained
/// state is the last computed value and the reveal latch used for
/// edge-triggered change reporting.
#[derive(Clone, Debug)]
pub struct ProgressDriver {
    range: ScrollRange,
    ease: Ease,
    progress: f32,
    revealed: bool,
}

impl ProgressDriver {
    pub fn new(range: ScrollRange, ease: Ease) -> Self {
        Self {
            range,
            ease,
            progress: 0.0,
            revealed: false,
        }
    }

    /// Consume the current scroll offset; out-of-range offsets clamp.
    pub fn update(&mut self, scroll_offset: f64) -> DriverFrame {
        let span = self.range.end - self.range.start;
        let t = ((scroll_offset - self.range.start) / span).clamp(0.0, 1.0);
        self.progress = self.ease.apply(t) as f32;

        let now_revealed = self.progress >= REVEAL_THRESHOLD;
        let reveal_changed = if now_revealed != self.revealed {
            self.revealed = now_revealed;
            Some(now_revealed)
        } else {
            None
        };

        DriverFrame {
            progress: self.progress,
            reveal_changed,
        }
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn revealed(&self) -> bool {
        self.revealed
    }
}

#[cfg(test)]
#[path = "../../tests/unit/driver/scroll.rs"]
mod tests;
