//! The per-pixel genie transform.
//!
//! Everything here is a pure function of its arguments; the renderers (CPU
//! rows, WGSL fragments) only differ in how they iterate output pixels. UV
//! space is top-left origin on both ends: `uv = (0, 0)` is the top-left
//! corner of the output surface, and `source_uv = (0, 0)` samples the top-left
//! of the video frame.

use std::f32::consts::PI;

use crate::{
    foundation::core::SurfaceSize,
    foundation::math::{mix, remap_axis, smoothstep},
    warp::params::{TargetRect, WarpParams},
};

/// Width of the smoothstep band that anti-aliases the clipped rectangle edge,
/// in remapped (sticker-space) units.
pub const MASK_EDGE: f32 = 0.007;

/// Shape parameter `sin((1 - progress) * PI)`.
///
/// Zero at both rest states (`progress` 0 and 1), peaking at 1 when
/// `progress = 0.5`: the bulge and ripple exist only mid-transition.
#[inline]
pub fn shape_param(progress: f32) -> f32 {
    ((1.0 - progress) * PI).sin()
}

/// Remap bounds for one output pixel: the interpolated dock/full rectangle
/// with the y edges perturbed by the curvature and wave terms.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WarpBox {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl WarpBox {
    /// Undistorted bounds: the dock rectangle at `progress = 0`, the unit
    /// square at `progress = 1`, linear in between.
    pub fn rest(progress: f32, target: &TargetRect) -> Self {
        Self {
            min_x: mix(target.x, 0.0, progress),
            max_x: mix(target.max_x(), 1.0, progress),
            min_y: mix(target.y, 0.0, progress),
            max_y: mix(target.max_y(), 1.0, progress),
        }
    }
}

/// Bounds for the pixel at `uv`, including the transition-only distortion.
///
/// The curvature term bulges both y edges symmetrically across x; the wave
/// term is a traveling ripple whose amplitude fades toward the right edge and
/// whose phase advances as progress decreases, so the surface visibly settles
/// while docking.
pub fn warp_box(uv: [f32; 2], progress: f32, target: &TargetRect, params: &WarpParams) -> WarpBox {
    let p = shape_param(progress);

    let curvature = (uv[0] * PI).sin() * params.squeeze_intensity * p;
    let wave = (uv[1] * params.wave_frequency + (1.0 - progress) * params.wave_speed).sin()
        * params.wave_intensity
        * p
        * (1.0 - uv[0]);

    let rest = WarpBox::rest(progress, target);
    WarpBox {
        min_x: rest.min_x,
        max_x: rest.max_x,
        min_y: rest.min_y + curvature + wave,
        max_y: rest.max_y - curvature - wave,
    }
}

/// Signed distance from `p` to a rounded box centered at the origin with the
/// given half-size; negative inside.
pub fn sd_rounded_box(p: [f32; 2], half_size: [f32; 2], radius: f32) -> f32 {
    let qx = p[0].abs() - half_size[0] + radius;
    let qy = p[1].abs() - half_size[1] + radius;
    let outside = (qx.max(0.0).powi(2) + qy.max(0.0).powi(2)).sqrt();
    outside + qx.max(qy).min(0.0) - radius
}

/// Anti-aliased clip mask for a remapped coordinate: 1 well inside the unit
/// box, falling to 0 over [`MASK_EDGE`] of signed distance.
pub fn clip_mask(remapped: [f32; 2], corner_radius: f32) -> f32 {
    let dist = sd_rounded_box(
        [remapped[0] - 0.5, remapped[1] - 0.5],
        [0.5, 0.5],
        corner_radius,
    );
    1.0 - smoothstep(0.0, MASK_EDGE, dist)
}

/// Cover-style aspect correction factors `(scale_x, scale_y)`.
///
/// Exactly one axis scales by the positive ratio of the larger to the smaller
/// aspect; equal aspects yield `(1, 1)`.
pub fn aspect_scale(container: SurfaceSize, source: SurfaceSize) -> [f32; 2] {
    let container_aspect = container.aspect();
    let source_aspect = source.aspect();
    if container_aspect > source_aspect {
        [1.0, container_aspect / source_aspect]
    } else {
        [source_aspect / container_aspect, 1.0]
    }
}

/// Result of warping one output pixel: where to sample the source, and the
/// edge mask to multiply into the sampled alpha.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WarpSample {
    /// Aspect-corrected source coordinate. May leave `[0, 1]` after the cover
    /// correction; samplers clamp to edge.
    pub source_uv: [f32; 2],
    /// Clip mask in `(0, 1]`; multiplied into the sampled alpha.
    pub mask: f32,
}

/// The complete per-pixel mapping.
///
/// Returns `None` for pixels that are fully transparent: the remapped
/// coordinate left `[0, 1]` on either axis, or the mask vanished. This is how
/// the dock silhouette is carved out of the full-viewport surface; outside
/// pixels are discarded, never border-sampled.
pub fn warp_uv(
    uv: [f32; 2],
    progress: f32,
    target: &TargetRect,
    params: &WarpParams,
    container: SurfaceSize,
    source: SurfaceSize,
) -> Option<WarpSample> {
    let bounds = warp_box(uv, progress, target, params);

    let remapped = [
        remap_axis(uv[0], bounds.min_x, bounds.max_x),
        remap_axis(uv[1], bounds.min_y, bounds.max_y),
    ];

    let mask = clip_mask(remapped, params.corner_radius);

    if remapped[0] > 1.0
        || remapped[0] < 0.0
        || remapped[1] > 1.0
        || remapped[1] < 0.0
        || mask <= 0.0
    {
        return None;
    }

    let scale = aspect_scale(container, source);
    let source_uv = [
        (remapped[0] - 0.5) / scale[0] + 0.5,
        (remapped[1] - 0.5) / scale[1] + 0.5,
    ];

    Some(WarpSample { source_uv, mask })
}

#[cfg(test)]
#[path = "../../tests/unit/warp/kernel.rs"]
mod tests;
