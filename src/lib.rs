//! Dockwarp warps a live video surface between a small docked rectangle and
//! the full viewport (the "genie" transform) as a pure per-pixel function of
//! a scroll-driven progress scalar.
//!
//! # Pipeline overview
//!
//! 1. **Drive**: [`ProgressDriver`] maps a scroll offset across an anchor
//!    range to `progress` in `[0, 1]` (clamped, optionally eased) and raises a
//!    discrete "reveal" event near full expansion.
//! 2. **Warp**: [`warp_uv`] remaps every output pixel to a source-sampling
//!    coordinate plus an anti-aliased clip mask. The kernel is stateless and
//!    deterministic: same inputs, bit-identical output.
//! 3. **Render**: [`CpuWarpRenderer`] evaluates the kernel row-parallel on the
//!    CPU; with the `gpu` feature, `GpuWarpRenderer` runs the same algorithm
//!    as a WGSL fragment shader and reads the frame back.
//! 4. **Loop**: [`WarpSession`] polls a [`VideoSource`] once per presented
//!    frame, idling until the source reports ready, and reconfigures
//!    synchronously on resize.
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic-by-default**: the warp kernel and CPU backend are pure;
//!   no hidden state survives a frame except the driver's progress.
//! - **Straight RGBA8 end-to-end**: sources and output frames carry straight
//!   (non-premultiplied) alpha; compositing against the page is the host's
//!   job.
//! - **Top-left UV origin** on both the output surface and the source frame
//!   (`uv.y = 0` is the top row), so no flip happens at sampling time.
#![forbid(unsafe_code)]

mod driver;
mod foundation;
mod media;
mod render;
mod warp;

pub use driver::scroll::{DriverFrame, Ease, ProgressDriver, REVEAL_THRESHOLD, ScrollRange};
pub use foundation::core::{FrameRgba, SurfaceSize};
pub use foundation::error::{DockwarpError, DockwarpResult};
pub use media::still::StillSource;
pub use media::video::{FfmpegSource, VideoSourceInfo, decode_video_frame_rgba8, probe_video};
pub use render::backend::{BackendKind, WarpBackend, create_backend};
pub use render::cpu::CpuWarpRenderer;
#[cfg(feature = "gpu")]
pub use render::gpu::GpuWarpRenderer;
pub use render::session::{VideoSource, WarpSession, WarpSessionOpts};
pub use warp::kernel::{
    MASK_EDGE, WarpBox, WarpSample, aspect_scale, clip_mask, sd_rounded_box, shape_param, warp_box,
    warp_uv,
};
pub use warp::params::{TargetRect, WarpConfig, WarpParams};
