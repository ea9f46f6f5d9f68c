//! ffmpeg-backed video probing and decoding (feature `media-ffmpeg`).
//!
//! `ffprobe`/`ffmpeg` are invoked as external binaries on `PATH`; without the
//! feature the entry points return a `Media` error so callers fall back to
//! still sources.

use std::path::{Path, PathBuf};

use crate::{
    foundation::core::{FrameRgba, SurfaceSize},
    foundation::error::{DockwarpError, DockwarpResult},
    render::session::VideoSource,
};

/// Probed stream metadata; dimensions are fixed once the stream is ready.
#[derive(Clone, Debug)]
pub struct VideoSourceInfo {
    pub source_path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub fps_num: u32,
    pub fps_den: u32,
    pub duration_sec: f64,
}

impl VideoSourceInfo {
    pub fn source_fps(&self) -> f64 {
        if self.fps_den == 0 {
            0.0
        } else {
            f64::from(self.fps_num) / f64::from(self.fps_den)
        }
    }
}

#[cfg(feature = "media-ffmpeg")]
pub fn probe_video(source_path: &Path) -> DockwarpResult<VideoSourceInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        r_frame_rate: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let out = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| DockwarpError::media(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(DockwarpError::media(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| DockwarpError::media(format!("ffprobe json parse failed: {e}")))?;
    let video_stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| DockwarpError::media("no video stream found"))?;
    let width = video_stream
        .width
        .ok_or_else(|| DockwarpError::media("missing video width from ffprobe"))?;
    let height = video_stream
        .height
        .ok_or_else(|| DockwarpError::media("missing video height from ffprobe"))?;

    let (fps_num, fps_den) = parse_ff_ratio(video_stream.r_frame_rate.as_deref().unwrap_or("0/1"))
        .ok_or_else(|| DockwarpError::media("invalid video r_frame_rate"))?;
    let duration_sec = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_ref())
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);

    Ok(VideoSourceInfo {
        source_path: source_path.to_path_buf(),
        width,
        height,
        fps_num,
        fps_den,
        duration_sec,
    })
}

#[cfg(not(feature = "media-ffmpeg"))]
pub fn probe_video(_source_path: &Path) -> DockwarpResult<VideoSourceInfo> {
    Err(DockwarpError::media(
        "video sources require the 'media-ffmpeg' feature",
    ))
}

#[cfg(feature = "media-ffmpeg")]
pub fn decode_video_frame_rgba8(
    source: &VideoSourceInfo,
    source_time_sec: f64,
) -> DockwarpResult<FrameRgba> {
    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-ss", &format!("{source_time_sec:.9}")])
        .arg("-i")
        .arg(&source.source_path)
        .args(["-frames:v", "1", "-f", "rawvideo", "-pix_fmt", "rgba", "pipe:1"])
        .output()
        .map_err(|e| DockwarpError::media(format!("failed to run ffmpeg for video decode: {e}")))?;

    if !out.status.success() {
        return Err(DockwarpError::media(format!(
            "ffmpeg video decode failed for '{}': {}",
            source.source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let expected_len = source.width as usize * source.height as usize * 4;
    if expected_len == 0 {
        return Err(DockwarpError::media(
            "decoded video frame size is zero (invalid source dimensions)",
        ));
    }
    if out.stdout.len() < expected_len {
        return Err(DockwarpError::media(format!(
            "decoded video frame has invalid size: got {} bytes, expected {expected_len}",
            out.stdout.len()
        )));
    }

    FrameRgba::new(
        source.width,
        source.height,
        out.stdout[..expected_len].to_vec(),
    )
}

#[cfg(not(feature = "media-ffmpeg"))]
pub fn decode_video_frame_rgba8(
    _source: &VideoSourceInfo,
    _source_time_sec: f64,
) -> DockwarpResult<FrameRgba> {
    Err(DockwarpError::media(
        "video sources require the 'media-ffmpeg' feature",
    ))
}

#[cfg(feature = "media-ffmpeg")]
fn parse_ff_ratio(s: &str) -> Option<(u32, u32)> {
    let (num, den) = s.split_once('/')?;
    let num = num.trim().parse::<u32>().ok()?;
    let den = den.trim().parse::<u32>().ok()?;
    if den == 0 { None } else { Some((num, den)) }
}

/// Looping video player backed by per-frame ffmpeg decodes.
///
/// Readiness is single-assignment: the first successful probe latches `info`;
/// before that, `poll_ready` keeps returning `false` (the probe itself failing
/// is an error, a missing feature is too). The playback clock is advanced
/// explicitly by the host (`advance_secs`), keeping frame selection
/// deterministic; decoded frames are cached per source frame index so scrubs
/// within one frame period cost nothing.
pub struct FfmpegSource {
    path: PathBuf,
    info: Option<VideoSourceInfo>,
    clock_sec: f64,
    cached: Option<(i64, FrameRgba)>,
}

impl FfmpegSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            info: None,
            clock_sec: 0.0,
            cached: None,
        }
    }

    pub fn info(&self) -> Option<&VideoSourceInfo> {
        self.info.as_ref()
    }

    /// Advance the playback clock; wraps at the stream duration so playback
    /// loops.
    pub fn advance_secs(&mut self, dt: f64) {
        self.clock_sec += dt.max(0.0);
        if let Some(info) = &self.info
            && info.duration_sec > 0.0
        {
            self.clock_sec %= info.duration_sec;
        }
    }

    pub fn seek(&mut self, secs: f64) {
        self.clock_sec = secs.max(0.0);
    }

    fn frame_index(&self, info: &VideoSourceInfo) -> i64 {
        let fps = info.source_fps();
        if fps <= 0.0 {
            0
        } else {
            (self.clock_sec * fps).floor() as i64
        }
    }
}

impl VideoSource for FfmpegSource {
    fn poll_ready(&mut self) -> DockwarpResult<bool> {
        if self.info.is_some() {
            return Ok(true);
        }
        let info = probe_video(&self.path)?;
        tracing::debug!(
            width = info.width,
            height = info.height,
            duration_sec = info.duration_sec,
            "probed video source"
        );
        self.info = Some(info);
        Ok(true)
    }

    fn dimensions(&self) -> Option<SurfaceSize> {
        let info = self.info.as_ref()?;
        SurfaceSize::new(info.width, info.height).ok()
    }

    fn current_frame(&mut self) -> DockwarpResult<&FrameRgba> {
        let info = self
            .info
            .clone()
            .ok_or_else(|| DockwarpError::media("video source is not ready"))?;
        let idx = self.frame_index(&info);

        let fresh = self.cached.as_ref().is_some_and(|(i, _)| *i == idx);
        if !fresh {
            let frame = decode_video_frame_rgba8(&info, self.clock_sec)?;
            self.cached = Some((idx, frame));
        }

        match &self.cached {
            Some((_, frame)) => Ok(frame),
            None => Err(DockwarpError::media("no decoded frame available")),
        }
    }
}
