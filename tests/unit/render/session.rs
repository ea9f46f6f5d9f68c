use super::*;
use crate::foundation::error::DockwarpError;

/// Source that becomes ready only after a fixed number of polls, mimicking a
/// stream that is still buffering.
struct BufferingSource {
    polls_until_ready: u32,
    polls_seen: u32,
    frame: FrameRgba,
}

impl BufferingSource {
    fn new(polls_until_ready: u32) -> Self {
        let size = SurfaceSize::new(16, 16).unwrap();
        let mut frame = FrameRgba::transparent(size);
        for px in frame.data.chunks_exact_mut(4) {
            px.copy_from_slice(&[50, 60, 70, 255]);
        }
        Self {
            polls_until_ready,
            polls_seen: 0,
            frame,
        }
    }
}

impl VideoSource for BufferingSource {
    fn poll_ready(&mut self) -> DockwarpResult<bool> {
        self.polls_seen += 1;
        Ok(self.polls_seen > self.polls_until_ready)
    }

    fn dimensions(&self) -> Option<SurfaceSize> {
        (self.polls_seen > self.polls_until_ready).then(|| self.frame.size())
    }

    fn current_frame(&mut self) -> DockwarpResult<&FrameRgba> {
        Ok(&self.frame)
    }
}

struct FailingSource;

impl VideoSource for FailingSource {
    fn poll_ready(&mut self) -> DockwarpResult<bool> {
        Ok(true)
    }

    fn dimensions(&self) -> Option<SurfaceSize> {
        SurfaceSize::new(8, 8).ok()
    }

    fn current_frame(&mut self) -> DockwarpResult<&FrameRgba> {
        Err(DockwarpError::media("decoder died"))
    }
}

fn opts(viewport: SurfaceSize) -> WarpSessionOpts {
    WarpSessionOpts::new(viewport, ScrollRange::new(0.0, 1.0).unwrap())
}

#[test]
fn session_idles_until_the_source_is_ready() {
    let viewport = SurfaceSize::new(32, 32).unwrap();
    let mut sess = WarpSession::new(BufferingSource::new(2), opts(viewport)).unwrap();

    assert!(sess.advance(0.0).unwrap().is_none());
    assert!(sess.advance(0.0).unwrap().is_none());
    let frame = sess.advance(0.0).unwrap().expect("ready on third poll");
    assert_eq!(frame.size(), viewport);
    assert_eq!(sess.source().polls_seen, 3);
}

#[test]
fn readiness_is_latched_after_first_success() {
    let mut sess = WarpSession::new(
        BufferingSource::new(0),
        opts(SurfaceSize::new(16, 16).unwrap()),
    )
    .unwrap();
    for _ in 0..5 {
        assert!(sess.advance(0.5).unwrap().is_some());
    }
    // One poll only; later frames reuse the latched readiness.
    assert_eq!(sess.source().polls_seen, 1);
}

#[test]
fn advance_drives_progress_and_reveal() {
    let mut sess = WarpSession::new(
        BufferingSource::new(0),
        opts(SurfaceSize::new(16, 16).unwrap()),
    )
    .unwrap();

    sess.advance(0.5).unwrap();
    assert!((sess.progress() - 0.5).abs() < 1e-6);
    assert!(!sess.revealed());

    sess.advance(1.0).unwrap();
    assert!(sess.revealed());

    sess.advance(0.2).unwrap();
    assert!(!sess.revealed());
}

#[test]
fn resize_applies_before_the_next_frame() {
    let mut sess = WarpSession::new(
        BufferingSource::new(0),
        opts(SurfaceSize::new(64, 48).unwrap()),
    )
    .unwrap();
    assert_eq!(
        sess.advance(1.0).unwrap().unwrap().size(),
        SurfaceSize::new(64, 48).unwrap()
    );

    let smaller = SurfaceSize::new(20, 10).unwrap();
    sess.resize(smaller).unwrap();
    assert_eq!(sess.advance(1.0).unwrap().unwrap().size(), smaller);
}

#[test]
fn source_failures_propagate() {
    let mut sess =
        WarpSession::new(FailingSource, opts(SurfaceSize::new(8, 8).unwrap())).unwrap();
    let err = sess.advance(0.0).unwrap_err();
    assert!(err.to_string().contains("decoder died"));
}

#[test]
fn expanded_session_frame_is_fully_covered() {
    let mut sess = WarpSession::new(
        BufferingSource::new(0),
        opts(SurfaceSize::new(16, 16).unwrap()),
    )
    .unwrap();
    let frame = sess.advance(1.0).unwrap().unwrap();
    for y in 0..16 {
        for x in 0..16 {
            assert_eq!(frame.pixel(x, y), Some([50, 60, 70, 255]));
        }
    }
}
