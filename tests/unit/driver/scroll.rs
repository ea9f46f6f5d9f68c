use super::*;

#[test]
fn range_rejects_bad_anchors() {
    assert!(ScrollRange::new(100.0, 100.0).is_err());
    assert!(ScrollRange::new(200.0, 100.0).is_err());
    assert!(ScrollRange::new(f64::NAN, 100.0).is_err());
    assert!(ScrollRange::new(0.0, f64::INFINITY).is_err());
    assert!(ScrollRange::new(0.0, 100.0).is_ok());
}

#[test]
fn ease_clamps_its_input() {
    assert_eq!(Ease::Linear.apply(-3.0), 0.0);
    assert_eq!(Ease::Linear.apply(7.0), 1.0);
    assert_eq!(Ease::InOutQuad.apply(0.5), 0.5);
    assert_eq!(Ease::InQuad.apply(0.5), 0.25);
}

#[test]
fn linear_progress_tracks_scroll_and_clamps() {
    let mut d = ProgressDriver::new(ScrollRange::new(100.0, 300.0).unwrap(), Ease::Linear);
    assert_eq!(d.update(-50.0).progress, 0.0);
    assert_eq!(d.update(100.0).progress, 0.0);
    assert_eq!(d.update(200.0).progress, 0.5);
    assert_eq!(d.update(300.0).progress, 1.0);
    assert_eq!(d.update(9000.0).progress, 1.0);
}

#[test]
fn backward_scroll_drives_progress_back() {
    let mut d = ProgressDriver::new(ScrollRange::new(0.0, 100.0).unwrap(), Ease::Linear);
    d.update(80.0);
    assert!((d.progress() - 0.8).abs() < 1e-6);
    d.update(20.0);
    assert!((d.progress() - 0.2).abs() < 1e-6);
}

#[test]
fn reveal_event_fires_exactly_on_toggle_frames() {
    let mut d = ProgressDriver::new(ScrollRange::new(0.0, 100.0).unwrap(), Ease::Linear);

    assert_eq!(d.update(50.0).reveal_changed, None);
    assert!(!d.revealed());

    // Crossing the threshold raises the event once.
    assert_eq!(d.update(96.0).reveal_changed, Some(true));
    assert!(d.revealed());
    assert_eq!(d.update(98.0).reveal_changed, None);
    assert_eq!(d.update(100.0).reveal_changed, None);

    // Scrolling back below lowers it again.
    assert_eq!(d.update(90.0).reveal_changed, Some(false));
    assert!(!d.revealed());
    assert_eq!(d.update(10.0).reveal_changed, None);
}

#[test]
fn reveal_threshold_is_inclusive() {
    let mut d = ProgressDriver::new(ScrollRange::new(0.0, 1.0).unwrap(), Ease::Linear);
    assert_eq!(d.update(0.95).reveal_changed, Some(true));
}

#[test]
fn eased_progress_stays_clamped_and_hits_endpoints() {
    for ease in [
        Ease::Linear,
        Ease::InQuad,
        Ease::OutQuad,
        Ease::InOutQuad,
        Ease::InCubic,
        Ease::OutCubic,
        Ease::InOutCubic,
    ] {
        let mut d = ProgressDriver::new(ScrollRange::new(0.0, 10.0).unwrap(), ease);
        assert_eq!(d.update(0.0).progress, 0.0);
        assert_eq!(d.update(10.0).progress, 1.0);
        for s in 0..=10 {
            let p = d.update(f64::from(s)).progress;
            assert!((0.0..=1.0).contains(&p));
        }
    }
}
