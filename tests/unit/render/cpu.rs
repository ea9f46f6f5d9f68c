use super::*;
use crate::render::backend::WarpBackend as _;

fn solid(size: SurfaceSize, rgba: [u8; 4]) -> FrameRgba {
    let mut data = Vec::with_capacity(size.width as usize * size.height as usize * 4);
    for _ in 0..size.width * size.height {
        data.extend_from_slice(&rgba);
    }
    FrameRgba::new(size.width, size.height, data).unwrap()
}

fn renderer(w: u32, h: u32) -> CpuWarpRenderer {
    CpuWarpRenderer::new(
        SurfaceSize::new(w, h).unwrap(),
        TargetRect::default(),
        WarpParams::default(),
    )
    .unwrap()
}

#[test]
fn expanded_frame_covers_the_whole_viewport() {
    let mut r = renderer(64, 64);
    let src = solid(SurfaceSize::new(64, 64).unwrap(), [10, 200, 30, 255]);
    let out = r.render(&src, 1.0).unwrap();
    assert_eq!(out.size(), SurfaceSize::new(64, 64).unwrap());
    for y in 0..64 {
        for x in 0..64 {
            assert_eq!(out.pixel(x, y), Some([10, 200, 30, 255]), "at {x},{y}");
        }
    }
}

#[test]
fn docked_frame_is_confined_to_the_target_rect() {
    let mut r = renderer(800, 600);
    let src = solid(SurfaceSize::new(192, 108).unwrap(), [255, 0, 0, 255]);
    let out = r.render(&src, 0.0).unwrap();

    // Dock bounds in pixels: x in [32, 312], y in [240, 540].
    for (x, y) in [(100u32, 400u32), (200, 300), (50, 500)] {
        assert_eq!(out.pixel(x, y).unwrap()[3], 255, "inside at {x},{y}");
    }
    for (x, y) in [(10u32, 400u32), (400, 400), (100, 100), (100, 580)] {
        assert_eq!(out.pixel(x, y).unwrap()[3], 0, "outside at {x},{y}");
    }
}

#[test]
fn outside_pixels_are_transparent_even_for_opaque_sources() {
    let mut r = renderer(100, 100);
    let src = solid(SurfaceSize::new(100, 100).unwrap(), [255, 255, 255, 255]);
    let out = r.render(&src, 0.0).unwrap();
    // Top-left corner is far outside the dock rect.
    assert_eq!(out.pixel(0, 0), Some([0, 0, 0, 0]));
}

#[test]
fn source_alpha_carries_through() {
    let mut r = renderer(64, 64);
    let src = solid(SurfaceSize::new(64, 64).unwrap(), [80, 80, 80, 128]);
    let out = r.render(&src, 1.0).unwrap();
    // Interior mask is 1, so alpha is the source's.
    assert_eq!(out.pixel(32, 32).unwrap()[3], 128);
}

#[test]
fn top_left_uv_origin_matches_source_rows() {
    // Top half red, bottom half blue; with equal aspects and progress 1 the
    // output must reproduce the rows in the same order (no vertical flip).
    let size = SurfaceSize::new(32, 32).unwrap();
    let mut data = Vec::new();
    for y in 0..32 {
        for _x in 0..32 {
            if y < 16 {
                data.extend_from_slice(&[255, 0, 0, 255]);
            } else {
                data.extend_from_slice(&[0, 0, 255, 255]);
            }
        }
    }
    let src = FrameRgba::new(32, 32, data).unwrap();

    let mut r = renderer(32, 32);
    let out = r.render(&src, 1.0).unwrap();
    assert_eq!(out.pixel(16, 2).unwrap()[0], 255, "top stays red");
    assert_eq!(out.pixel(16, 29).unwrap()[2], 255, "bottom stays blue");
}

#[test]
fn rendering_is_deterministic() {
    let mut r = renderer(120, 90);
    let src = solid(SurfaceSize::new(160, 90).unwrap(), [1, 2, 3, 200]);
    let a = r.render(&src, 0.37).unwrap();
    let b = r.render(&src, 0.37).unwrap();
    assert_eq!(a, b);
}

#[test]
fn resize_takes_effect_on_next_render() {
    let mut r = renderer(64, 64);
    let src = solid(SurfaceSize::new(64, 64).unwrap(), [9, 9, 9, 255]);
    assert_eq!(r.render(&src, 1.0).unwrap().size().width, 64);

    r.resize(SurfaceSize::new(32, 16).unwrap()).unwrap();
    let out = r.render(&src, 1.0).unwrap();
    assert_eq!(out.size(), SurfaceSize::new(32, 16).unwrap());
}

#[test]
fn non_finite_progress_is_rejected() {
    let mut r = renderer(8, 8);
    let src = solid(SurfaceSize::new(8, 8).unwrap(), [0, 0, 0, 255]);
    assert!(r.render(&src, f32::NAN).is_err());
}

#[test]
fn invalid_construction_is_rejected() {
    let bad_target = TargetRect {
        x: 0.9,
        y: 0.9,
        width: 0.5,
        height: 0.5,
    };
    assert!(
        CpuWarpRenderer::new(
            SurfaceSize::new(8, 8).unwrap(),
            bad_target,
            WarpParams::default()
        )
        .is_err()
    );
}
