//! Render one mid-transition frame from a generated test card.
//!
//! Run with: `cargo run --example warp_one_frame`

use dockwarp::{
    BackendKind, FrameRgba, ScrollRange, StillSource, SurfaceSize, WarpSession, WarpSessionOpts,
};

fn test_card(size: SurfaceSize) -> FrameRgba {
    let mut data = vec![0u8; size.width as usize * size.height as usize * 4];
    for y in 0..size.height {
        for x in 0..size.width {
            let off = (y as usize * size.width as usize + x as usize) * 4;
            data[off] = (255 * x / size.width.max(1)) as u8;
            data[off + 1] = (255 * y / size.height.max(1)) as u8;
            data[off + 2] = 160;
            data[off + 3] = 255;
        }
    }
    FrameRgba::new(size.width, size.height, data).expect("test card dimensions are valid")
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let viewport = SurfaceSize::new(800, 600)?;
    let source = test_card(SurfaceSize::new(1920, 1080)?);

    let mut opts = WarpSessionOpts::new(viewport, ScrollRange::new(0.0, 1.0)?);
    opts.backend = BackendKind::Cpu;
    let mut sess = WarpSession::new(StillSource::new(source), opts)?;

    let frame = sess
        .advance(0.5)?
        .expect("still source is always ready");

    let out = std::env::temp_dir().join("dockwarp_warp_one_frame.png");
    image::save_buffer_with_format(
        &out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )?;
    eprintln!("wrote {}", out.display());
    Ok(())
}
