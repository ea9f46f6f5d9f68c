use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use dockwarp::{
    BackendKind, Ease, FrameRgba, ScrollRange, StillSource, SurfaceSize, WarpConfig, WarpSession,
    WarpSessionOpts,
};

#[derive(Parser, Debug)]
#[command(name = "dockwarp", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single warped frame at a fixed progress as a PNG.
    Frame(FrameArgs),
    /// Render a dock-to-fullscreen sweep as numbered PNGs.
    Sweep(SweepArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input image used as the video frame.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Progress in [0, 1]; 0 = docked, 1 = full-bleed.
    #[arg(long, default_value_t = 0.5)]
    progress: f64,

    /// Viewport width in pixels.
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Viewport height in pixels.
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Optional JSON file overriding target rect and warp parameters.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct SweepArgs {
    /// Input image used as the video frame.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Number of frames across the sweep.
    #[arg(long, default_value_t = 60)]
    frames: u32,

    /// Viewport width in pixels.
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Viewport height in pixels.
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Easing applied across the sweep.
    #[arg(long, default_value = "in-out-quad")]
    ease: String,

    /// Optional JSON file overriding target rect and warp parameters.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output directory for frame_NNNN.png files.
    #[arg(long)]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Sweep(args) => cmd_sweep(args),
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<WarpConfig> {
    let Some(path) = path else {
        return Ok(WarpConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config '{}'", path.display()))?;
    let cfg: WarpConfig =
        serde_json::from_str(&text).with_context(|| format!("parse config '{}'", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

fn parse_ease(s: &str) -> anyhow::Result<Ease> {
    Ok(match s.trim().to_ascii_lowercase().as_str() {
        "linear" => Ease::Linear,
        "in-quad" => Ease::InQuad,
        "out-quad" => Ease::OutQuad,
        "in-out-quad" => Ease::InOutQuad,
        "in-cubic" => Ease::InCubic,
        "out-cubic" => Ease::OutCubic,
        "in-out-cubic" => Ease::InOutCubic,
        other => anyhow::bail!("unknown ease '{other}'"),
    })
}

fn session_for(
    in_path: &PathBuf,
    width: u32,
    height: u32,
    ease: Ease,
    cfg: WarpConfig,
) -> anyhow::Result<WarpSession<StillSource>> {
    let viewport = SurfaceSize::new(width, height)?;
    let source = StillSource::from_path(in_path)?;

    // The sweep is driven by a synthetic scroll offset in [0, 1].
    let mut opts = WarpSessionOpts::new(viewport, ScrollRange::new(0.0, 1.0)?);
    opts.ease = ease;
    opts.target = cfg.target;
    opts.params = cfg.params;
    opts.backend = BackendKind::Cpu;

    Ok(WarpSession::new(source, opts)?)
}

fn write_png(frame: &FrameRgba, out: &PathBuf) -> anyhow::Result<()> {
    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", out.display()))
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_ref())?;
    let mut sess = session_for(&args.in_path, args.width, args.height, Ease::Linear, cfg)?;

    let frame = sess
        .advance(args.progress.clamp(0.0, 1.0))?
        .context("source reported not ready for a still image")?;
    write_png(&frame, &args.out)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_sweep(args: SweepArgs) -> anyhow::Result<()> {
    anyhow::ensure!(args.frames > 0, "--frames must be > 0");
    let cfg = load_config(args.config.as_ref())?;
    let ease = parse_ease(&args.ease)?;
    let mut sess = session_for(&args.in_path, args.width, args.height, ease, cfg)?;

    for i in 0..args.frames {
        let scroll = if args.frames == 1 {
            1.0
        } else {
            f64::from(i) / f64::from(args.frames - 1)
        };
        let frame = sess
            .advance(scroll)?
            .context("source reported not ready for a still image")?;
        let out = args.out_dir.join(format!("frame_{i:04}.png"));
        write_png(&frame, &out)?;
    }

    eprintln!(
        "wrote {} frames to {} (revealed: {})",
        args.frames,
        args.out_dir.display(),
        sess.revealed()
    );
    Ok(())
}
