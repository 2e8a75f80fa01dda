//! Hand gesture mouse: control the pointer with hand gestures in front of a camera.

use anyhow::{Context, Result};
use clap::Parser;
use hand_gesture_mouse::{
    app::{install_signal_handlers, GestureMouseApp},
    config::{Config, GesturePreset},
    constants::{FALLBACK_SCREEN_HEIGHT, FALLBACK_SCREEN_WIDTH},
    cursor_control::X11InputSink,
    input::{FixedScreen, InputSink, LogSink, ScreenGeometry},
    mapper::ScreenSize,
    pipeline::GesturePipeline,
    source::{LandmarkSource, ReplaySource},
};
use log::info;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,

    /// Camera index to use
    #[arg(long)]
    cam: Option<i32>,

    /// Replay recorded landmarks (JSON lines) instead of using the camera
    #[arg(short, long)]
    replay: Option<PathBuf>,

    /// Replay pacing in frames per second (as fast as possible if unset)
    #[arg(long)]
    replay_fps: Option<f64>,

    /// Log input commands instead of injecting them
    #[arg(long)]
    dry_run: bool,

    /// Gesture table preset
    #[arg(short, long, value_enum)]
    preset: Option<GesturePreset>,

    /// Cursor smoothing factor (1 = no smoothing)
    #[arg(short, long)]
    smoothing: Option<u32>,

    /// Active region margin in camera pixels
    #[arg(short, long)]
    margin: Option<u32>,

    /// Do not open the overlay window
    #[arg(long)]
    no_gui: bool,

    /// Stop after this many frames
    #[arg(long)]
    max_frames: Option<u64>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

impl Args {
    /// Apply command-line overrides on top of the file configuration
    fn apply(&self, config: &mut Config) {
        if let Some(cam) = self.cam {
            config.camera.index = cam;
        }
        if let Some(preset) = self.preset {
            config.gestures.preset = preset;
            config.gestures.rules = None;
        }
        if let Some(smoothing) = self.smoothing {
            config.cursor.smoothing_factor = smoothing;
        }
        if let Some(margin) = self.margin {
            config.cursor.frame_margin = margin;
        }
        if self.no_gui {
            config.display.enabled = false;
        }
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    info!(
        "Hand Gesture Mouse {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_TARGET")
    );

    // Load configuration if provided
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            Config::from_file(path).with_context(|| format!("Failed to load {}", path.display()))?
        }
        None => Config::default(),
    };
    args.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    // Input sink and screen geometry
    let fallback = FixedScreen(
        config
            .screen_override()
            .unwrap_or(ScreenSize::new(FALLBACK_SCREEN_WIDTH, FALLBACK_SCREEN_HEIGHT)),
    );
    let (sink, screen): (Box<dyn InputSink>, ScreenSize) = if args.dry_run {
        info!("Dry run: input commands are logged only");
        (Box::new(LogSink), fallback.screen_size()?)
    } else {
        let x11 = X11InputSink::new().context("Failed to initialize X11 input injection")?;
        let screen = match config.screen_override() {
            Some(screen) => screen,
            None => x11.screen_size()?,
        };
        (Box::new(x11), screen)
    };
    info!("Mapping onto a {}x{} screen", screen.width, screen.height);

    let pipeline = GesturePipeline::from_config(&config, sink, screen)?;
    let source = open_source(&args, &config)?;

    let stop = install_signal_handlers();
    let mut app = GestureMouseApp::new(source, pipeline, stop).with_max_frames(args.max_frames);
    let stats = app.run()?;

    info!(
        "Processed {} frames ({} with a hand) at {:.1} FPS",
        stats.frames, stats.hand_frames, stats.fps
    );

    Ok(())
}

/// Replay file if given, otherwise the camera
fn open_source(args: &Args, config: &Config) -> Result<Box<dyn LandmarkSource>> {
    if let Some(path) = &args.replay {
        let mut source = ReplaySource::open(path)?;
        if let Some(fps) = args.replay_fps {
            source = source.with_fps(fps);
        }
        return Ok(Box::new(source));
    }
    camera_source(config)
}

#[cfg(feature = "vision")]
fn camera_source(config: &Config) -> Result<Box<dyn LandmarkSource>> {
    let camera = hand_gesture_mouse::vision::CameraSource::new(config, config.display.enabled)?;
    Ok(Box::new(camera))
}

#[cfg(not(feature = "vision"))]
fn camera_source(_config: &Config) -> Result<Box<dyn LandmarkSource>> {
    anyhow::bail!("This build has no camera support; pass --replay <file> or rebuild with the `vision` feature")
}
