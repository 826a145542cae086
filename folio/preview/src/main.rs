//! Folio Preview - Headless Presentation Engine Driver
//!
//! Runs the presentation engine against an in-memory page, replays a
//! scripted sequence of scroll positions, and logs every resulting state
//! snapshot as JSON. Useful for checking thresholds, section boundaries and
//! timing without a browser.
//!
//! # Usage
//!
//! ```bash
//! # Scroll down through the default page, then back to the top
//! folio-preview --scroll 0,250,900,1700,2600
//!
//! # Light theme, reduced motion, custom layout
//! folio-preview --light --reduce-motion \
//!     --sections about=0,work=1200,contact=2800 --scroll 400,1300,3000
//!
//! # Exercise a tooltip and a theme toggle
//! folio-preview --hover github --toggle-theme
//!
//! # Verbose logging
//! RUST_LOG=folio_core=trace folio-preview
//! ```
//!
//! Ctrl-C stops the script early; the engine is stopped cleanly either way.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{error, info};

use folio_core::host::{Host, MemoryDocument, RecordingViewport, StaticPreferences, SystemClock};
use folio_core::transition::EasingFunction;
use folio_core::{
    default_config_path, load_config_from_path, ConfigOverrides, MotionPreference,
    PresentationEngine, ScrollBehavior, ScrollSample, Section,
};

/// Frames used to play back a smooth scroll to the top
const SMOOTH_SCROLL_FRAMES: u32 = 8;

/// Folio Preview - scripted viewport for the presentation engine
#[derive(Parser, Debug)]
#[command(name = "folio-preview")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, env = "FOLIO_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Pretend the system prefers a light color scheme
    #[arg(long)]
    light: bool,

    /// Pretend the system asks for reduced motion
    #[arg(long)]
    reduce_motion: bool,

    /// Viewport height in pixels
    #[arg(long, default_value_t = 900.0)]
    viewport_height: f64,

    /// Document height in pixels
    #[arg(long, default_value_t = 4200.0)]
    document_height: f64,

    /// Section layout as id=offset pairs, in document order
    #[arg(
        long,
        value_delimiter = ',',
        value_parser = parse_section,
        default_value = "about=0,experience=800,projects=1600,contact=2400"
    )]
    sections: Vec<Section>,

    /// Scroll positions to replay, one per step
    #[arg(long, value_delimiter = ',', default_value = "0,250,900,1700,2600")]
    scroll: Vec<f64>,

    /// Time between scripted steps in milliseconds
    #[arg(long, default_value_t = 250)]
    step_ms: u64,

    /// Toggle the theme after the scroll script
    #[arg(long)]
    toggle_theme: bool,

    /// Hover the element with this id and play its tooltip
    #[arg(long, value_name = "ID")]
    hover: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "FOLIO_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

fn parse_section(raw: &str) -> Result<Section, String> {
    let (id, offset) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected id=offset, got '{raw}'"))?;
    let offset: f64 = offset
        .trim()
        .parse()
        .map_err(|e| format!("bad offset in '{raw}': {e}"))?;
    Ok(Section::new(id.trim(), offset))
}

/// Initialize logging with the specified level
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("folio_preview={level},folio_core={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

/// Scripted page: the engine plus the in-memory surfaces it writes to
struct Preview {
    engine: PresentationEngine,
    viewport: Arc<RecordingViewport>,
    geometry: ScrollSample,
    ticker: Interval,
}

impl Preview {
    fn log_snapshot(&self, step: &str) -> Result<()> {
        let snapshot = self.engine.snapshot();
        let json = serde_json::to_string(&snapshot).context("Failed to serialize snapshot")?;
        info!(step, snapshot = %json, "State");
        Ok(())
    }

    async fn scroll_to(&mut self, y: f64) {
        self.ticker.tick().await;
        self.engine.sampler().emit(self.geometry.at(y));
    }

    async fn run(&mut self, args: &Args) -> Result<()> {
        for &y in &args.scroll {
            self.scroll_to(y).await;
            self.log_snapshot("scroll")?;
        }

        if args.toggle_theme {
            self.ticker.tick().await;
            let theme = self.engine.toggle_theme();
            info!(is_dark = theme.is_dark, "Toggled theme");
            self.log_snapshot("toggle")?;
        }

        if let Some(ref id) = args.hover {
            self.play_tooltip(id).await?;
        }

        self.play_scroll_to_top().await?;
        Ok(())
    }

    async fn play_tooltip(&mut self, id: &str) -> Result<()> {
        let phase = self.engine.hover_enter(id);
        info!(id, ?phase, "Hover enter");
        for _ in 0..3 {
            self.ticker.tick().await;
            let frame = self.engine.tooltip_frame(id);
            info!(id, frame = %serde_json::to_string(&frame)?, "Tooltip");
        }

        let phase = self.engine.hover_exit(id);
        info!(id, ?phase, "Hover exit");
        self.ticker.tick().await;
        let frame = self.engine.tooltip_frame(id);
        info!(id, frame = %serde_json::to_string(&frame)?, "Tooltip");
        Ok(())
    }

    /// Request scroll-to-top and play the viewport's response back as
    /// samples, interpolated when the request is smooth
    async fn play_scroll_to_top(&mut self) -> Result<()> {
        let from = self.engine.sampler().latest().scroll_y;
        self.engine.scroll_to_top();

        let Some(command) = self.viewport.last_command() else {
            return Ok(());
        };
        info!(from, target = command.top, behavior = ?command.behavior, "Scroll to top");

        match command.behavior {
            ScrollBehavior::Instant => self.scroll_to(command.top).await,
            ScrollBehavior::Smooth => {
                let mut frames = tokio::time::interval(Duration::from_millis(16));
                frames.tick().await;
                for frame in 1..=SMOOTH_SCROLL_FRAMES {
                    frames.tick().await;
                    let t = frame as f32 / SMOOTH_SCROLL_FRAMES as f32;
                    let eased = f64::from(EasingFunction::EaseInOut.apply(t));
                    let y = from + (command.top - from) * eased;
                    self.engine.sampler().emit(self.geometry.at(y));
                }
            }
        }

        self.log_snapshot("top")?;
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level);

    info!("Folio preview starting");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config_path = args.config.clone().or_else(default_config_path);
    let mut config = load_config_from_path(config_path).context("Failed to load configuration")?;
    if args.reduce_motion {
        ConfigOverrides::new()
            .with_motion(MotionPreference::Reduced)
            .apply(&mut config);
    }
    info!(source = %config.source(), "Configuration loaded");

    let viewport = Arc::new(RecordingViewport::new());
    let host = Host {
        viewport: viewport.clone(),
        document: Arc::new(MemoryDocument::portfolio_page()),
        preferences: Arc::new(StaticPreferences {
            light_scheme: Some(args.light),
            reduced_motion: Some(args.reduce_motion),
        }),
        clock: Arc::new(SystemClock),
    };

    let engine = PresentationEngine::new(config, host).context("Failed to build engine")?;
    engine.sampler().set_sections(args.sections.clone());
    let guard = engine.start().context("Failed to start engine")?;

    let mut ticker = tokio::time::interval(Duration::from_millis(args.step_ms.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut preview = Preview {
        engine: engine.clone(),
        viewport,
        geometry: ScrollSample::new(0.0, args.viewport_height, args.document_height),
        ticker,
    };

    let result = tokio::select! {
        result = preview.run(&args) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl-C, stopping early");
            Ok(())
        }
    };

    guard.stop();

    match result {
        Ok(()) => {
            info!("Folio preview finished");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Preview stopped with error");
            Err(e)
        }
    }
}
