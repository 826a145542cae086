//! Folio Core - Headless Presentation State Engine
//!
//! This crate owns the continuously updating presentation state of the
//! folio portfolio page (clock, theme, scroll projections, rotating
//! headline) and the transitions layered on top of it. It never renders
//! anything: a View Renderer reads the published state and a host feeds
//! in scroll events and applies document writes.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                         View Renderer                            │
//! │          watch::Receiver<...>  /  EngineSnapshot (read only)     │
//! └───────────────────────────────┬──────────────────────────────────┘
//!                                 │
//! ┌───────────────────────────────┼──────────────────────────────────┐
//! │                      PresentationEngine                          │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────┐  ┌──────────┐ │
//! │  │ ClockSource │  │ Preference  │  │   Scroll    │  │ Content  │ │
//! │  │  (1s tick)  │  │  Observer   │  │  Sampler    │  │ Rotator  │ │
//! │  └─────────────┘  └─────────────┘  └──────┬──────┘  └──────────┘ │
//! │                                           │                      │
//! │                          ┌────────────────┴────────────────┐     │
//! │                          │     TransitionOrchestrator      │     │
//! │                          │ reveal · scroll-to-top · tooltip│     │
//! │                          └─────────────────────────────────┘     │
//! └───────────────────────────────┬──────────────────────────────────┘
//!                                 │
//! ┌───────────────────────────────┴──────────────────────────────────┐
//! │  Host: Viewport · Document · EnvironmentPreferences · WallClock  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use folio_core::{
//!     host::{Host, MemoryDocument, RecordingViewport, StaticPreferences, SystemClock},
//!     load_config, PresentationEngine, ScrollSample,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let host = Host {
//!         viewport: Arc::new(RecordingViewport::new()),
//!         document: Arc::new(MemoryDocument::portfolio_page()),
//!         preferences: Arc::new(StaticPreferences::unavailable()),
//!         clock: Arc::new(SystemClock),
//!     };
//!     let engine = PresentationEngine::new(load_config()?, host)?;
//!     let _guard = engine.start()?;
//!
//!     engine.sampler().emit(ScrollSample::new(420.0, 900.0, 4000.0));
//!     println!("{:?}", engine.snapshot());
//!     Ok(())
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`clock`]: Fixed-zone clock producer and formatting
//! - [`preference`]: Theme preference and document theme synchronization
//! - [`scroll`]: Scroll sample fan-out and projections
//! - [`rotator`]: Fixed-cadence label rotation
//! - [`transition`]: Reveal, scroll-to-top, tooltips, micro-interactions
//! - [`engine`]: Lifecycle and read handles
//! - [`host`]: Collaborator traits and in-memory implementations
//! - [`theme`]: Theme literals and themed assets
//! - [`motion`]: Reduced-motion preference
//! - [`config`]: Engine configuration loading

#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]

pub mod clock;
pub mod config;
pub mod engine;
pub mod host;
pub mod motion;
pub mod preference;
pub mod rotator;
pub mod scroll;
pub mod subscription;
pub mod theme;
pub mod transition;

// Re-exports for convenience
pub use clock::{format_time, ClockFormat, ClockSource, ClockState};
pub use engine::{EngineError, EngineGuard, EngineSnapshot, PresentationEngine};
pub use host::{Document, EnvironmentPreferences, Host, ScrollBehavior, Viewport, WallClock};
pub use motion::MotionPreference;
pub use preference::{PreferenceObserver, ThemePreference};
pub use rotator::{ContentRotator, LabelCycle, RotationState, RotatorError};
pub use scroll::{project, ScrollSample, ScrollSampler, ScrollState, Section};
pub use subscription::{Subscription, TaskGuard};
pub use theme::{themed_asset, AssetKey, AssetRef};

// Transition exports
pub use transition::{
    micro_interaction, HoverState, InteractionTransform, ScrollTopButton, ScrollTopIcon,
    TooltipBoard, TooltipFrame, TooltipPhase, TransitionOrchestrator,
};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, ConfigError, ConfigOverrides,
    ConfigSource, EngineConfig,
};
