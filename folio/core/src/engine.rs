//! Presentation Engine
//!
//! The explicitly constructed instance that owns every producer and the
//! transition orchestrator, and hands out read handles to renderers.
//!
//! # Lifecycle
//!
//! ```text
//! new() ──► start() ──► EngineGuard ──► stop() / drop ──► start() again
//! ```
//!
//! `start()` spawns the clock, rotator and reveal timers and registers one
//! scroll listener that computes every scroll projection from the same
//! sample. Dropping the guard releases all of them, including an in-flight
//! scroll-to-top listener.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::watch;

use crate::clock::{format_time, ClockFormat, ClockSource, ClockState};
use crate::config::{ConfigError, EngineConfig};
use crate::host::Host;
use crate::motion::{resolve_motion_preference, MotionPreference};
use crate::preference::{PreferenceObserver, ThemePreference};
use crate::rotator::{ContentRotator, RotationState, RotatorError};
use crate::scroll::{project, ScrollSampler, ScrollState};
use crate::subscription::{Subscription, TaskGuard};
use crate::theme::{themed_asset, AssetKey, AssetRef, PROGRESS_BAR_ELEMENT};
use crate::transition::{
    InteractionTransform, ScrollTopButton, TooltipFrame, TooltipPhase, TransitionOrchestrator,
};

// =============================================================================
// ERRORS
// =============================================================================

/// Engine construction and lifecycle errors
#[derive(Debug, Error)]
pub enum EngineError {
    /// `start()` called while a guard from a previous start is alive
    #[error("engine is already running")]
    AlreadyRunning,

    /// Configuration rejected
    #[error("invalid engine configuration: {0}")]
    Config(#[from] ConfigError),

    /// Rotation labels rejected
    #[error("invalid rotation: {0}")]
    Rotator(#[from] RotatorError),
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Every presentation value at one moment, for renderers and logs
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EngineSnapshot {
    /// Formatted clock text
    pub time: String,
    /// Theme preference
    pub theme: ThemePreference,
    /// Scroll projections
    pub scroll: ScrollState,
    /// Rotating label
    pub rotation: RotationState,
    /// Reveal flag
    pub loaded: bool,
    /// Scroll-to-top in flight
    pub scrolling: bool,
    /// Back-to-top control
    pub scroll_top: ScrollTopButton,
    /// Progress bar fill for the current theme
    pub progress_fill: AssetRef,
    /// Ids of mounted tooltips
    pub tooltips: Vec<String>,
}

// =============================================================================
// ENGINE
// =============================================================================

struct EngineInner {
    config: EngineConfig,
    host: Host,
    motion: MotionPreference,
    clock_format: ClockFormat,
    clock_source: ClockSource,
    clock: Arc<watch::Sender<ClockState>>,
    preference: PreferenceObserver,
    sampler: ScrollSampler,
    scroll: Arc<watch::Sender<ScrollState>>,
    rotator: ContentRotator,
    rotation: Arc<watch::Sender<RotationState>>,
    transition: TransitionOrchestrator,
    running: AtomicBool,
}

/// Headless presentation state engine
#[derive(Clone)]
pub struct PresentationEngine {
    inner: Arc<EngineInner>,
}

impl PresentationEngine {
    /// Build an engine against `host`.
    ///
    /// Reads the color-scheme and reduced-motion preferences once and
    /// applies the initial theme to the document. Nothing runs until
    /// [`start`](Self::start).
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn new(config: EngineConfig, host: Host) -> Result<Self, EngineError> {
        config.validate()?;

        let motion = resolve_motion_preference(config.motion_override, host.preferences.as_ref());
        let clock_format = ClockFormat::from_config(&config.clock);
        let clock_source = ClockSource::new(Arc::clone(&host.clock), config.clock.tick_interval);
        let (clock, _) = watch::channel(clock_source.sample());

        let preference = PreferenceObserver::new(host.preferences.as_ref(), Arc::clone(&host.document));

        let sampler = ScrollSampler::new();
        let (scroll, _) = watch::channel(ScrollState::at_top(&[], &config.scroll));

        let rotator = ContentRotator::from_config(&config.rotation)?;
        let (rotation, _) = watch::channel(rotator.initial());

        let transition = TransitionOrchestrator::new(
            &config.transition,
            motion,
            sampler.clone(),
            Arc::clone(&host.viewport),
            Arc::clone(&host.document),
        );

        tracing::info!(
            ?motion,
            is_dark = preference.current().is_dark,
            source = %config.source(),
            "Presentation engine created"
        );

        Ok(Self {
            inner: Arc::new(EngineInner {
                config,
                host,
                motion,
                clock_format,
                clock_source,
                clock: Arc::new(clock),
                preference,
                sampler,
                scroll: Arc::new(scroll),
                rotator,
                rotation: Arc::new(rotation),
                transition,
                running: AtomicBool::new(false),
            }),
        })
    }

    /// Start timers and the scroll listener.
    ///
    /// Must be called inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::AlreadyRunning`] while a previous guard is
    /// alive.
    pub fn start(&self) -> Result<EngineGuard, EngineError> {
        let inner = &self.inner;
        if inner.running.swap(true, Ordering::SeqCst) {
            return Err(EngineError::AlreadyRunning);
        }

        publish_scroll(inner, &inner.sampler.latest());
        let scroll_listener = {
            let weak = Arc::downgrade(inner);
            inner.sampler.subscribe(move |sample| {
                if let Some(inner) = weak.upgrade() {
                    publish_scroll(&inner, sample);
                }
            })
        };

        let tasks = vec![
            inner.clock_source.spawn(Arc::clone(&inner.clock)),
            inner.rotator.spawn(Arc::clone(&inner.rotation)),
            inner.transition.spawn_reveal(),
        ];

        tracing::info!(tasks = tasks.len(), "Presentation engine started");

        Ok(EngineGuard {
            inner: Arc::clone(inner),
            tasks,
            scroll_listener: Some(scroll_listener),
        })
    }

    /// Whether a guard is alive
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    // ===== Read handles =====

    /// Clock state
    #[must_use]
    pub fn clock(&self) -> watch::Receiver<ClockState> {
        self.inner.clock.subscribe()
    }

    /// Theme preference
    #[must_use]
    pub fn theme(&self) -> watch::Receiver<ThemePreference> {
        self.inner.preference.subscribe()
    }

    /// Scroll projections
    #[must_use]
    pub fn scroll(&self) -> watch::Receiver<ScrollState> {
        self.inner.scroll.subscribe()
    }

    /// Rotating label
    #[must_use]
    pub fn rotation(&self) -> watch::Receiver<RotationState> {
        self.inner.rotation.subscribe()
    }

    /// Reveal flag
    #[must_use]
    pub fn loaded(&self) -> watch::Receiver<bool> {
        self.inner.transition.loaded()
    }

    /// Scroll-to-top flag
    #[must_use]
    pub fn scrolling(&self) -> watch::Receiver<bool> {
        self.inner.transition.scrolling()
    }

    /// Ids of mounted tooltips
    #[must_use]
    pub fn tooltips(&self) -> watch::Receiver<Vec<String>> {
        self.inner.transition.tooltips()
    }

    /// Sampler the host pushes scroll events into
    #[must_use]
    pub fn sampler(&self) -> &ScrollSampler {
        &self.inner.sampler
    }

    /// Configuration the engine was built with
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// Resolved motion preference
    #[must_use]
    pub fn motion(&self) -> MotionPreference {
        self.inner.motion
    }

    /// Host collaborators
    #[must_use]
    pub fn host(&self) -> &Host {
        &self.inner.host
    }

    /// Current clock value as display text
    #[must_use]
    pub fn formatted_time(&self) -> String {
        format_time(self.inner.clock.borrow().now, &self.inner.clock_format)
    }

    /// Theme-dependent asset for the current theme
    #[must_use]
    pub fn asset(&self, key: AssetKey) -> AssetRef {
        themed_asset(key, self.inner.preference.current().is_dark)
    }

    /// Back-to-top control state
    #[must_use]
    pub fn scroll_top_button(&self) -> ScrollTopButton {
        self.inner
            .transition
            .scroll_top_button(&self.inner.scroll.borrow())
    }

    /// All presentation values right now
    #[must_use]
    pub fn snapshot(&self) -> EngineSnapshot {
        let scroll = self.inner.scroll.borrow().clone();
        let transition = &self.inner.transition;
        let loaded = *transition.loaded().borrow();
        EngineSnapshot {
            time: self.formatted_time(),
            theme: self.inner.preference.current(),
            scroll_top: transition.scroll_top_button(&scroll),
            scroll,
            rotation: self.inner.rotation.borrow().clone(),
            loaded,
            scrolling: transition.is_scrolling(),
            progress_fill: self.asset(AssetKey::ProgressBarFill),
            tooltips: transition.mounted_tooltips(),
        }
    }

    // ===== Commands =====

    /// Invert the theme
    pub fn toggle_theme(&self) -> ThemePreference {
        self.inner.preference.toggle()
    }

    /// Set an explicit theme; returns whether it changed
    pub fn set_dark(&self, is_dark: bool) -> bool {
        self.inner.preference.set_dark(is_dark)
    }

    /// Scroll the viewport back to the top. Ignored while stopped.
    pub fn scroll_to_top(&self) {
        if !self.is_running() {
            tracing::trace!("Scroll to top ignored, engine not running");
            return;
        }
        self.inner.transition.scroll_to_top();
    }

    /// Pointer entered element `id`
    pub fn hover_enter(&self, id: &str) -> TooltipPhase {
        self.inner.transition.hover_enter(id)
    }

    /// Pointer left element `id`
    pub fn hover_exit(&self, id: &str) -> TooltipPhase {
        self.inner.transition.hover_exit(id)
    }

    /// Tooltip frame of element `id`
    #[must_use]
    pub fn tooltip_frame(&self, id: &str) -> TooltipFrame {
        self.inner.transition.tooltip_frame(id)
    }

    /// Micro-interaction transform of element `id`
    #[must_use]
    pub fn interaction(&self, id: &str, pressed: bool) -> InteractionTransform {
        self.inner.transition.interaction(id, pressed)
    }
}

impl std::fmt::Debug for PresentationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresentationEngine")
            .field("running", &self.is_running())
            .field("motion", &self.inner.motion)
            .field("transition", &self.inner.transition)
            .finish_non_exhaustive()
    }
}

fn publish_scroll(inner: &EngineInner, sample: &crate::scroll::ScrollSample) {
    let state = project(sample, &inner.sampler.sections(), &inner.config.scroll);

    if !inner
        .host
        .document
        .set_width_percent(PROGRESS_BAR_ELEMENT, state.scroll_percent)
    {
        tracing::trace!("Progress bar element absent, skipped");
    }

    inner.scroll.send_if_modified(|current| {
        if *current == state {
            false
        } else {
            *current = state;
            true
        }
    });
}

// =============================================================================
// GUARD
// =============================================================================

/// Running engine; dropping it stops every timer and listener
#[must_use = "dropping the guard stops the engine immediately"]
pub struct EngineGuard {
    inner: Arc<EngineInner>,
    tasks: Vec<TaskGuard>,
    scroll_listener: Option<Subscription>,
}

impl EngineGuard {
    /// Stop the engine
    pub fn stop(self) {
        drop(self);
    }

    /// Names of the timers this guard holds
    #[must_use]
    pub fn task_names(&self) -> Vec<&'static str> {
        self.tasks.iter().map(TaskGuard::name).collect()
    }
}

impl Drop for EngineGuard {
    fn drop(&mut self) {
        self.tasks.clear();
        if let Some(listener) = self.scroll_listener.take() {
            listener.dispose();
        }
        self.inner.transition.cancel_scroll_to_top();
        self.inner.running.store(false, Ordering::SeqCst);
        tracing::info!("Presentation engine stopped");
    }
}

impl std::fmt::Debug for EngineGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineGuard")
            .field("tasks", &self.task_names())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MemoryDocument, RecordingViewport, StaticPreferences, SystemClock};

    fn engine(prefs: StaticPreferences) -> PresentationEngine {
        let host = Host {
            viewport: Arc::new(RecordingViewport::new()),
            document: Arc::new(MemoryDocument::portfolio_page()),
            preferences: Arc::new(prefs),
            clock: Arc::new(SystemClock),
        };
        PresentationEngine::new(EngineConfig::default(), host).unwrap()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EngineConfig::default();
        config.rotation.labels.clear();
        let host = Host {
            viewport: Arc::new(RecordingViewport::new()),
            document: Arc::new(MemoryDocument::new()),
            preferences: Arc::new(StaticPreferences::unavailable()),
            clock: Arc::new(SystemClock),
        };
        assert!(matches!(
            PresentationEngine::new(config, host),
            Err(EngineError::Config(_))
        ));
    }

    #[test]
    fn test_motion_resolved_from_host() {
        let e = engine(StaticPreferences::dark().with_reduced_motion(true));
        assert_eq!(e.motion(), MotionPreference::Reduced);
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_start_rejected() {
        let e = engine(StaticPreferences::dark());
        let guard = e.start().unwrap();
        assert!(matches!(e.start(), Err(EngineError::AlreadyRunning)));
        assert_eq!(guard.task_names(), vec!["clock", "rotator", "reveal"]);

        guard.stop();
        assert!(!e.is_running());
        let _again = e.start().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_scroll_projection_published() {
        let e = engine(StaticPreferences::dark());
        let _guard = e.start().unwrap();

        e.sampler().emit(crate::scroll::ScrollSample::new(1000.0, 1000.0, 3000.0));
        let scroll = e.scroll().borrow().clone();
        assert!(scroll.past_top_threshold);
        assert_eq!(scroll.scroll_percent, 50.0);
        assert!(e.scroll_top_button().visible);
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshot_serializes() {
        let e = engine(StaticPreferences::light());
        let snapshot = e.snapshot();
        assert!(!snapshot.theme.is_dark);
        assert_eq!(snapshot.rotation.index, 0);
        assert_eq!(snapshot.progress_fill, AssetRef::Color("var(--accent-solid)"));

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["rotation"]["label"], "Software Engineer");
        assert_eq!(json["time"].as_str().map(|t| t.ends_with(" AEST")), Some(true));
    }
}
