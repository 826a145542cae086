//! Transition Orchestrator
//!
//! Turns state from the producers into transitions: the one-time reveal
//! after mount, the scroll-to-top request and its completion, the
//! back-to-top control, and per-element tooltip and micro-interaction
//! choreography.
//!
//! # Scroll-to-top
//!
//! ```text
//!              scroll_to_top()               sample.scroll_y == 0
//!  Idle ─────────────────────────► Scrolling ─────────────────────► Idle
//!                                   │    ▲                          (blur)
//!                                   └────┘
//!                        scroll_to_top() again: same listener
//! ```
//!
//! A smooth scroll can be interrupted by the user; the request only
//! completes once a sample actually reports the top, however it got there.

pub mod interaction;
pub mod timing;
pub mod tooltip;

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::time::Instant;

use crate::config::TransitionConfig;
use crate::host::{Document, Viewport};
use crate::motion::MotionPreference;
use crate::scroll::{ScrollSampler, ScrollState};
use crate::subscription::{Subscription, TaskGuard};

pub use interaction::{micro_interaction, InteractionTransform};
pub use timing::{EasingFunction, Segment};
pub use tooltip::{
    next_phase, HoverState, Tooltip, TooltipBoard, TooltipEvent, TooltipFrame, TooltipPhase,
    TooltipTiming,
};

// =============================================================================
// BACK-TO-TOP CONTROL
// =============================================================================

/// Icon on the back-to-top control
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollTopIcon {
    /// Upward arrow, shown near the top and while scrolling there
    Arrow,
    /// Chevron, shown otherwise
    Chevron,
}

/// Derived view state of the back-to-top control
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollTopButton {
    /// Control is rendered
    pub visible: bool,
    /// Icon to render
    pub icon: ScrollTopIcon,
}

impl ScrollTopButton {
    /// View state for a scroll state and the scrolling flag
    #[must_use]
    pub fn derive(scroll: &ScrollState, scrolling: bool) -> Self {
        let icon = if scroll.near_top || scrolling {
            ScrollTopIcon::Arrow
        } else {
            ScrollTopIcon::Chevron
        };
        Self {
            visible: scroll.past_top_threshold,
            icon,
        }
    }
}

// =============================================================================
// ORCHESTRATOR
// =============================================================================

type PendingScroll = Arc<Mutex<Option<Subscription>>>;

/// Transition state and commands
pub struct TransitionOrchestrator {
    sampler: ScrollSampler,
    viewport: Arc<dyn Viewport>,
    document: Arc<dyn Document>,
    motion: MotionPreference,
    reveal_delay: Duration,
    loaded: Arc<watch::Sender<bool>>,
    scrolling: Arc<watch::Sender<bool>>,
    pending_scroll: PendingScroll,
    tooltips: Mutex<TooltipBoard>,
    mounted: watch::Sender<Vec<String>>,
}

impl TransitionOrchestrator {
    /// Create an orchestrator over the given sampler and host surfaces
    pub fn new(
        config: &TransitionConfig,
        motion: MotionPreference,
        sampler: ScrollSampler,
        viewport: Arc<dyn Viewport>,
        document: Arc<dyn Document>,
    ) -> Self {
        let (loaded, _) = watch::channel(false);
        let (scrolling, _) = watch::channel(false);
        let (mounted, _) = watch::channel(Vec::new());
        Self {
            sampler,
            viewport,
            document,
            motion,
            reveal_delay: config.reveal_delay,
            loaded: Arc::new(loaded),
            scrolling: Arc::new(scrolling),
            pending_scroll: Arc::new(Mutex::new(None)),
            tooltips: Mutex::new(TooltipBoard::new(TooltipTiming::from_config(config, motion))),
            mounted,
        }
    }

    /// Motion preference this orchestrator was built with
    #[must_use]
    pub fn motion(&self) -> MotionPreference {
        self.motion
    }

    // ===== Reveal =====

    /// Flip `loaded` to true once the reveal delay has passed.
    ///
    /// Dropping the guard first cancels the flip. Once true, `loaded` stays
    /// true for the life of the orchestrator.
    pub fn spawn_reveal(&self) -> TaskGuard {
        let loaded = Arc::clone(&self.loaded);
        let delay = self.reveal_delay;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if loaded.send_if_modified(|flag| !std::mem::replace(flag, true)) {
                tracing::debug!(delay_ms = delay.as_millis() as u64, "Content revealed");
            }
        });

        TaskGuard::new("reveal", handle)
    }

    /// Read handle for the reveal flag
    #[must_use]
    pub fn loaded(&self) -> watch::Receiver<bool> {
        self.loaded.subscribe()
    }

    // ===== Scroll-to-top =====

    /// Read handle for the scroll-to-top flag
    #[must_use]
    pub fn scrolling(&self) -> watch::Receiver<bool> {
        self.scrolling.subscribe()
    }

    /// Whether a scroll-to-top request is waiting for the top
    #[must_use]
    pub fn is_scrolling(&self) -> bool {
        *self.scrolling.borrow()
    }

    /// Start scrolling the viewport to the top.
    ///
    /// At most one completion listener exists at a time; a request made
    /// while one is in flight reuses it.
    pub fn scroll_to_top(&self) {
        let behavior = self.motion.scroll_behavior();

        if self.sampler.latest().scroll_y <= 0.0 && !self.is_scrolling() {
            tracing::debug!("Already at top");
            self.viewport.scroll_to(0.0, behavior);
            self.document.blur_active_element();
            return;
        }

        {
            let mut pending = self.pending_scroll.lock();
            if pending.is_none() {
                *pending = Some(self.register_completion());
                tracing::debug!(?behavior, "Scroll to top started");
            } else {
                tracing::trace!("Scroll to top already in flight");
            }
            self.scrolling.send_replace(true);
        }

        // Lock released: the viewport may emit samples synchronously
        self.viewport.scroll_to(0.0, behavior);
    }

    fn register_completion(&self) -> Subscription {
        let pending = Arc::downgrade(&self.pending_scroll);
        let scrolling = Arc::clone(&self.scrolling);
        let document = Arc::clone(&self.document);

        self.sampler.subscribe(move |sample| {
            if sample.scroll_y > 0.0 {
                return;
            }
            let Some(pending) = pending.upgrade() else {
                return;
            };
            let Some(subscription) = pending.lock().take() else {
                return;
            };
            subscription.dispose();
            scrolling.send_replace(false);
            document.blur_active_element();
            tracing::debug!("Scroll to top complete");
        })
    }

    /// Drop any in-flight scroll-to-top request
    pub fn cancel_scroll_to_top(&self) {
        if let Some(subscription) = self.pending_scroll.lock().take() {
            subscription.dispose();
            tracing::debug!("Scroll to top cancelled");
        }
        self.scrolling.send_if_modified(|flag| std::mem::replace(flag, false));
    }

    /// Back-to-top control state for `scroll`
    #[must_use]
    pub fn scroll_top_button(&self, scroll: &ScrollState) -> ScrollTopButton {
        ScrollTopButton::derive(scroll, self.is_scrolling())
    }

    // ===== Tooltips and micro-interactions =====

    /// Pointer entered element `id`
    pub fn hover_enter(&self, id: &str) -> TooltipPhase {
        let now = Instant::now();
        let mut board = self.tooltips.lock();
        let phase = board.hover_enter(id, now);
        self.publish_mounted(board.tick(now));
        phase
    }

    /// Pointer left element `id`
    pub fn hover_exit(&self, id: &str) -> TooltipPhase {
        let now = Instant::now();
        let mut board = self.tooltips.lock();
        let phase = board.hover_exit(id, now);
        self.publish_mounted(board.tick(now));
        phase
    }

    /// Read handle for the ids of mounted tooltips.
    ///
    /// Updated on hover events and whenever the board is settled through
    /// [`mounted_tooltips`](Self::mounted_tooltips).
    #[must_use]
    pub fn tooltips(&self) -> watch::Receiver<Vec<String>> {
        self.mounted.subscribe()
    }

    fn publish_mounted(&self, ids: Vec<String>) {
        self.mounted.send_if_modified(|current| {
            if *current == ids {
                false
            } else {
                *current = ids;
                true
            }
        });
    }

    /// Hover state of element `id`
    #[must_use]
    pub fn hover_state(&self, id: &str) -> HoverState {
        self.tooltips.lock().hover_state(id)
    }

    /// Tooltip frame of element `id` right now
    #[must_use]
    pub fn tooltip_frame(&self, id: &str) -> TooltipFrame {
        self.tooltips.lock().frame(id, Instant::now())
    }

    /// Ids of tooltips currently mounted
    #[must_use]
    pub fn mounted_tooltips(&self) -> Vec<String> {
        let ids = self.tooltips.lock().tick(Instant::now());
        self.publish_mounted(ids.clone());
        ids
    }

    /// Micro-interaction transform for element `id`
    #[must_use]
    pub fn interaction(&self, id: &str, pressed: bool) -> InteractionTransform {
        micro_interaction(self.hover_state(id).is_hovered, pressed, self.motion)
    }
}

impl std::fmt::Debug for TransitionOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionOrchestrator")
            .field("motion", &self.motion)
            .field("loaded", &*self.loaded.borrow())
            .field("scrolling", &*self.scrolling.borrow())
            .finish_non_exhaustive()
    }
}
