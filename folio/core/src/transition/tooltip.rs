//! Tooltip Choreography
//!
//! A tooltip is three layers on one timeline of length `D`:
//!
//! | Layer      | Starts   | Lasts    | Curve        |
//! |------------|----------|----------|--------------|
//! | container  | 0        | D        | ease-out-back|
//! | accent     | 0.33 D   | 0.25 D   | ease-out     |
//! | label      | 0.25 D   | 0.5 D    | ease-out     |
//!
//! Exit plays the same timeline backwards, compressed to `exit_ratio * D`.
//! An interrupted transition turns around from wherever it currently is,
//! so the position never jumps.
//!
//! ```text
//!            hover enter             entrance done
//!  Hidden ──────────────► Entering ───────────────► Shown
//!    ▲                     │   ▲                     │
//!    │ exit done  hover exit│   │hover enter          │ hover exit
//!    │                     ▼   │                     │
//!    └──────────────────  Exiting ◄──────────────────┘
//! ```

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use super::timing::{EasingFunction, Segment};
use crate::config::TransitionConfig;
use crate::motion::MotionPreference;

/// Container layer: springs in over the whole timeline
pub const CONTAINER_SEGMENT: Segment = Segment::full(EasingFunction::EaseOutBack);

/// Accent background layer
pub const ACCENT_SEGMENT: Segment = Segment::new(0.33, 0.25, EasingFunction::EaseOut);

/// Label text layer
pub const LABEL_SEGMENT: Segment = Segment::new(0.25, 0.5, EasingFunction::EaseOut);

// =============================================================================
// PHASE MACHINE
// =============================================================================

/// Visibility phase of one tooltip
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TooltipPhase {
    /// Not mounted
    #[default]
    Hidden,
    /// Moving towards shown
    Entering,
    /// Fully shown
    Shown,
    /// Moving towards hidden
    Exiting,
}

impl TooltipPhase {
    /// Whether the container is in the tree
    #[must_use]
    pub fn is_mounted(self) -> bool {
        self != TooltipPhase::Hidden
    }
}

/// Inputs to the phase machine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TooltipEvent {
    /// Pointer entered the owning element
    HoverEnter,
    /// Pointer left the owning element
    HoverExit,
    /// Entrance reached the end of the timeline
    EntranceComplete,
    /// Exit reached the start of the timeline
    ExitComplete,
}

/// Phase after `event`, or `None` if the event does not apply
#[must_use]
pub fn next_phase(phase: TooltipPhase, event: TooltipEvent) -> Option<TooltipPhase> {
    use TooltipEvent::*;
    use TooltipPhase::*;

    match (phase, event) {
        (Hidden, HoverEnter) => Some(Entering),
        (Entering, EntranceComplete) => Some(Shown),
        (Entering | Shown, HoverExit) => Some(Exiting),
        (Exiting, HoverEnter) => Some(Entering),
        (Exiting, ExitComplete) => Some(Hidden),
        _ => None,
    }
}

// =============================================================================
// TIMING
// =============================================================================

/// Durations of one tooltip's timeline
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TooltipTiming {
    duration: Duration,
    exit_ratio: f32,
}

impl TooltipTiming {
    /// Timeline of length `duration`, exiting in `exit_ratio * duration`
    #[must_use]
    pub fn new(duration: Duration, exit_ratio: f32) -> Self {
        Self {
            duration,
            exit_ratio: exit_ratio.max(0.0),
        }
    }

    /// Timing from config, collapsed to zero unless motion is allowed
    #[must_use]
    pub fn from_config(config: &TransitionConfig, motion: MotionPreference) -> Self {
        Self::new(motion.scale(config.tooltip_duration), config.tooltip_exit_ratio)
    }

    /// Entrance duration `D`
    #[must_use]
    pub fn entrance(&self) -> Duration {
        self.duration
    }

    /// Exit duration `exit_ratio * D`
    #[must_use]
    pub fn exit(&self) -> Duration {
        let nanos = self.duration.as_nanos() as f64 * f64::from(self.exit_ratio);
        Duration::from_nanos(nanos.round() as u64)
    }
}

impl Default for TooltipTiming {
    fn default() -> Self {
        Self::from_config(&TransitionConfig::default(), MotionPreference::Full)
    }
}

// =============================================================================
// TOOLTIP
// =============================================================================

/// Per-layer progress at one instant
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TooltipFrame {
    /// Phase at the sampled instant
    pub phase: TooltipPhase,
    /// Whether the container is mounted
    pub mounted: bool,
    /// Raw timeline position, 0.0..=1.0
    pub position: f32,
    /// Container progress (may overshoot 1.0 while springing in)
    pub container: f32,
    /// Accent background progress
    pub accent: f32,
    /// Label progress
    pub label: f32,
}

impl TooltipFrame {
    fn at(phase: TooltipPhase, position: f32) -> Self {
        Self {
            phase,
            mounted: phase.is_mounted(),
            position,
            container: CONTAINER_SEGMENT.progress(position),
            accent: ACCENT_SEGMENT.progress(position),
            label: LABEL_SEGMENT.progress(position),
        }
    }

    /// Frame of a hidden tooltip
    #[must_use]
    pub fn hidden() -> Self {
        Self::at(TooltipPhase::Hidden, 0.0)
    }
}

/// One tooltip's phase and timeline position
#[derive(Clone, Debug)]
pub struct Tooltip {
    timing: TooltipTiming,
    phase: TooltipPhase,
    anchor_position: f32,
    anchor: Instant,
}

impl Tooltip {
    /// Hidden tooltip
    #[must_use]
    pub fn new(timing: TooltipTiming, now: Instant) -> Self {
        Self {
            timing,
            phase: TooltipPhase::Hidden,
            anchor_position: 0.0,
            anchor: now,
        }
    }

    /// Current phase without advancing time
    #[must_use]
    pub fn phase(&self) -> TooltipPhase {
        self.phase
    }

    /// Timeline position at `now`
    #[must_use]
    pub fn position(&self, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(self.anchor);
        let position = match self.phase {
            TooltipPhase::Hidden => 0.0,
            TooltipPhase::Shown => 1.0,
            TooltipPhase::Entering => {
                self.anchor_position + fraction(elapsed, self.timing.entrance())
            }
            TooltipPhase::Exiting => self.anchor_position - fraction(elapsed, self.timing.exit()),
        };
        position.clamp(0.0, 1.0)
    }

    /// Pointer entered
    pub fn hover_enter(&mut self, now: Instant) -> TooltipPhase {
        self.apply(TooltipEvent::HoverEnter, now);
        self.tick(now)
    }

    /// Pointer left
    pub fn hover_exit(&mut self, now: Instant) -> TooltipPhase {
        self.apply(TooltipEvent::HoverExit, now);
        self.tick(now)
    }

    /// Complete any transition that has run its course by `now`
    pub fn tick(&mut self, now: Instant) -> TooltipPhase {
        let position = self.position(now);
        match self.phase {
            TooltipPhase::Entering if position >= 1.0 => {
                self.apply(TooltipEvent::EntranceComplete, now);
            }
            TooltipPhase::Exiting if position <= 0.0 => {
                self.apply(TooltipEvent::ExitComplete, now);
            }
            _ => {}
        }
        self.phase
    }

    /// Layer progress at `now`
    pub fn frame(&mut self, now: Instant) -> TooltipFrame {
        let phase = self.tick(now);
        TooltipFrame::at(phase, self.position(now))
    }

    fn apply(&mut self, event: TooltipEvent, now: Instant) {
        let Some(next) = next_phase(self.phase, event) else {
            tracing::trace!(phase = ?self.phase, ?event, "Tooltip event ignored");
            return;
        };
        self.anchor_position = self.position(now);
        self.anchor = now;
        tracing::trace!(from = ?self.phase, to = ?next, position = self.anchor_position, "Tooltip phase");
        self.phase = next;
    }
}

fn fraction(elapsed: Duration, total: Duration) -> f32 {
    if total.is_zero() {
        1.0
    } else {
        elapsed.as_secs_f32() / total.as_secs_f32()
    }
}

// =============================================================================
// BOARD
// =============================================================================

/// Pointer state of one interactive element
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoverState {
    /// Pointer is over the element
    pub is_hovered: bool,
}

#[derive(Debug)]
struct BoardEntry {
    hover: HoverState,
    tooltip: Tooltip,
}

/// Tooltips and hover state keyed by element id
#[derive(Debug)]
pub struct TooltipBoard {
    timing: TooltipTiming,
    entries: HashMap<String, BoardEntry>,
}

impl TooltipBoard {
    /// Empty board whose tooltips share `timing`
    #[must_use]
    pub fn new(timing: TooltipTiming) -> Self {
        Self {
            timing,
            entries: HashMap::new(),
        }
    }

    fn entry(&mut self, id: &str, now: Instant) -> &mut BoardEntry {
        let timing = self.timing;
        self.entries
            .entry(id.to_string())
            .or_insert_with(|| BoardEntry {
                hover: HoverState::default(),
                tooltip: Tooltip::new(timing, now),
            })
    }

    /// Pointer entered element `id`
    pub fn hover_enter(&mut self, id: &str, now: Instant) -> TooltipPhase {
        let entry = self.entry(id, now);
        entry.hover.is_hovered = true;
        entry.tooltip.hover_enter(now)
    }

    /// Pointer left element `id`
    pub fn hover_exit(&mut self, id: &str, now: Instant) -> TooltipPhase {
        match self.entries.get_mut(id) {
            Some(entry) => {
                entry.hover.is_hovered = false;
                entry.tooltip.hover_exit(now)
            }
            None => TooltipPhase::Hidden,
        }
    }

    /// Hover state of element `id`
    #[must_use]
    pub fn hover_state(&self, id: &str) -> HoverState {
        self.entries
            .get(id)
            .map(|entry| entry.hover)
            .unwrap_or_default()
    }

    /// Frame of element `id`'s tooltip at `now`
    pub fn frame(&mut self, id: &str, now: Instant) -> TooltipFrame {
        self.entries
            .get_mut(id)
            .map(|entry| entry.tooltip.frame(now))
            .unwrap_or_else(TooltipFrame::hidden)
    }

    /// Settle every tooltip at `now`, returning the ids still mounted.
    ///
    /// Elements that are hidden and not hovered are forgotten.
    pub fn tick(&mut self, now: Instant) -> Vec<String> {
        let mut mounted = Vec::new();
        self.entries.retain(|id, entry| {
            let is_mounted = entry.tooltip.tick(now).is_mounted();
            if is_mounted {
                mounted.push(id.clone());
            }
            is_mounted || entry.hover.is_hovered
        });
        mounted.sort();
        mounted
    }

    /// Number of elements the board is tracking
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the board tracks no element
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TooltipBoard {
    fn default() -> Self {
        Self::new(TooltipTiming::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHASES: [TooltipPhase; 4] = [
        TooltipPhase::Hidden,
        TooltipPhase::Entering,
        TooltipPhase::Shown,
        TooltipPhase::Exiting,
    ];

    const EVENTS: [TooltipEvent; 4] = [
        TooltipEvent::HoverEnter,
        TooltipEvent::HoverExit,
        TooltipEvent::EntranceComplete,
        TooltipEvent::ExitComplete,
    ];

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_phase_machine_transitions() {
        use TooltipEvent::*;
        use TooltipPhase::*;

        let allowed = [
            (Hidden, HoverEnter, Entering),
            (Entering, EntranceComplete, Shown),
            (Entering, HoverExit, Exiting),
            (Shown, HoverExit, Exiting),
            (Exiting, HoverEnter, Entering),
            (Exiting, ExitComplete, Hidden),
        ];

        for phase in PHASES {
            for event in EVENTS {
                let expected = allowed
                    .iter()
                    .find(|(p, e, _)| *p == phase && *e == event)
                    .map(|(_, _, to)| *to);
                assert_eq!(next_phase(phase, event), expected, "{phase:?} + {event:?}");
            }
        }
    }

    #[test]
    fn test_mounted_unless_hidden() {
        assert!(!TooltipPhase::Hidden.is_mounted());
        assert!(TooltipPhase::Entering.is_mounted());
        assert!(TooltipPhase::Shown.is_mounted());
        assert!(TooltipPhase::Exiting.is_mounted());
    }

    #[test]
    fn test_timing_defaults() {
        let timing = TooltipTiming::default();
        assert_eq!(timing.entrance(), ms(300));
        assert_eq!(timing.exit(), ms(75));
    }

    #[test]
    fn test_entrance_completes_after_duration() {
        let t0 = Instant::now();
        let mut tooltip = Tooltip::new(TooltipTiming::default(), t0);

        assert_eq!(tooltip.hover_enter(t0), TooltipPhase::Entering);
        assert_eq!(tooltip.tick(t0 + ms(150)), TooltipPhase::Entering);
        assert!((tooltip.position(t0 + ms(150)) - 0.5).abs() < 0.01);
        assert_eq!(tooltip.tick(t0 + ms(300)), TooltipPhase::Shown);
        assert_eq!(tooltip.position(t0 + ms(400)), 1.0);
    }

    #[test]
    fn test_layers_are_staggered() {
        let t0 = Instant::now();
        let mut tooltip = Tooltip::new(TooltipTiming::default(), t0);
        tooltip.hover_enter(t0);

        // 60ms = 0.2 of the timeline: container moving, label and accent not yet
        let early = tooltip.frame(t0 + ms(60));
        assert!(early.container > 0.0);
        assert_eq!(early.label, 0.0);
        assert_eq!(early.accent, 0.0);

        // 90ms = 0.3: label started, accent still waiting for 0.33
        let mid = tooltip.frame(t0 + ms(90));
        assert!(mid.label > 0.0);
        assert_eq!(mid.accent, 0.0);

        let done = tooltip.frame(t0 + ms(300));
        assert_eq!(done.phase, TooltipPhase::Shown);
        assert!((done.container - 1.0).abs() < 0.001);
        assert_eq!(done.accent, 1.0);
        assert_eq!(done.label, 1.0);
    }

    #[test]
    fn test_exit_is_compressed() {
        let t0 = Instant::now();
        let mut tooltip = Tooltip::new(TooltipTiming::default(), t0);
        tooltip.hover_enter(t0);
        tooltip.tick(t0 + ms(300));

        let exit_at = t0 + ms(500);
        assert_eq!(tooltip.hover_exit(exit_at), TooltipPhase::Exiting);
        assert!(tooltip.frame(exit_at + ms(40)).mounted);
        assert_eq!(tooltip.tick(exit_at + ms(75)), TooltipPhase::Hidden);
        assert!(!tooltip.frame(exit_at + ms(80)).mounted);
    }

    #[test]
    fn test_interrupted_entrance_reverses_from_current_position() {
        let t0 = Instant::now();
        let mut tooltip = Tooltip::new(TooltipTiming::default(), t0);
        tooltip.hover_enter(t0);

        // Halfway in, leave
        let leave = t0 + ms(150);
        assert_eq!(tooltip.hover_exit(leave), TooltipPhase::Exiting);
        assert!((tooltip.position(leave) - 0.5).abs() < 0.01);

        // Exit covers the whole timeline in 75ms, so half of it takes ~37ms
        assert!(tooltip.position(leave + ms(20)) > 0.0);
        assert_eq!(tooltip.tick(leave + ms(38)), TooltipPhase::Hidden);
    }

    #[test]
    fn test_reenter_while_exiting_continues() {
        let t0 = Instant::now();
        let mut tooltip = Tooltip::new(TooltipTiming::default(), t0);
        tooltip.hover_enter(t0);
        tooltip.tick(t0 + ms(300));

        let leave = t0 + ms(300);
        tooltip.hover_exit(leave);
        let back = leave + ms(15); // 0.2 of the exit
        let position = tooltip.position(back);
        assert_eq!(tooltip.hover_enter(back), TooltipPhase::Entering);
        assert!((tooltip.position(back) - position).abs() < 0.001);
        assert!(position > 0.7 && position < 0.9);
    }

    #[test]
    fn test_reduced_motion_is_instant() {
        let timing = TooltipTiming::from_config(&TransitionConfig::default(), MotionPreference::Reduced);
        let t0 = Instant::now();
        let mut tooltip = Tooltip::new(timing, t0);

        assert_eq!(tooltip.hover_enter(t0), TooltipPhase::Shown);
        let shown = tooltip.frame(t0);
        assert_eq!(shown.label, 1.0);
        assert_eq!(shown.accent, 1.0);

        assert_eq!(tooltip.hover_exit(t0), TooltipPhase::Hidden);
        assert_eq!(tooltip.frame(t0), TooltipFrame::hidden());
    }

    #[test]
    fn test_ignored_events_keep_state() {
        let t0 = Instant::now();
        let mut tooltip = Tooltip::new(TooltipTiming::default(), t0);
        assert_eq!(tooltip.hover_exit(t0), TooltipPhase::Hidden);

        tooltip.hover_enter(t0);
        let before = tooltip.position(t0 + ms(100));
        // Second enter while entering does not restart the timeline
        tooltip.hover_enter(t0 + ms(50));
        assert!((tooltip.position(t0 + ms(100)) - before).abs() < 0.001);
    }

    #[test]
    fn test_board_tracks_hover_per_element() {
        let t0 = Instant::now();
        let mut board = TooltipBoard::default();

        board.hover_enter("github", t0);
        assert!(board.hover_state("github").is_hovered);
        assert!(!board.hover_state("linkedin").is_hovered);
        assert_eq!(board.frame("linkedin", t0), TooltipFrame::hidden());

        board.hover_enter("linkedin", t0 + ms(100));
        board.hover_exit("github", t0 + ms(300));
        assert!(!board.hover_state("github").is_hovered);

        assert_eq!(
            board.tick(t0 + ms(320)),
            vec!["github".to_string(), "linkedin".to_string()]
        );
        assert_eq!(board.tick(t0 + ms(400)), vec!["linkedin".to_string()]);
        assert_eq!(board.hover_exit("unknown", t0), TooltipPhase::Hidden);
    }

    #[test]
    fn test_board_forgets_settled_elements() {
        let t0 = Instant::now();
        let mut board = TooltipBoard::default();

        for i in 0..50 {
            let id = format!("link-{i}");
            board.hover_enter(&id, t0);
            board.hover_exit(&id, t0 + ms(10));
        }
        board.hover_enter("github", t0);
        assert_eq!(board.len(), 51);

        // Every exit has finished; only the hovered element stays
        assert_eq!(board.tick(t0 + ms(500)), vec!["github".to_string()]);
        assert_eq!(board.len(), 1);
        assert!(board.hover_state("github").is_hovered);
        assert_eq!(board.frame("link-0", t0 + ms(500)), TooltipFrame::hidden());

        board.hover_exit("github", t0 + ms(600));
        assert!(board.tick(t0 + ms(700)).is_empty());
        assert!(board.is_empty());
    }
}
