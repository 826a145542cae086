//! Host Collaborators
//!
//! The engine never touches a browser directly. Everything it reads from or
//! writes to the page goes through the traits in this module, so the same
//! engine can be driven by a real surface, the preview binary, or a test.
//!
//! # Reads
//!
//! - [`EnvironmentPreferences`]: one-shot color-scheme and reduced-motion reads
//! - [`WallClock`]: the current instant
//!
//! # Writes
//!
//! - [`Document`]: root theme marker, metadata fields, progress bar width,
//!   focus release
//! - [`Viewport`]: imperative scroll commands
//!
//! Scroll position itself is pushed into the engine by the host through
//! [`crate::scroll::ScrollSampler::emit`].

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

// =============================================================================
// Traits
// =============================================================================

/// How the viewport should travel to a scroll target
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScrollBehavior {
    /// Interpolated scroll; the host emits intermediate samples
    Smooth,
    /// Jump straight to the target
    Instant,
}

/// Imperative viewport commands
pub trait Viewport: Send + Sync {
    /// Ask the viewport to scroll to `top` pixels
    fn scroll_to(&self, top: f64, behavior: ScrollBehavior);
}

/// Document-level writes.
///
/// Writes that target a node the document does not have are skipped and
/// reported through the boolean return value; they never fail.
pub trait Document: Send + Sync {
    /// Add (`present == true`) or remove a boolean marker on the document root
    fn set_root_marker(&self, marker: &str, present: bool);

    /// Set the content of a named metadata field. Returns `false` if absent.
    fn set_meta(&self, name: &str, content: &str) -> bool;

    /// Set an element's width as a percentage. Returns `false` if absent.
    fn set_width_percent(&self, element_id: &str, percent: f64) -> bool;

    /// Drop keyboard focus from whatever element holds it
    fn blur_active_element(&self);
}

/// One-shot environment preference reads
pub trait EnvironmentPreferences: Send + Sync {
    /// `Some(true)` if the system prefers a light color scheme, `None` if
    /// the signal is unavailable
    fn prefers_light_scheme(&self) -> Option<bool>;

    /// `Some(true)` if the system asks for reduced motion, `None` if unknown
    fn prefers_reduced_motion(&self) -> Option<bool>;
}

/// Source of the current instant
pub trait WallClock: Send + Sync {
    /// Current instant
    fn now(&self) -> DateTime<Utc>;
}

/// Bundle of collaborators handed to the engine
#[derive(Clone)]
pub struct Host {
    /// Scroll command sink
    pub viewport: Arc<dyn Viewport>,
    /// Document write sink
    pub document: Arc<dyn Document>,
    /// Environment preference reads
    pub preferences: Arc<dyn EnvironmentPreferences>,
    /// Time source
    pub clock: Arc<dyn WallClock>,
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host").finish_non_exhaustive()
    }
}

// =============================================================================
// In-memory implementations
// =============================================================================

/// System wall clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Start at the given instant
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Jump to an instant
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.lock() = instant;
    }

    /// Move forward by a duration
    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl WallClock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Fixed preference answers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StaticPreferences {
    /// Answer for [`EnvironmentPreferences::prefers_light_scheme`]
    pub light_scheme: Option<bool>,
    /// Answer for [`EnvironmentPreferences::prefers_reduced_motion`]
    pub reduced_motion: Option<bool>,
}

impl StaticPreferences {
    /// Preferences with neither signal available
    #[must_use]
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// System prefers a light scheme
    #[must_use]
    pub fn light() -> Self {
        Self {
            light_scheme: Some(true),
            reduced_motion: Some(false),
        }
    }

    /// System prefers a dark scheme
    #[must_use]
    pub fn dark() -> Self {
        Self {
            light_scheme: Some(false),
            reduced_motion: Some(false),
        }
    }

    /// Set the reduced-motion answer
    #[must_use]
    pub fn with_reduced_motion(mut self, reduced: bool) -> Self {
        self.reduced_motion = Some(reduced);
        self
    }
}

impl EnvironmentPreferences for StaticPreferences {
    fn prefers_light_scheme(&self) -> Option<bool> {
        self.light_scheme
    }

    fn prefers_reduced_motion(&self) -> Option<bool> {
        self.reduced_motion
    }
}

#[derive(Debug, Default)]
struct DocumentNodes {
    markers: BTreeSet<String>,
    meta: BTreeMap<String, String>,
    widths: BTreeMap<String, f64>,
    blur_count: usize,
}

/// In-memory document.
///
/// Only metadata fields and elements that were declared up front exist;
/// writes to anything else are skipped, like a page missing the node.
#[derive(Debug, Default)]
pub struct MemoryDocument {
    nodes: Mutex<DocumentNodes>,
}

impl MemoryDocument {
    /// An empty document with no metadata fields or elements
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A document carrying the nodes the portfolio page declares
    #[must_use]
    pub fn portfolio_page() -> Self {
        Self::new()
            .with_meta(crate::theme::META_THEME_COLOR, "")
            .with_meta(crate::theme::META_STATUS_BAR_STYLE, "")
            .with_element(crate::theme::PROGRESS_BAR_ELEMENT)
    }

    /// Declare a metadata field
    #[must_use]
    pub fn with_meta(self, name: &str, content: &str) -> Self {
        self.nodes
            .lock()
            .meta
            .insert(name.to_string(), content.to_string());
        self
    }

    /// Declare an element (width starts at 0%)
    #[must_use]
    pub fn with_element(self, element_id: &str) -> Self {
        self.nodes.lock().widths.insert(element_id.to_string(), 0.0);
        self
    }

    /// Whether a root marker is present
    #[must_use]
    pub fn has_marker(&self, marker: &str) -> bool {
        self.nodes.lock().markers.contains(marker)
    }

    /// Current content of a metadata field
    #[must_use]
    pub fn meta(&self, name: &str) -> Option<String> {
        self.nodes.lock().meta.get(name).cloned()
    }

    /// Current width of an element
    #[must_use]
    pub fn width_percent(&self, element_id: &str) -> Option<f64> {
        self.nodes.lock().widths.get(element_id).copied()
    }

    /// Number of times focus was released
    #[must_use]
    pub fn blur_count(&self) -> usize {
        self.nodes.lock().blur_count
    }
}

impl Document for MemoryDocument {
    fn set_root_marker(&self, marker: &str, present: bool) {
        let mut nodes = self.nodes.lock();
        if present {
            nodes.markers.insert(marker.to_string());
        } else {
            nodes.markers.remove(marker);
        }
    }

    fn set_meta(&self, name: &str, content: &str) -> bool {
        match self.nodes.lock().meta.get_mut(name) {
            Some(value) => {
                *value = content.to_string();
                true
            }
            None => false,
        }
    }

    fn set_width_percent(&self, element_id: &str, percent: f64) -> bool {
        match self.nodes.lock().widths.get_mut(element_id) {
            Some(width) => {
                *width = percent;
                true
            }
            None => false,
        }
    }

    fn blur_active_element(&self) {
        self.nodes.lock().blur_count += 1;
    }
}

/// A scroll command the viewport received
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScrollCommand {
    /// Target offset in pixels
    pub top: f64,
    /// Requested behavior
    pub behavior: ScrollBehavior,
}

/// Viewport that records commands instead of moving anything
#[derive(Debug, Default)]
pub struct RecordingViewport {
    commands: Mutex<Vec<ScrollCommand>>,
}

impl RecordingViewport {
    /// New viewport with no recorded commands
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All commands received so far
    #[must_use]
    pub fn commands(&self) -> Vec<ScrollCommand> {
        self.commands.lock().clone()
    }

    /// Most recent command
    #[must_use]
    pub fn last_command(&self) -> Option<ScrollCommand> {
        self.commands.lock().last().copied()
    }
}

impl Viewport for RecordingViewport {
    fn scroll_to(&self, top: f64, behavior: ScrollBehavior) {
        self.commands.lock().push(ScrollCommand { top, behavior });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_memory_document_skips_absent_nodes() {
        let doc = MemoryDocument::new().with_meta("theme-color", "#000000");

        assert!(doc.set_meta("theme-color", "#161b22"));
        assert_eq!(doc.meta("theme-color").as_deref(), Some("#161b22"));

        assert!(!doc.set_meta("missing", "value"));
        assert_eq!(doc.meta("missing"), None);

        assert!(!doc.set_width_percent("scroll-progress", 50.0));
        assert_eq!(doc.width_percent("scroll-progress"), None);
    }

    #[test]
    fn test_memory_document_markers() {
        let doc = MemoryDocument::new();
        doc.set_root_marker("light-theme", true);
        assert!(doc.has_marker("light-theme"));
        doc.set_root_marker("light-theme", false);
        assert!(!doc.has_marker("light-theme"));
        // Removing an absent marker is harmless
        doc.set_root_marker("light-theme", false);
        assert!(!doc.has_marker("light-theme"));
    }

    #[test]
    fn test_portfolio_page_nodes() {
        let doc = MemoryDocument::portfolio_page();
        assert!(doc.set_meta(crate::theme::META_THEME_COLOR, "#f8fafc"));
        assert!(doc.set_width_percent(crate::theme::PROGRESS_BAR_ELEMENT, 12.5));
        assert_eq!(
            doc.width_percent(crate::theme::PROGRESS_BAR_ELEMENT),
            Some(12.5)
        );
    }

    #[test]
    fn test_recording_viewport() {
        let viewport = RecordingViewport::new();
        assert!(viewport.last_command().is_none());

        viewport.scroll_to(0.0, ScrollBehavior::Smooth);
        assert_eq!(
            viewport.last_command(),
            Some(ScrollCommand {
                top: 0.0,
                behavior: ScrollBehavior::Smooth
            })
        );
        assert_eq!(viewport.commands().len(), 1);
    }

    #[test]
    fn test_manual_clock() {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        assert_eq!(clock.now(), start);

        clock.advance(chrono::Duration::seconds(90));
        assert_eq!(clock.now(), start + chrono::Duration::seconds(90));
    }
}
