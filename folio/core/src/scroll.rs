//! Scroll Signal Sampler
//!
//! The host pushes one [`ScrollSample`] per scroll event into the
//! [`ScrollSampler`]; every listener registered at that moment receives the
//! same sample, so projections computed for one event can never disagree
//! about the scroll position.
//!
//! Projections:
//! - `past_top_threshold`: `scroll_y > past_top`
//! - `near_top`: `scroll_y < near_top`
//! - `scroll_percent`: position through the scrollable overflow, 0..=100
//! - `active_section_id`: last section whose header (minus the lookahead)
//!   is at or above the scroll position
//!
//! `past_top_threshold` and `near_top` use different cutoffs and are not
//! complements: between the two both are false.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::config::ScrollThresholds;
use crate::subscription::Subscription;

// =============================================================================
// SCROLL DATA
// =============================================================================

/// One consistent reading of the viewport
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollSample {
    /// Vertical scroll offset in pixels
    pub scroll_y: f64,
    /// Height of the visible viewport
    pub viewport_height: f64,
    /// Full scrollable height of the document
    pub document_height: f64,
}

impl ScrollSample {
    /// Sample at `scroll_y` for a document of the given size
    #[must_use]
    pub fn new(scroll_y: f64, viewport_height: f64, document_height: f64) -> Self {
        Self {
            scroll_y,
            viewport_height,
            document_height,
        }
    }

    /// Same geometry at a different scroll offset
    #[must_use]
    pub fn at(self, scroll_y: f64) -> Self {
        Self { scroll_y, ..self }
    }
}

/// A page section and the offset of its header
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Anchor id
    pub id: String,
    /// Distance of the header from the top of the document
    pub offset_top: f64,
}

impl Section {
    /// New section
    pub fn new(id: impl Into<String>, offset_top: f64) -> Self {
        Self {
            id: id.into(),
            offset_top,
        }
    }
}

/// Projections of one scroll sample
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollState {
    /// Scrolled beyond the upper threshold
    pub past_top_threshold: bool,
    /// Still within the lower threshold
    pub near_top: bool,
    /// Progress through the scrollable overflow, 0..=100
    pub scroll_percent: f64,
    /// Section the reader is in, if any
    pub active_section_id: Option<String>,
}

impl ScrollState {
    /// State of a page that has not scrolled
    #[must_use]
    pub fn at_top(sections: &[Section], thresholds: &ScrollThresholds) -> Self {
        project(&ScrollSample::default(), sections, thresholds)
    }
}

// =============================================================================
// PROJECTIONS
// =============================================================================

/// Percentage through the scrollable overflow.
///
/// A document with no overflow (or nonsensical geometry) reports 0 rather
/// than NaN so the value can go straight into a width style.
#[must_use]
pub fn scroll_percent(sample: &ScrollSample) -> f64 {
    let overflow = sample.document_height - sample.viewport_height;
    if !(overflow.is_finite() && overflow > 0.0) {
        return 0.0;
    }
    let percent = sample.scroll_y / overflow * 100.0;
    if percent.is_finite() {
        percent.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Id of the last section whose header minus `lookahead` is at or above
/// `scroll_y`. Sections must be in document order.
#[must_use]
pub fn active_section<'a>(sections: &'a [Section], scroll_y: f64, lookahead: f64) -> Option<&'a str> {
    sections
        .iter()
        .rev()
        .find(|section| section.offset_top - lookahead <= scroll_y)
        .map(|section| section.id.as_str())
}

/// Compute every projection from one sample
#[must_use]
pub fn project(sample: &ScrollSample, sections: &[Section], thresholds: &ScrollThresholds) -> ScrollState {
    let y = sample.scroll_y;
    ScrollState {
        past_top_threshold: y > thresholds.past_top,
        near_top: y < thresholds.near_top,
        scroll_percent: scroll_percent(sample),
        active_section_id: active_section(sections, y, thresholds.section_lookahead)
            .map(str::to_string),
    }
}

// =============================================================================
// SAMPLER
// =============================================================================

type Listener = Arc<dyn Fn(&ScrollSample) + Send + Sync>;

#[derive(Default)]
struct SamplerInner {
    next_id: u64,
    listeners: BTreeMap<u64, Listener>,
    latest: ScrollSample,
    sections: Vec<Section>,
}

/// Fan-out point for scroll events.
///
/// Cloning yields another handle to the same sampler.
#[derive(Clone, Default)]
pub struct ScrollSampler {
    inner: Arc<Mutex<SamplerInner>>,
}

impl ScrollSampler {
    /// New sampler with no listeners and no sections
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for every subsequent sample.
    ///
    /// The listener is removed when the returned subscription is disposed
    /// or dropped.
    pub fn subscribe(&self, listener: impl Fn(&ScrollSample) + Send + Sync + 'static) -> Subscription {
        let id = {
            let mut inner = self.inner.lock();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.listeners.insert(id, Arc::new(listener));
            id
        };
        tracing::trace!(listener = id, "Scroll listener registered");

        let weak = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.lock().listeners.remove(&id);
                tracing::trace!(listener = id, "Scroll listener released");
            }
        })
    }

    /// Deliver a sample to every listener registered right now.
    ///
    /// Listeners run outside the lock, so they may subscribe or dispose
    /// (including themselves) while being called.
    pub fn emit(&self, sample: ScrollSample) {
        let listeners: Vec<Listener> = {
            let mut inner = self.inner.lock();
            inner.latest = sample;
            inner.listeners.values().cloned().collect()
        };
        for listener in listeners {
            listener(&sample);
        }
    }

    /// Last emitted sample
    #[must_use]
    pub fn latest(&self) -> ScrollSample {
        self.inner.lock().latest
    }

    /// Replace the section layout, in document order
    pub fn set_sections(&self, sections: Vec<Section>) {
        self.inner.lock().sections = sections;
    }

    /// Current section layout
    #[must_use]
    pub fn sections(&self) -> Vec<Section> {
        self.inner.lock().sections.clone()
    }

    /// Number of registered listeners
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.lock().listeners.len()
    }
}

impl std::fmt::Debug for ScrollSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("ScrollSampler")
            .field("listeners", &inner.listeners.len())
            .field("latest", &inner.latest)
            .field("sections", &inner.sections.len())
            .finish()
    }
}
