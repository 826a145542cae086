//! Preference Observer
//!
//! Owns the theme preference. The system color scheme is read once at
//! construction; after that only explicit user actions change it.
//!
//! This module is the only writer of the document's theme marker and theme
//! metadata. Every change to [`ThemePreference`] is mirrored to the
//! document before the new value is visible to readers.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::host::{Document, EnvironmentPreferences};
use crate::theme::{metadata_for, LIGHT_THEME_MARKER, META_STATUS_BAR_STYLE, META_THEME_COLOR};

/// Active color theme
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemePreference {
    /// Dark theme active
    pub is_dark: bool,
}

impl ThemePreference {
    /// Preference derived from the system color-scheme signal.
    ///
    /// Dark unless the system explicitly prefers light.
    #[must_use]
    pub fn from_system(prefers_light: Option<bool>) -> Self {
        Self {
            is_dark: prefers_light != Some(true),
        }
    }

    /// The opposite theme
    #[must_use]
    pub fn inverted(self) -> Self {
        Self {
            is_dark: !self.is_dark,
        }
    }
}

/// Theme state holder and document synchronizer
pub struct PreferenceObserver {
    document: Arc<dyn Document>,
    state: watch::Sender<ThemePreference>,
}

impl PreferenceObserver {
    /// Read the system preference once and apply it to the document
    pub fn new(preferences: &dyn EnvironmentPreferences, document: Arc<dyn Document>) -> Self {
        let prefers_light = preferences.prefers_light_scheme();
        let initial = ThemePreference::from_system(prefers_light);
        tracing::debug!(
            ?prefers_light,
            is_dark = initial.is_dark,
            "Initial theme preference"
        );

        sync_document(document.as_ref(), initial);
        let (state, _) = watch::channel(initial);
        Self { document, state }
    }

    /// Current preference
    #[must_use]
    pub fn current(&self) -> ThemePreference {
        *self.state.borrow()
    }

    /// Read handle for renderers
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ThemePreference> {
        self.state.subscribe()
    }

    /// Invert the theme and synchronize the document.
    ///
    /// Returns the new preference.
    pub fn toggle(&self) -> ThemePreference {
        let mut next = self.current();
        self.state.send_modify(|pref| {
            next = pref.inverted();
            sync_document(self.document.as_ref(), next);
            *pref = next;
        });
        tracing::info!(is_dark = next.is_dark, "Theme toggled");
        next
    }

    /// Set an explicit theme.
    ///
    /// The document is only touched when the value changes. Returns whether
    /// it changed.
    pub fn set_dark(&self, is_dark: bool) -> bool {
        let document = self.document.as_ref();
        let changed = self.state.send_if_modified(|pref| {
            if pref.is_dark == is_dark {
                return false;
            }
            let next = ThemePreference { is_dark };
            sync_document(document, next);
            *pref = next;
            true
        });
        if changed {
            tracing::info!(is_dark, "Theme set");
        }
        changed
    }
}

impl std::fmt::Debug for PreferenceObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceObserver")
            .field("current", &self.current())
            .finish_non_exhaustive()
    }
}

fn sync_document(document: &dyn Document, pref: ThemePreference) {
    document.set_root_marker(LIGHT_THEME_MARKER, !pref.is_dark);

    let metadata = metadata_for(pref.is_dark);
    for (name, content) in [
        (META_THEME_COLOR, metadata.theme_color),
        (META_STATUS_BAR_STYLE, metadata.status_bar_style),
    ] {
        if !document.set_meta(name, content) {
            tracing::trace!(name, "Metadata field absent, skipped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MemoryDocument, StaticPreferences};
    use crate::theme::{DARK_METADATA, LIGHT_METADATA};

    fn observer(prefs: StaticPreferences) -> (PreferenceObserver, Arc<MemoryDocument>) {
        let doc = Arc::new(MemoryDocument::portfolio_page());
        let observer = PreferenceObserver::new(&prefs, doc.clone());
        (observer, doc)
    }

    fn assert_synced(doc: &MemoryDocument, is_dark: bool) {
        let expected = if is_dark { DARK_METADATA } else { LIGHT_METADATA };
        assert_eq!(doc.has_marker(LIGHT_THEME_MARKER), !is_dark);
        assert_eq!(doc.meta(META_THEME_COLOR).as_deref(), Some(expected.theme_color));
        assert_eq!(
            doc.meta(META_STATUS_BAR_STYLE).as_deref(),
            Some(expected.status_bar_style)
        );
    }

    #[test]
    fn test_initial_preference_from_system() {
        assert!(!ThemePreference::from_system(Some(true)).is_dark);
        assert!(ThemePreference::from_system(Some(false)).is_dark);
        assert!(ThemePreference::from_system(None).is_dark);
    }

    #[test]
    fn test_construction_syncs_document() {
        let (obs, doc) = observer(StaticPreferences::light());
        assert!(!obs.current().is_dark);
        assert_synced(&doc, false);

        let (obs, doc) = observer(StaticPreferences::unavailable());
        assert!(obs.current().is_dark);
        assert_synced(&doc, true);
    }

    #[test]
    fn test_toggle_inverts_and_syncs() {
        let (obs, doc) = observer(StaticPreferences::dark());
        let rx = obs.subscribe();

        assert!(!obs.toggle().is_dark);
        assert!(!rx.borrow().is_dark);
        assert_synced(&doc, false);

        assert!(obs.toggle().is_dark);
        assert_synced(&doc, true);
    }

    #[test]
    fn test_toggle_twice_restores_document() {
        let (obs, doc) = observer(StaticPreferences::light());
        let before = (
            doc.has_marker(LIGHT_THEME_MARKER),
            doc.meta(META_THEME_COLOR),
            doc.meta(META_STATUS_BAR_STYLE),
        );
        obs.toggle();
        obs.toggle();
        let after = (
            doc.has_marker(LIGHT_THEME_MARKER),
            doc.meta(META_THEME_COLOR),
            doc.meta(META_STATUS_BAR_STYLE),
        );
        assert_eq!(before, after);
    }

    #[test]
    fn test_missing_metadata_is_skipped() {
        let doc = Arc::new(MemoryDocument::new());
        let obs = PreferenceObserver::new(&StaticPreferences::dark(), doc.clone());
        obs.toggle();
        assert!(doc.has_marker(LIGHT_THEME_MARKER));
        assert_eq!(doc.meta(META_THEME_COLOR), None);
    }

    #[test]
    fn test_set_dark_only_reports_changes() {
        let (obs, doc) = observer(StaticPreferences::dark());
        let mut rx = obs.subscribe();
        rx.borrow_and_update();

        assert!(!obs.set_dark(true));
        assert!(!rx.has_changed().unwrap());

        assert!(obs.set_dark(false));
        assert!(rx.has_changed().unwrap());
        assert_synced(&doc, false);
    }
}
