//! Theme Constants and Themed Assets
//!
//! The literal values the engine writes to the document when the theme
//! changes, and the pure mapping from a theme-dependent asset key to the
//! asset the renderer should use.

use serde::{Deserialize, Serialize};

// ============================================================================
// Document nodes
// ============================================================================

/// Root marker present while the light theme is active
pub const LIGHT_THEME_MARKER: &str = "light-theme";

/// Metadata field carrying the browser chrome color hint
pub const META_THEME_COLOR: &str = "theme-color";

/// Metadata field carrying the mobile status bar style hint
pub const META_STATUS_BAR_STYLE: &str = "apple-mobile-web-app-status-bar-style";

/// Element whose width tracks scroll progress
pub const PROGRESS_BAR_ELEMENT: &str = "scroll-progress";

// ============================================================================
// Metadata pairs
// ============================================================================

/// Values written to the two metadata fields for one theme
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct MetadataPair {
    /// Content for [`META_THEME_COLOR`]
    pub theme_color: &'static str,
    /// Content for [`META_STATUS_BAR_STYLE`]
    pub status_bar_style: &'static str,
}

/// Metadata written while dark
pub const DARK_METADATA: MetadataPair = MetadataPair {
    theme_color: "#161b22",
    status_bar_style: "black-translucent",
};

/// Metadata written while light
pub const LIGHT_METADATA: MetadataPair = MetadataPair {
    theme_color: "#f8fafc",
    status_bar_style: "default",
};

/// The metadata pair for a theme
#[must_use]
pub const fn metadata_for(is_dark: bool) -> MetadataPair {
    if is_dark {
        DARK_METADATA
    } else {
        LIGHT_METADATA
    }
}

// ============================================================================
// Themed assets
// ============================================================================

/// Assets whose appearance depends on the active theme
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKey {
    /// Flask logo on the project cards (black variant on light backgrounds)
    FlaskLogo,
    /// Fill of the scroll progress bar
    ProgressBarFill,
    /// Glow behind the scroll progress bar
    ProgressBarGlow,
    /// Icon on the theme toggle
    ThemeToggleIcon,
}

/// What a renderer should use for an [`AssetKey`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AssetRef {
    /// Path to an image
    Image(&'static str),
    /// CSS color expression
    Color(&'static str),
    /// Named icon
    Icon(&'static str),
}

/// Resolve a theme-dependent asset
#[must_use]
pub fn themed_asset(key: AssetKey, is_dark: bool) -> AssetRef {
    match (key, is_dark) {
        (AssetKey::FlaskLogo, true) => AssetRef::Image("/logos/flask.svg"),
        (AssetKey::FlaskLogo, false) => AssetRef::Image("/logos/flask-black.svg"),
        (AssetKey::ProgressBarFill, true) => AssetRef::Color("var(--accent-secondary-solid)"),
        (AssetKey::ProgressBarFill, false) => AssetRef::Color("var(--accent-solid)"),
        (AssetKey::ProgressBarGlow, true) => {
            AssetRef::Color("0 0 8px var(--accent-secondary-solid)")
        }
        (AssetKey::ProgressBarGlow, false) => AssetRef::Color("0 0 8px var(--accent-solid)"),
        (AssetKey::ThemeToggleIcon, true) => AssetRef::Icon("moon"),
        (AssetKey::ThemeToggleIcon, false) => AssetRef::Icon("sun"),
    }
}
