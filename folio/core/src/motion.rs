//! Reduced-Motion Preference
//!
//! Users who ask for reduced motion still get every presentation state;
//! they just get it without the travel. Durations collapse to zero while
//! start and end states stay identical.
//!
//! # Sources
//!
//! The preference is resolved once, when the engine is built:
//! 1. The `REDUCE_MOTION` environment variable, if set
//! 2. The host's one-shot `prefers-reduced-motion` answer
//! 3. `MotionPreference::Full`
//!
//! `REDUCE_MOTION` values:
//! - `1`, `true`, `yes`, `reduced` -> `MotionPreference::Reduced`
//! - `none`, `static`, `off`, `2` -> `MotionPreference::None`
//! - anything else -> `MotionPreference::Full`

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::host::{EnvironmentPreferences, ScrollBehavior};

/// Environment variable consulted for a motion override
pub const REDUCE_MOTION_ENV: &str = "REDUCE_MOTION";

/// User preference for motion and animation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionPreference {
    /// Normal animation
    #[default]
    Full,
    /// Reduced motion requested
    Reduced,
    /// No motion at all
    None,
}

impl MotionPreference {
    /// Whether animations should travel at all
    #[must_use]
    pub fn allows_animation(self) -> bool {
        matches!(self, MotionPreference::Full)
    }

    /// Scale a duration for this preference
    ///
    /// Anything other than `Full` collapses to zero.
    #[must_use]
    pub fn scale(self, duration: Duration) -> Duration {
        if self.allows_animation() {
            duration
        } else {
            Duration::ZERO
        }
    }

    /// How imperative scrolls should travel
    #[must_use]
    pub fn scroll_behavior(self) -> ScrollBehavior {
        if self.allows_animation() {
            ScrollBehavior::Smooth
        } else {
            ScrollBehavior::Instant
        }
    }
}

/// Parse a `REDUCE_MOTION` value
#[must_use]
pub fn parse_motion_preference(value: &str) -> MotionPreference {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "reduced" => MotionPreference::Reduced,
        "none" | "static" | "off" | "2" => MotionPreference::None,
        _ => MotionPreference::Full,
    }
}

/// Read the `REDUCE_MOTION` override, if any
#[must_use]
pub fn motion_override_from_env() -> Option<MotionPreference> {
    env::var(REDUCE_MOTION_ENV)
        .ok()
        .map(|value| parse_motion_preference(&value))
}

/// Resolve the motion preference from an override and the host
#[must_use]
pub fn resolve_motion_preference(
    override_pref: Option<MotionPreference>,
    preferences: &dyn EnvironmentPreferences,
) -> MotionPreference {
    if let Some(pref) = override_pref {
        return pref;
    }
    match preferences.prefers_reduced_motion() {
        Some(true) => MotionPreference::Reduced,
        Some(false) | None => MotionPreference::Full,
    }
}
