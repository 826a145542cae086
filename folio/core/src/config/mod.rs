//! Engine Configuration
//!
//! Every threshold, cadence and duration the engine uses is a configuration
//! constant rather than a hard invariant. The defaults reproduce the
//! portfolio page; a TOML file at `~/.config/folio/engine.toml` can change
//! them.
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. CLI arguments ([`ConfigOverrides`])
//! 2. Environment variables (`FOLIO_*`, `REDUCE_MOTION`)
//! 3. TOML configuration file (`FOLIO_CONFIG` or the XDG default path)
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [scroll]
//! past_top_px = 300
//! near_top_px = 100
//! section_lookahead_px = 200
//!
//! [clock]
//! tick_interval_ms = 1000
//! utc_offset_secs = 36000
//! zone_label = "AEST"
//!
//! [rotation]
//! interval_ms = 3000
//! labels = ["Software Engineer", "UI/UX Designer", "ML Enthusiast", "Problem Solver"]
//!
//! [transition]
//! reveal_delay_ms = 100
//! tooltip_duration_ms = 300
//! tooltip_exit_ratio = 0.25
//! reduce_motion = "reduced"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::motion::{parse_motion_preference, MotionPreference, REDUCE_MOTION_ENV};

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "FOLIO_CONFIG";

/// Allowed range for the tooltip exit compression ratio
pub const EXIT_RATIO_RANGE: std::ops::RangeInclusive<f32> = 0.17..=0.33;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Scroll section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollToml {
    /// Offset beyond which the page counts as scrolled past the top
    pub past_top_px: Option<f64>,
    /// Offset below which the page counts as near the top
    pub near_top_px: Option<f64>,
    /// How far ahead of a section header it becomes active
    pub section_lookahead_px: Option<f64>,
}

/// Clock section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockToml {
    /// Tick period in milliseconds
    pub tick_interval_ms: Option<u64>,
    /// Fixed UTC offset the time is displayed in
    pub utc_offset_secs: Option<i32>,
    /// Label appended to the formatted time
    pub zone_label: Option<String>,
}

/// Rotation section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationToml {
    /// Advance period in milliseconds
    pub interval_ms: Option<u64>,
    /// Labels in rotation order
    pub labels: Option<Vec<String>>,
}

/// Transition section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionToml {
    /// Delay before the page fades in
    pub reveal_delay_ms: Option<u64>,
    /// Tooltip entrance duration budget
    pub tooltip_duration_ms: Option<u64>,
    /// Exit duration as a fraction of the entrance budget
    pub tooltip_exit_ratio: Option<f32>,
    /// Reduced-motion override (`full`, `reduced`, `none`)
    pub reduce_motion: Option<String>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineToml {
    /// Scroll configuration section
    pub scroll: ScrollToml,
    /// Clock configuration section
    pub clock: ClockToml,
    /// Rotation configuration section
    pub rotation: RotationToml,
    /// Transition configuration section
    pub transition: TransitionToml,
}

// =============================================================================
// Resolved Configuration
// =============================================================================

/// Scroll thresholds in pixels
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScrollThresholds {
    /// `past_top_threshold` is `scroll_y > past_top`
    pub past_top: f64,
    /// `near_top` is `scroll_y < near_top`
    pub near_top: f64,
    /// A section becomes active this far before its header reaches the top
    pub section_lookahead: f64,
}

impl Default for ScrollThresholds {
    fn default() -> Self {
        Self {
            past_top: 300.0,
            near_top: 100.0,
            section_lookahead: 200.0,
        }
    }
}

/// Clock cadence and display zone
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClockConfig {
    /// Tick period
    pub tick_interval: Duration,
    /// Fixed UTC offset the time is displayed in
    pub utc_offset_secs: i32,
    /// Label appended to the formatted time
    pub zone_label: String,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            // Australia/Brisbane observes no daylight saving
            utc_offset_secs: 10 * 3600,
            zone_label: "AEST".to_string(),
        }
    }
}

/// Content rotation cadence and labels
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RotationConfig {
    /// Advance period
    pub interval: Duration,
    /// Labels in rotation order
    pub labels: Vec<String>,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(3000),
            labels: [
                "Software Engineer",
                "UI/UX Designer",
                "ML Enthusiast",
                "Problem Solver",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

/// Transition timing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionConfig {
    /// Delay before the `loaded` flag flips
    pub reveal_delay: Duration,
    /// Tooltip entrance duration budget `D`
    pub tooltip_duration: Duration,
    /// Exit duration as a fraction of `D`
    pub tooltip_exit_ratio: f32,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            reveal_delay: Duration::from_millis(100),
            tooltip_duration: Duration::from_millis(300),
            tooltip_exit_ratio: 0.25,
        }
    }
}

/// Centralized configuration for the presentation engine
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Scroll thresholds
    pub scroll: ScrollThresholds,
    /// Clock settings
    pub clock: ClockConfig,
    /// Rotation settings
    pub rotation: RotationConfig,
    /// Transition settings
    pub transition: TransitionConfig,
    /// Explicit motion preference; `None` defers to the host
    pub motion_override: Option<MotionPreference>,
    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,
    source: ConfigSource,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scroll: ScrollThresholds::default(),
            clock: ClockConfig::default(),
            rotation: RotationConfig::default(),
            transition: TransitionConfig::default(),
            motion_override: None,
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl EngineConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Check values the engine cannot run with
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::ValidationError(msg.to_string()));

        let s = &self.scroll;
        if ![s.past_top, s.near_top, s.section_lookahead]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
        {
            return invalid("scroll thresholds must be finite and non-negative");
        }
        if self.clock.tick_interval.is_zero() {
            return invalid("clock.tick_interval_ms must be greater than zero");
        }
        if self.clock.utc_offset_secs.abs() >= 24 * 3600 {
            return invalid("clock.utc_offset_secs must be less than a day");
        }
        if self.rotation.interval.is_zero() {
            return invalid("rotation.interval_ms must be greater than zero");
        }
        if self.rotation.labels.is_empty() {
            return invalid("rotation.labels must not be empty");
        }
        if !EXIT_RATIO_RANGE.contains(&self.transition.tooltip_exit_ratio) {
            return Err(ConfigError::ValidationError(format!(
                "transition.tooltip_exit_ratio must be within {}..={}, got {}",
                EXIT_RATIO_RANGE.start(),
                EXIT_RATIO_RANGE.end(),
                self.transition.tooltip_exit_ratio
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/folio/engine.toml` or
/// `~/.config/folio/engine.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("folio").join("engine.toml"))
}

/// Load configuration from all sources with proper priority
///
/// `FOLIO_CONFIG` names the file if set, otherwise the XDG default path is
/// used.
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or the
/// merged values fail validation. A missing config file is not an error.
pub fn load_config() -> Result<EngineConfig, ConfigError> {
    let path = std::env::var(CONFIG_PATH_ENV)
        .ok()
        .map(PathBuf::from)
        .or_else(default_config_path);
    load_config_from_path(path)
}

/// Load configuration from a specific path
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed,
/// or the merged values fail validation.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<EngineConfig, ConfigError> {
    let mut config = load_file_layer(path)?;
    apply_env_config(&mut config);
    config.validate()?;
    Ok(config)
}

/// Defaults plus the file layer, without environment overrides
fn load_file_layer(path: Option<PathBuf>) -> Result<EngineConfig, ConfigError> {
    let mut config = EngineConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: EngineToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut EngineConfig, toml: &EngineToml) {
    if let Some(px) = toml.scroll.past_top_px {
        config.scroll.past_top = px;
    }
    if let Some(px) = toml.scroll.near_top_px {
        config.scroll.near_top = px;
    }
    if let Some(px) = toml.scroll.section_lookahead_px {
        config.scroll.section_lookahead = px;
    }

    if let Some(ms) = toml.clock.tick_interval_ms {
        config.clock.tick_interval = Duration::from_millis(ms);
    }
    if let Some(offset) = toml.clock.utc_offset_secs {
        config.clock.utc_offset_secs = offset;
    }
    if let Some(ref label) = toml.clock.zone_label {
        config.clock.zone_label = label.clone();
    }

    if let Some(ms) = toml.rotation.interval_ms {
        config.rotation.interval = Duration::from_millis(ms);
    }
    if let Some(ref labels) = toml.rotation.labels {
        config.rotation.labels = labels.clone();
    }

    if let Some(ms) = toml.transition.reveal_delay_ms {
        config.transition.reveal_delay = Duration::from_millis(ms);
    }
    if let Some(ms) = toml.transition.tooltip_duration_ms {
        config.transition.tooltip_duration = Duration::from_millis(ms);
    }
    if let Some(ratio) = toml.transition.tooltip_exit_ratio {
        config.transition.tooltip_exit_ratio = ratio;
    }
    if let Some(ref motion) = toml.transition.reduce_motion {
        config.motion_override = Some(parse_motion_preference(motion));
    }
}

/// Apply environment variable overrides to the config
fn apply_env_config(config: &mut EngineConfig) {
    apply_env_lookup(config, |key| std::env::var(key).ok());
}

/// Apply overrides read through `lookup`
fn apply_env_lookup(config: &mut EngineConfig, lookup: impl Fn(&str) -> Option<String>) {
    fn parsed<T: std::str::FromStr>(
        lookup: &impl Fn(&str) -> Option<String>,
        key: &str,
    ) -> Option<T> {
        let raw = lookup(key)?;
        match raw.trim().parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(key, value = %raw, "Ignoring unparseable environment override");
                None
            }
        }
    }

    let mut touched = false;

    if let Some(px) = parsed::<f64>(&lookup, "FOLIO_PAST_TOP_PX") {
        config.scroll.past_top = px;
        touched = true;
    }
    if let Some(px) = parsed::<f64>(&lookup, "FOLIO_NEAR_TOP_PX") {
        config.scroll.near_top = px;
        touched = true;
    }
    if let Some(px) = parsed::<f64>(&lookup, "FOLIO_SECTION_LOOKAHEAD_PX") {
        config.scroll.section_lookahead = px;
        touched = true;
    }
    if let Some(offset) = parsed::<i32>(&lookup, "FOLIO_UTC_OFFSET_SECS") {
        config.clock.utc_offset_secs = offset;
        touched = true;
    }
    if let Some(label) = lookup("FOLIO_ZONE_LABEL") {
        config.clock.zone_label = label;
        touched = true;
    }
    if let Some(ms) = parsed::<u64>(&lookup, "FOLIO_ROTATION_INTERVAL_MS") {
        config.rotation.interval = Duration::from_millis(ms);
        touched = true;
    }
    if let Some(ms) = parsed::<u64>(&lookup, "FOLIO_TOOLTIP_DURATION_MS") {
        config.transition.tooltip_duration = Duration::from_millis(ms);
        touched = true;
    }
    if let Some(value) = lookup(REDUCE_MOTION_ENV) {
        config.motion_override = Some(parse_motion_preference(&value));
        touched = true;
    }

    if touched {
        config.source = ConfigSource::Env;
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Reduced-motion override
    pub motion: Option<MotionPreference>,
    /// Rotation interval override (milliseconds)
    pub rotation_interval_ms: Option<u64>,
    /// Tooltip duration override (milliseconds)
    pub tooltip_duration_ms: Option<u64>,
    /// Zone label override
    pub zone_label: Option<String>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set motion override
    #[must_use]
    pub fn with_motion(mut self, motion: MotionPreference) -> Self {
        self.motion = Some(motion);
        self
    }

    /// Set rotation interval override
    #[must_use]
    pub fn with_rotation_interval_ms(mut self, ms: u64) -> Self {
        self.rotation_interval_ms = Some(ms);
        self
    }

    /// Set tooltip duration override
    #[must_use]
    pub fn with_tooltip_duration_ms(mut self, ms: u64) -> Self {
        self.tooltip_duration_ms = Some(ms);
        self
    }

    /// Set zone label override
    #[must_use]
    pub fn with_zone_label(mut self, label: impl Into<String>) -> Self {
        self.zone_label = Some(label.into());
        self
    }

    fn is_empty(&self) -> bool {
        self.motion.is_none()
            && self.rotation_interval_ms.is_none()
            && self.tooltip_duration_ms.is_none()
            && self.zone_label.is_none()
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut EngineConfig) {
        if self.is_empty() {
            return;
        }
        config.source = ConfigSource::Cli;

        if let Some(motion) = self.motion {
            config.motion_override = Some(motion);
        }
        if let Some(ms) = self.rotation_interval_ms {
            config.rotation.interval = Duration::from_millis(ms);
        }
        if let Some(ms) = self.tooltip_duration_ms {
            config.transition.tooltip_duration = Duration::from_millis(ms);
        }
        if let Some(ref label) = self.zone_label {
            config.clock.zone_label = label.clone();
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
