//! Configuration
//!
//! Timings, the completion message and a few behavior switches, loaded from
//! an optional TOML file at `~/.config/form-visualizer/visualizer.toml`.
//!
//! # Configuration Priority
//!
//! Highest first:
//! 1. CLI arguments (applied by the binary after loading)
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! initial_view = "pipeline"
//! validate_email = true
//!
//! [timing]
//! typewriter_tick_ms = 50
//! settle_delay_ms = 500
//! card_move_ms = 800
//!
//! [completion]
//! heading = "Thanks, we'll be in touch"
//! link_label = "View Pricing"
//! link_href = "/pricing"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::views::ViewId;

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

/// Where the effective configuration last came from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    #[default]
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
// Timing
// =============================================================================

/// Every duration the engine waits on, in milliseconds
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Delay between typewriter characters
    pub typewriter_tick_ms: u64,
    /// Pause after each revealed field
    pub field_pause_ms: u64,
    /// View and wizard step cross-fade, each direction
    pub fade_ms: u64,
    /// Wait before each pipeline hop
    pub settle_delay_ms: u64,
    /// Duration of one pipeline hop
    pub card_move_ms: u64,
    /// Total refresh effect after a dynamic submission
    pub refresh_ms: u64,
    /// Page flash fade in
    pub flash_in_ms: u64,
    /// Page flash fade out
    pub flash_out_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            typewriter_tick_ms: 50,
            field_pause_ms: 200,
            fade_ms: 300,
            settle_delay_ms: 500,
            card_move_ms: 800,
            refresh_ms: 1000,
            flash_in_ms: 200,
            flash_out_ms: 300,
        }
    }
}

impl TimingConfig {
    /// Every duration set to zero except a 1 ms typewriter tick
    #[must_use]
    pub fn instant() -> Self {
        Self {
            typewriter_tick_ms: 1,
            field_pause_ms: 0,
            fade_ms: 0,
            settle_delay_ms: 0,
            card_move_ms: 0,
            refresh_ms: 0,
            flash_in_ms: 0,
            flash_out_ms: 0,
        }
    }

    /// Multiply every duration by `factor`
    ///
    /// The typewriter tick never drops below 1 ms.
    #[must_use]
    pub fn scaled(&self, factor: f32) -> Self {
        let factor = if factor.is_finite() { factor.max(0.0) } else { 1.0 };
        let scale = |ms: u64| (ms as f64 * f64::from(factor)).round() as u64;
        Self {
            typewriter_tick_ms: scale(self.typewriter_tick_ms).max(1),
            field_pause_ms: scale(self.field_pause_ms),
            fade_ms: scale(self.fade_ms),
            settle_delay_ms: scale(self.settle_delay_ms),
            card_move_ms: scale(self.card_move_ms),
            refresh_ms: scale(self.refresh_ms),
            flash_in_ms: scale(self.flash_in_ms),
            flash_out_ms: scale(self.flash_out_ms),
        }
    }

    /// Typewriter tick
    #[must_use]
    pub fn typewriter_tick(&self) -> Duration {
        Duration::from_millis(self.typewriter_tick_ms)
    }

    /// Pause after a revealed field
    #[must_use]
    pub fn field_pause(&self) -> Duration {
        Duration::from_millis(self.field_pause_ms)
    }

    /// Cross-fade duration
    #[must_use]
    pub fn fade(&self) -> Duration {
        Duration::from_millis(self.fade_ms)
    }

    /// Settle delay before a pipeline hop
    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Pipeline hop duration
    #[must_use]
    pub fn card_move(&self) -> Duration {
        Duration::from_millis(self.card_move_ms)
    }

    /// Refresh effect duration
    #[must_use]
    pub fn refresh(&self) -> Duration {
        Duration::from_millis(self.refresh_ms)
    }

    /// Page flash fade in
    #[must_use]
    pub fn flash_in(&self) -> Duration {
        Duration::from_millis(self.flash_in_ms)
    }

    /// Page flash fade out
    #[must_use]
    pub fn flash_out(&self) -> Duration {
        Duration::from_millis(self.flash_out_ms)
    }
}

// =============================================================================
// Completion Message
// =============================================================================

/// Terminal message that replaces the wizard once every field is in
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionMessage {
    /// Heading text
    pub heading: String,
    /// Call-to-action label
    pub link_label: String,
    /// Call-to-action target
    pub link_href: String,
}

impl Default for CompletionMessage {
    fn default() -> Self {
        Self {
            heading: "Do this and more with Nodeo...".to_string(),
            link_label: "View Pricing".to_string(),
            link_href: "/pricing".to_string(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete visualizer configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
    /// Durations
    pub timing: TimingConfig,
    /// Message shown on completion
    pub completion: CompletionMessage,
    /// View visible when the session starts
    pub initial_view: ViewId,
    /// Apply the email well-formedness check
    pub validate_email: bool,
    /// Capacity of the coordinator event channel
    pub event_buffer: usize,

    /// Where the configuration was loaded from
    #[serde(skip)]
    pub source: ConfigSource,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            timing: TimingConfig::default(),
            completion: CompletionMessage::default(),
            initial_view: ViewId::default(),
            validate_email: true,
            event_buffer: 64,
            source: ConfigSource::Default,
        }
    }
}

impl VisualizerConfig {
    /// Defaults with every wait collapsed
    #[must_use]
    pub fn instant() -> Self {
        Self {
            timing: TimingConfig::instant(),
            ..Self::default()
        }
    }

    /// Replace the timings with values given on the command line
    pub fn override_timing(&mut self, timing: TimingConfig) {
        self.timing = timing;
        self.source = ConfigSource::Cli;
    }

    /// Where the configuration was loaded from
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Check values the engine cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timing.typewriter_tick_ms == 0 {
            return Err(ConfigError::ValidationError(
                "timing.typewriter_tick_ms must be greater than zero".to_string(),
            ));
        }
        if self.event_buffer == 0 {
            return Err(ConfigError::ValidationError(
                "event_buffer must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Default path of the configuration file
///
/// `$XDG_CONFIG_HOME/form-visualizer/visualizer.toml`
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("form-visualizer").join("visualizer.toml"))
}

/// Load configuration from the default path and the environment
pub fn load_config() -> Result<VisualizerConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path and the environment
///
/// A missing file is not an error; defaults are used instead.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<VisualizerConfig, ConfigError> {
    let mut config = match path {
        Some(ref path) if path.exists() => read_config_file(path)?,
        Some(ref path) => {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            VisualizerConfig::default()
        }
        None => VisualizerConfig::default(),
    };

    apply_env_config(&mut config, |key| std::env::var(key).ok());
    config.validate()?;

    tracing::debug!(
        source = %config.source,
        initial_view = %config.initial_view,
        tick_ms = config.timing.typewriter_tick_ms,
        "configuration loaded"
    );
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<VisualizerConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config: VisualizerConfig = toml::from_str(&content)?;
    config.source = ConfigSource::File;
    tracing::info!(path = %path.display(), "loaded configuration file");
    Ok(config)
}

/// Apply environment overrides using `lookup` to read variables
///
/// Unparseable values are ignored with a warning.
pub fn apply_env_config<F>(config: &mut VisualizerConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let mut overridden = false;
    let mut millis = |key: &str, slot: &mut u64| {
        if let Some(raw) = lookup(key) {
            match raw.trim().parse::<u64>() {
                Ok(ms) => {
                    *slot = ms;
                    overridden = true;
                }
                Err(_) => tracing::warn!(key, value = %raw, "ignoring non-numeric override"),
            }
        }
    };
    millis("VISUALIZER_TYPE_SPEED_MS", &mut config.timing.typewriter_tick_ms);
    millis("VISUALIZER_SETTLE_MS", &mut config.timing.settle_delay_ms);
    millis("VISUALIZER_FADE_MS", &mut config.timing.fade_ms);

    if let Some(raw) = lookup("VISUALIZER_INITIAL_VIEW") {
        match raw.parse::<ViewId>() {
            Ok(view) => {
                config.initial_view = view;
                overridden = true;
            }
            Err(err) => tracing::warn!(value = %raw, %err, "ignoring unknown initial view"),
        }
    }
    if let Some(raw) = lookup("VISUALIZER_VALIDATE_EMAIL") {
        config.validate_email = raw != "0" && !raw.eq_ignore_ascii_case("false");
        overridden = true;
    }

    if overridden {
        config.source = ConfigSource::Env;
    }
}

// =============================================================================
// Tests
// =============================================================================
