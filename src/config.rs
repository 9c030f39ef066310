//! Bridge configuration.
//!
//! Defaults cover the common case. Embedders override them with the
//! builder methods, from `QUICKFILTER_*` environment variables, or from a
//! JSON settings blob handed over by the host.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::bridge::DEFAULT_BUS_CAPACITY;
use crate::error::{BridgeError, ErrorContext};
use crate::traits::Modifier;
use crate::watcher::DEFAULT_DEBOUNCE;

pub const ENV_DEBOUNCE_MS: &str = "QUICKFILTER_DEBOUNCE_MS";
pub const ENV_MODIFIER: &str = "QUICKFILTER_MODIFIER";
pub const ENV_WATCH_LAYOUT: &str = "QUICKFILTER_WATCH_LAYOUT";
pub const ENV_LOG_LEVEL: &str = "QUICKFILTER_LOG_LEVEL";

/// Errors raised while building a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings blob is not valid JSON for the expected shape
    #[error("malformed settings: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A field parsed but its value is unusable
    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: &'static str, message: String },
}

/// Logging options consumed by [`crate::logging::init_tracing`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Fallback filter directive when `RUST_LOG` is unset (default: "info")
    pub level: String,
    /// Emit JSON lines instead of the human-readable format
    pub json: bool,
    /// Include the event target (module path)
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            with_target: true,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub fn with_target(mut self, with_target: bool) -> Self {
        self.with_target = with_target;
        self
    }
}

/// Configuration for the click bridge.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use quickfilter::config::BridgeConfig;
/// use quickfilter::traits::Modifier;
///
/// let config = BridgeConfig::default()
///     .with_debounce_window(Duration::from_millis(250))
///     .with_required_modifier(Modifier::Ctrl);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeConfig {
    /// Coalescing window for structure refreshes (default: 500ms)
    pub debounce_window: Duration,
    /// Modifier that must be held for a click to count (default: Alt)
    pub required_modifier: Modifier,
    /// Event type the click listener is attached for (default: "click")
    pub click_event_type: String,
    /// Attach the click listener in the capture phase (default: true)
    pub capture: bool,
    /// Capacity of the async click channel (default: 64)
    pub bus_capacity: usize,
    /// Refresh columns on window layout signals too (default: true)
    pub watch_layout: bool,
    pub logging: LoggingConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            debounce_window: DEFAULT_DEBOUNCE,
            required_modifier: Modifier::Alt,
            click_event_type: "click".to_string(),
            capture: true,
            bus_capacity: DEFAULT_BUS_CAPACITY,
            watch_layout: true,
            logging: LoggingConfig::default(),
        }
    }
}

impl BridgeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_debounce_window(mut self, window: Duration) -> Self {
        self.debounce_window = window;
        self
    }

    pub fn with_required_modifier(mut self, modifier: Modifier) -> Self {
        self.required_modifier = modifier;
        self
    }

    pub fn with_click_event_type(mut self, event_type: impl Into<String>) -> Self {
        self.click_event_type = event_type.into();
        self
    }

    pub fn with_capture(mut self, capture: bool) -> Self {
        self.capture = capture;
        self
    }

    pub fn with_bus_capacity(mut self, capacity: usize) -> Self {
        self.bus_capacity = capacity;
        self
    }

    pub fn with_watch_layout(mut self, watch: bool) -> Self {
        self.watch_layout = watch;
        self
    }

    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }

    /// Check values that would make the bridge misbehave.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.problems().into_iter().next() {
            Some(problem) => Err(problem),
            None => Ok(()),
        }
    }

    /// Replace every unusable value with its default, logging each one.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        for problem in self.problems() {
            if let ConfigError::InvalidValue { field, .. } = &problem {
                match *field {
                    "debounce_window" => self.debounce_window = defaults.debounce_window,
                    "bus_capacity" => self.bus_capacity = defaults.bus_capacity,
                    "click_event_type" => {
                        self.click_event_type = defaults.click_event_type.clone()
                    }
                    _ => {}
                }
            }
            BridgeError::Config(problem)
                .with_context(ErrorContext::new("apply configuration").with_component("config"))
                .log();
        }
        self
    }

    fn problems(&self) -> Vec<ConfigError> {
        let mut problems = Vec::new();
        if self.debounce_window.is_zero() {
            problems.push(ConfigError::InvalidValue {
                field: "debounce_window",
                message: "must be greater than zero".to_string(),
            });
        }
        if self.bus_capacity == 0 {
            problems.push(ConfigError::InvalidValue {
                field: "bus_capacity",
                message: "must be greater than zero".to_string(),
            });
        }
        if self.click_event_type.trim().is_empty() {
            problems.push(ConfigError::InvalidValue {
                field: "click_event_type",
                message: "must not be empty".to_string(),
            });
        }
        problems
    }

    /// Defaults overridden by `QUICKFILTER_*` environment variables.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var(ENV_DEBOUNCE_MS) {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => config.debounce_window = Duration::from_millis(ms),
                _ => tracing::warn!(
                    "Ignoring {}={:?}: expected a positive number of milliseconds",
                    ENV_DEBOUNCE_MS,
                    raw
                ),
            }
        }

        if let Ok(raw) = std::env::var(ENV_MODIFIER) {
            match raw.parse::<Modifier>() {
                Ok(modifier) => config.required_modifier = modifier,
                Err(e) => tracing::warn!("Ignoring {}: {}", ENV_MODIFIER, e),
            }
        }

        if let Ok(raw) = std::env::var(ENV_WATCH_LAYOUT) {
            match parse_flag(&raw) {
                Some(watch) => config.watch_layout = watch,
                None => tracing::warn!(
                    "Ignoring {}={:?}: expected true/false",
                    ENV_WATCH_LAYOUT,
                    raw
                ),
            }
        }

        if let Ok(level) = std::env::var(ENV_LOG_LEVEL) {
            if !level.trim().is_empty() {
                config.logging.level = level.trim().to_string();
            }
        }

        config
    }

    /// Parse a host settings blob. Missing fields keep their defaults.
    ///
    /// ```json
    /// { "debounceMs": 300, "modifier": "ctrl", "watchLayout": false }
    /// ```
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: RawSettings = serde_json::from_str(json)?;
        let mut config = Self::default();

        if let Some(ms) = raw.debounce_ms {
            config.debounce_window = Duration::from_millis(ms);
        }
        if let Some(modifier) = raw.modifier {
            config.required_modifier = modifier
                .parse()
                .map_err(|message| ConfigError::InvalidValue {
                    field: "modifier",
                    message,
                })?;
        }
        if let Some(event_type) = raw.click_event_type {
            config.click_event_type = event_type;
        }
        if let Some(capture) = raw.capture {
            config.capture = capture;
        }
        if let Some(capacity) = raw.bus_capacity {
            config.bus_capacity = capacity;
        }
        if let Some(watch) = raw.watch_layout {
            config.watch_layout = watch;
        }
        if let Some(level) = raw.log_level {
            config.logging.level = level;
        }
        if let Some(json) = raw.log_json {
            config.logging.json = json;
        }

        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSettings {
    debounce_ms: Option<u64>,
    modifier: Option<String>,
    click_event_type: Option<String>,
    capture: Option<bool>,
    bus_capacity: Option<usize>,
    watch_layout: Option<bool>,
    log_level: Option<String>,
    log_json: Option<bool>,
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
