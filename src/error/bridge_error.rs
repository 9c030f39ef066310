//! Unified error type for the column click bridge.
//!
//! `BridgeError` groups every failure by its place in the error taxonomy
//! (resolution, registration, cleanup, consumer, configuration) so callers
//! can decide between aborting, skipping and logging without inspecting
//! host-specific details.

use std::fmt;

use super::category::ErrorCategory;
use super::context::ErrorContext;
use super::host::HostError;
use crate::config::ConfigError;

/// Unified error type for the bridge.
#[derive(Debug)]
pub enum BridgeError {
    /// Something the bridge needed could not be found.
    Resolution { what: String },

    /// Attaching a listener or observer failed.
    Registration(HostError),

    /// Detaching a listener or observer failed.
    Cleanup(HostError),

    /// A subscriber returned an error or panicked.
    Consumer { subscriber: u64, message: String },

    /// Invalid configuration.
    Config(ConfigError),

    /// Wrapped error with additional context.
    WithContext {
        error: Box<BridgeError>,
        context: ErrorContext,
    },
}

impl BridgeError {
    /// Shorthand for a resolution miss.
    pub fn resolution(what: impl Into<String>) -> Self {
        BridgeError::Resolution { what: what.into() }
    }

    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            BridgeError::Resolution { .. } => ErrorCategory::Resolution,
            BridgeError::Registration(_) => ErrorCategory::Registration,
            BridgeError::Cleanup(_) => ErrorCategory::Cleanup,
            BridgeError::Consumer { .. } => ErrorCategory::Consumer,
            BridgeError::Config(_) => ErrorCategory::Configuration,
            BridgeError::WithContext { error, .. } => error.category(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            BridgeError::Resolution { .. } => "E_RESOLUTION",
            BridgeError::Registration(err) | BridgeError::Cleanup(err) => err.error_code(),
            BridgeError::Consumer { .. } => "E_CONSUMER",
            BridgeError::Config(_) => "E_CONFIG",
            BridgeError::WithContext { error, .. } => error.error_code(),
        }
    }

    /// Attach context to this error.
    pub fn with_context(self, ctx: ErrorContext) -> Self {
        BridgeError::WithContext {
            error: Box::new(self),
            context: ctx,
        }
    }

    /// Get the context if this error has one attached.
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            BridgeError::WithContext { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Get the inner error without context.
    pub fn inner(&self) -> &BridgeError {
        match self {
            BridgeError::WithContext { error, .. } => error.inner(),
            _ => self,
        }
    }

    /// The host error underneath, if this failure came from the host layer.
    pub fn host_error(&self) -> Option<&HostError> {
        match self.inner() {
            BridgeError::Registration(err) | BridgeError::Cleanup(err) => Some(err),
            _ => None,
        }
    }

    /// Emit this error through tracing at the level its category calls for.
    pub fn log(&self) {
        let code = self.error_code();
        let category = self.category();
        match category {
            ErrorCategory::Resolution | ErrorCategory::Configuration => {
                tracing::warn!(code, %category, "{}", self)
            }
            ErrorCategory::Registration | ErrorCategory::Cleanup | ErrorCategory::Consumer => {
                tracing::error!(code, %category, "{}", self)
            }
        }
    }
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeError::Resolution { what } => write!(f, "could not resolve {}", what),
            BridgeError::Registration(err) => write!(f, "registration failed: {}", err),
            BridgeError::Cleanup(err) => write!(f, "cleanup failed: {}", err),
            BridgeError::Consumer {
                subscriber,
                message,
            } => write!(f, "subscriber {} failed: {}", subscriber, message),
            BridgeError::Config(err) => write!(f, "{}", err),
            BridgeError::WithContext { error, context } => write!(f, "{} ({})", error, context),
        }
    }
}

impl std::error::Error for BridgeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BridgeError::Registration(err) | BridgeError::Cleanup(err) => Some(err),
            BridgeError::Config(err) => Some(err),
            BridgeError::WithContext { error, .. } => error.source(),
            _ => None,
        }
    }
}

// ============================================================================
// From implementations for automatic error conversion
// ============================================================================

impl From<ConfigError> for BridgeError {
    fn from(err: ConfigError) -> Self {
        BridgeError::Config(err)
    }
}
