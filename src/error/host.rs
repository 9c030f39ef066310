//! Errors reported by the host capability layer.
//!
//! The host UI tree sits behind the traits in [`crate::traits`]. Any call
//! across that boundary can fail, for instance because the window was
//! closed between two events. These variants describe such failures without
//! exposing anything about the host's own types.

use std::fmt;

/// Host-side failure variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// A capability (window, table, header row) is not available.
    Unavailable { what: String },

    /// The handle refers to a window or table that no longer exists.
    Detached { handle: u64 },

    /// Attaching an event listener failed.
    AttachFailed { event_type: String, message: String },

    /// Detaching an event listener failed.
    DetachFailed { message: String },

    /// Starting or stopping a structural observer failed.
    ObserveFailed { message: String },

    /// No async runtime is available to drive debounce timers.
    NoRuntime,

    /// Generic host error.
    Other { message: String },
}

impl HostError {
    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            HostError::Unavailable { .. } => "E_HOST_UNAVAILABLE",
            HostError::Detached { .. } => "E_HOST_DETACHED",
            HostError::AttachFailed { .. } => "E_HOST_ATTACH",
            HostError::DetachFailed { .. } => "E_HOST_DETACH",
            HostError::ObserveFailed { .. } => "E_HOST_OBSERVE",
            HostError::NoRuntime => "E_HOST_NO_RUNTIME",
            HostError::Other { .. } => "E_HOST_OTHER",
        }
    }

    /// Whether the handle involved is gone for good.
    pub fn is_handle_gone(&self) -> bool {
        matches!(self, HostError::Detached { .. })
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostError::Unavailable { what } => write!(f, "{} is not available", what),
            HostError::Detached { handle } => write!(f, "handle {} is no longer attached", handle),
            HostError::AttachFailed {
                event_type,
                message,
            } => write!(f, "failed to attach '{}' listener: {}", event_type, message),
            HostError::DetachFailed { message } => write!(f, "failed to detach listener: {}", message),
            HostError::ObserveFailed { message } => write!(f, "observer failure: {}", message),
            HostError::NoRuntime => write!(f, "no async runtime available for timers"),
            HostError::Other { message } => write!(f, "host error: {}", message),
        }
    }
}

impl std::error::Error for HostError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_error_display() {
        assert_eq!(
            HostError::Unavailable {
                what: "table".to_string()
            }
            .to_string(),
            "table is not available"
        );
        assert_eq!(
            HostError::Detached { handle: 4 }.to_string(),
            "handle 4 is no longer attached"
        );
        assert_eq!(
            HostError::AttachFailed {
                event_type: "click".to_string(),
                message: "denied".to_string(),
            }
            .to_string(),
            "failed to attach 'click' listener: denied"
        );
    }

    #[test]
    fn test_host_error_codes_unique() {
        use std::collections::HashSet;
        let codes: HashSet<_> = [
            HostError::Unavailable {
                what: String::new(),
            },
            HostError::Detached { handle: 0 },
            HostError::AttachFailed {
                event_type: String::new(),
                message: String::new(),
            },
            HostError::DetachFailed {
                message: String::new(),
            },
            HostError::ObserveFailed {
                message: String::new(),
            },
            HostError::NoRuntime,
            HostError::Other {
                message: String::new(),
            },
        ]
        .iter()
        .map(HostError::error_code)
        .collect();
        assert_eq!(codes.len(), 7);
    }

    #[test]
    fn test_is_handle_gone() {
        assert!(HostError::Detached { handle: 1 }.is_handle_gone());
        assert!(!HostError::NoRuntime.is_handle_gone());
    }
}
