//! Error category classification for unified error handling.
//!
//! Every failure inside the bridge falls into one of a small number of
//! categories. The category decides how loudly the failure is logged and
//! whether the surrounding operation keeps going.

use std::fmt;

use tracing::Level;

/// High-level categorization of errors for handling decisions.
///
/// None of these categories is fatal to the host process. The worst outcome
/// of any of them is that a click produces no filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Window, table, cell or column could not be resolved.
    /// Expected during normal use; the operation becomes a no-op.
    Resolution,

    /// Attaching a listener or observer failed.
    /// Aborts the binding of the affected tab only.
    Registration,

    /// Detaching a listener or observer failed during teardown.
    /// Cleanup continues with the remaining entries.
    Cleanup,

    /// A downstream subscriber returned an error or panicked.
    /// Isolated at the publish boundary.
    Consumer,

    /// Invalid settings handed over by the host integration layer.
    Configuration,
}

impl ErrorCategory {
    /// Returns a short label for the category suitable for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Resolution => "resolution",
            ErrorCategory::Registration => "registration",
            ErrorCategory::Cleanup => "cleanup",
            ErrorCategory::Consumer => "consumer",
            ErrorCategory::Configuration => "configuration",
        }
    }

    /// Returns a human-readable description of the category.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCategory::Resolution => "Target could not be resolved",
            ErrorCategory::Registration => "Listener registration failed",
            ErrorCategory::Cleanup => "Listener cleanup failed",
            ErrorCategory::Consumer => "Subscriber callback failed",
            ErrorCategory::Configuration => "Configuration problem",
        }
    }

    /// The tracing level errors of this category are reported at.
    ///
    /// Resolution misses are routine and only warrant a warning; everything
    /// else indicates a broken host or subscriber and is logged as an error.
    pub fn log_level(&self) -> Level {
        match self {
            ErrorCategory::Resolution | ErrorCategory::Configuration => Level::WARN,
            ErrorCategory::Registration | ErrorCategory::Cleanup | ErrorCategory::Consumer => {
                Level::ERROR
            }
        }
    }

    /// Whether the failing operation aborts, as opposed to degrading to a no-op
    /// or continuing with the next item.
    pub fn aborts_operation(&self) -> bool {
        matches!(
            self,
            ErrorCategory::Registration | ErrorCategory::Configuration
        )
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
