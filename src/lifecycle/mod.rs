//! Tab lifecycle: binding tables when tabs open, tearing down on close and
//! at shutdown.

mod binding;
mod manager;

pub use binding::TabBinding;
pub use manager::{BindOutcome, LifecycleManager, ShutdownReport, TeardownFailure};
