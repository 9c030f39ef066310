//! Listener bookkeeping.
//!
//! Every listener the bridge attaches goes through [`ListenerRegistry`], so
//! teardown can find and detach all of them.

mod registry;

pub use registry::{CleanupReport, ListenerBinding, ListenerId, ListenerRegistry};
