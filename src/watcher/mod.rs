//! Change detection for the column layout.
//!
//! Two watchers feed the same refresh policy: the table's own structural
//! mutations, and layout signals on the owning window.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐
//! │ MutationWatcher  │     │  LayoutWatcher   │
//! │ (table observer) │     │ (window events)  │
//! └────────┬─────────┘     └────────┬─────────┘
//!          │ header changes         │ resize / theme
//!          ▼                        ▼
//!  ┌───────────────┐        ┌───────────────┐
//!  │   Debouncer   │        │   Debouncer   │
//!  │   (500ms)     │        │   (500ms)     │
//!  └───────┬───────┘        └───────┬───────┘
//!          └───────────┬────────────┘
//!                      ▼
//!          ┌───────────────────────┐
//!          │ ColumnResolver.refresh│
//!          └───────────┬───────────┘
//!                      ▼
//!          ┌───────────────────────┐
//!          │ StructureChanged topic│
//!          └───────────────────────┘
//! ```
//!
//! Watchers need a tokio runtime for their debounce timers.

mod debouncer;
mod layout;
mod mutation;

pub use debouncer::{Debouncer, DEFAULT_DEBOUNCE};
pub use layout::{LayoutWatcher, LAYOUT_EVENTS};
pub use mutation::{is_column_affecting, MutationWatcher};

use crate::error::BridgeResult;

/// A running watcher owned by a tab binding.
pub trait Watcher: Send + Sync {
    /// Short label for logs.
    fn name(&self) -> &'static str;

    fn is_connected(&self) -> bool;

    /// Stop all future callbacks, including a pending debounce.
    ///
    /// Safe to call more than once; later calls return `Ok(())`.
    fn disconnect(&self) -> BridgeResult<()>;
}
