//! quickfilter - Alt-click column filtering for a mail client's message list
//!
//! The bridge listens for modifier-clicks on the message table, works out
//! which semantic column (subject, sender, recipient) was clicked, and
//! publishes that together with the cell's text for a filter policy layer
//! to act on. Column identities are discovered from header class tokens,
//! cached per window, and refreshed when the table's structure changes.
//!
//! # Usage
//!
//! ```ignore
//! use quickfilter::prelude::*;
//!
//! let manager = LifecycleManager::new(host_tabs, BridgeConfig::from_env());
//! manager.bus().register_click_listener(|column, text| {
//!     apply_quick_filter(column, text);
//! });
//! manager.bind_tab(TabId(1));
//! // ...
//! manager.shutdown_all(false);
//! ```

pub mod adapters;
pub mod bridge;
pub mod columns;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod listeners;
pub mod logging;
pub mod prelude;
pub mod traits;
pub mod watcher;
