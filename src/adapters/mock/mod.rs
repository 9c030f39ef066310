//! In-memory host implementations for testing.
//!
//! This module provides mock implementations of all capability traits,
//! enabling the bridge to be exercised without a real UI tree.
//!
//! # Available Mocks
//!
//! - [`MockElement`] - element tree node with classes, attributes and text
//! - [`MockTable`] - message list table with structural edit helpers
//! - [`MockWindow`] - window owning a table, target of layout signals
//! - [`MockTabs`] - tab id to window resolution

pub mod dom;
mod listeners;
pub mod table;
pub mod window;

pub use dom::MockElement;
pub use table::MockTable;
pub use window::{MockTabs, MockWindow};
