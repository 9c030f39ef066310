//! Concrete implementations of the capability traits.
//!
//! The production host tree lives in the host integration layer; this crate
//! only ships the in-memory adapters used for tests and for driving the
//! bridge headlessly.
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles for every capability:
//! - [`mock::MockElement`] - element tree node
//! - [`mock::MockTable`] - table with mutation delivery and failure injection
//! - [`mock::MockWindow`] - window with layout signals
//! - [`mock::MockTabs`] - tab resolver

pub mod mock;

pub use mock::{MockElement, MockTable, MockTabs, MockWindow};
