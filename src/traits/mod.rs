//! Capability traits for the host UI tree.
//!
//! These traits are the only way the bridge touches the host. The host
//! integration layer implements them; tests use the in-memory versions in
//! [`crate::adapters::mock`].
//!
//! # Traits
//!
//! - [`Element`] - read-only view of a node (role, class tokens, title, text)
//! - [`EventTarget`] - attach/detach event listeners
//! - [`TableView`] - header cells and structural observation of the table
//! - [`WindowView`] - the window owning a table, target of layout signals
//! - [`TabResolver`] - tab id to window resolution
//! - [`ObserverHandle`] - disconnectable structural observer

pub mod element;
pub mod event;
pub mod host;

pub use element::{
    cell_text, closest_cell, column_tokens, contains_header_cell, header_cells_under, Element,
    ElementRef, ElementRole, COLUMN_CLASS_SUFFIX,
};
pub use event::{DomEvent, Modifier, Modifiers, PointerButton};
pub use host::{
    EventCallback, EventTarget, HostListenerId, ListenerOptions, MutationCallback, MutationKind,
    MutationRecord, ObserverHandle, TabId, TabResolver, TableView, WindowId, WindowView,
};
