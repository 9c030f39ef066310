//! Table, window and tab capabilities.
//!
//! The host integration layer builds these objects and validates them before
//! handing them to the bridge. The bridge treats anything it cannot obtain
//! through them as unavailable and degrades to a no-op.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::element::ElementRef;
use super::event::DomEvent;
use crate::error::HostError;

/// Host tab identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TabId(pub u64);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Host window identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Token the host hands back for an attached listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostListenerId(pub u64);

/// Callback invoked for every delivered event.
pub type EventCallback = Arc<dyn Fn(&DomEvent) + Send + Sync>;

/// Callback invoked with each batch of mutation records.
pub type MutationCallback = Arc<dyn Fn(&[MutationRecord]) + Send + Sync>;

/// Listener attachment options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerOptions {
    /// Deliver during the capture phase, before the host's own handlers.
    pub capture: bool,
    pub passive: bool,
}

impl ListenerOptions {
    pub fn capturing() -> Self {
        Self {
            capture: true,
            passive: false,
        }
    }
}

/// Kind of structural change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationKind {
    /// Nodes were inserted or removed.
    ChildList,
    /// An attribute of `target` changed.
    Attributes { name: String },
}

/// One structural change inside an observed subtree.
#[derive(Debug, Clone)]
pub struct MutationRecord {
    pub kind: MutationKind,
    pub target: ElementRef,
    pub added: Vec<ElementRef>,
    pub removed: Vec<ElementRef>,
}

impl MutationRecord {
    pub fn child_list(target: ElementRef, added: Vec<ElementRef>, removed: Vec<ElementRef>) -> Self {
        Self {
            kind: MutationKind::ChildList,
            target,
            added,
            removed,
        }
    }

    pub fn attribute(target: ElementRef, name: impl Into<String>) -> Self {
        Self {
            kind: MutationKind::Attributes { name: name.into() },
            target,
            added: Vec::new(),
            removed: Vec::new(),
        }
    }
}

/// Something listeners can be attached to.
pub trait EventTarget: Send + Sync {
    /// Stable identity of this target, used for logging and ownership.
    fn target_id(&self) -> u64;

    fn add_listener(
        &self,
        event_type: &str,
        callback: EventCallback,
        options: ListenerOptions,
    ) -> Result<HostListenerId, HostError>;

    fn remove_listener(&self, id: HostListenerId) -> Result<(), HostError>;
}

/// Handle to an active structural observer.
pub trait ObserverHandle: Send + Sync {
    /// Stop delivering records. Calling it again is a no-op.
    fn disconnect(&self) -> Result<(), HostError>;
}

/// The message list table.
pub trait TableView: EventTarget {
    /// Header cells in document order.
    fn header_cells(&self) -> Result<Vec<ElementRef>, HostError>;

    /// Start observing structural changes to the table subtree.
    fn observe_mutations(
        &self,
        callback: MutationCallback,
    ) -> Result<Box<dyn ObserverHandle>, HostError>;
}

/// A window that may own a message list table.
///
/// The window itself is an event target for layout signals such as `resize`.
pub trait WindowView: EventTarget {
    fn window_id(&self) -> WindowId;

    /// The message list table, if this window currently shows one.
    fn table(&self) -> Option<Arc<dyn TableView>>;
}

/// Resolves host tabs to their windows.
pub trait TabResolver: Send + Sync {
    fn window_for_tab(&self, tab: TabId) -> Option<Arc<dyn WindowView>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::MockElement;

    #[test]
    fn test_ids_display() {
        assert_eq!(TabId(12).to_string(), "12");
        assert_eq!(WindowId(3).to_string(), "3");
    }

    #[test]
    fn test_listener_options() {
        let opts = ListenerOptions::capturing();
        assert!(opts.capture);
        assert!(!opts.passive);
        assert!(!ListenerOptions::default().capture);
    }

    #[test]
    fn test_mutation_record_constructors() {
        let target: ElementRef = MockElement::other();
        let added: ElementRef = MockElement::header(["subjectcol-column"]);

        let record = MutationRecord::child_list(target.clone(), vec![added], vec![]);
        assert_eq!(record.kind, MutationKind::ChildList);
        assert_eq!(record.added.len(), 1);

        let record = MutationRecord::attribute(target, "class");
        assert_eq!(
            record.kind,
            MutationKind::Attributes {
                name: "class".to_string()
            }
        );
        assert!(record.added.is_empty());
    }
}
