//! In-memory message list table.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::dom::MockElement;
use super::listeners::ListenerSet;
use crate::error::HostError;
use crate::traits::{
    header_cells_under, DomEvent, ElementRef, EventCallback, EventTarget, HostListenerId,
    ListenerOptions, MutationCallback, MutationRecord, ObserverHandle, TableView,
};

static NEXT_TABLE_HANDLE: AtomicU64 = AtomicU64::new(1_000);

struct ObserverEntry {
    id: u64,
    callback: MutationCallback,
    active: Arc<AtomicBool>,
}

type ObserverList = Arc<Mutex<Vec<ObserverEntry>>>;

/// In-memory table with a header row and a body of message rows.
///
/// Structural edits made through the `insert_*`/`remove_*`/`reclass_*`
/// helpers are reported to active mutation observers the way a real DOM
/// would; the `push_*` helpers build fixtures silently.
///
/// # Failure injection
///
/// - [`invalidate`](Self::invalidate) makes every host call fail with
///   [`HostError::Detached`], as if the table had been torn down.
/// - [`set_fail_attach`](Self::set_fail_attach),
///   [`set_fail_detach`](Self::set_fail_detach) and
///   [`set_fail_observe`](Self::set_fail_observe) fail the respective call.
pub struct MockTable {
    handle: u64,
    root: Arc<MockElement>,
    header_row: Arc<MockElement>,
    body: Arc<MockElement>,
    listeners: ListenerSet,
    observers: ObserverList,
    next_observer: AtomicU64,
    fail_observe: AtomicBool,
    header_queries: AtomicUsize,
}

impl MockTable {
    /// Create an empty table.
    pub fn new() -> Arc<Self> {
        let root = MockElement::other();
        let header_row = MockElement::other();
        let body = MockElement::other();
        root.append_child(&header_row);
        root.append_child(&body);

        Arc::new(Self {
            handle: NEXT_TABLE_HANDLE.fetch_add(1, Ordering::Relaxed),
            root,
            header_row,
            body,
            listeners: ListenerSet::default(),
            observers: Arc::new(Mutex::new(Vec::new())),
            next_observer: AtomicU64::new(1),
            fail_observe: AtomicBool::new(false),
            header_queries: AtomicUsize::new(0),
        })
    }

    /// Create a table with one header per entry, each carrying a single
    /// class token.
    pub fn with_headers<I, S>(headers: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let table = Self::new();
        for class in headers {
            let class: String = class.into();
            table.push_header([class]);
        }
        table
    }

    pub fn root(&self) -> Arc<MockElement> {
        Arc::clone(&self.root)
    }

    pub fn header_row(&self) -> Arc<MockElement> {
        Arc::clone(&self.header_row)
    }

    pub fn body(&self) -> Arc<MockElement> {
        Arc::clone(&self.body)
    }

    /// Append a header cell without notifying observers.
    pub fn push_header<I, S>(&self, classes: I) -> Arc<MockElement>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let header = MockElement::header(classes);
        self.header_row.append_child(&header);
        header
    }

    /// Append a row of cells without notifying observers.
    pub fn push_row(&self, cells: &[Arc<MockElement>]) -> Arc<MockElement> {
        let row = MockElement::row();
        for cell in cells {
            row.append_child(cell);
        }
        self.body.append_child(&row);
        row
    }

    /// Append a header cell and report the insertion.
    pub fn insert_header<I, S>(&self, classes: I) -> Arc<MockElement>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let header = self.push_header(classes);
        self.notify(&[MutationRecord::child_list(
            self.header_row.clone(),
            vec![header.clone() as ElementRef],
            vec![],
        )]);
        header
    }

    /// Remove a header cell and report the removal.
    pub fn remove_header(&self, header: &Arc<MockElement>) -> bool {
        let removed = self.header_row.remove_child(header);
        if removed {
            self.notify(&[MutationRecord::child_list(
                self.header_row.clone(),
                vec![],
                vec![header.clone() as ElementRef],
            )]);
        }
        removed
    }

    /// Replace the whole header row and report the swap, the way a host
    /// rebuilds its column picker.
    pub fn replace_header_row<I, S>(&self, headers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let old_children = self.header_row.children_arcs();
        for child in &old_children {
            self.header_row.remove_child(child);
        }
        let removed: Vec<ElementRef> = old_children
            .into_iter()
            .map(|child| child as ElementRef)
            .collect();
        let added: Vec<ElementRef> = headers
            .into_iter()
            .map(|class| {
                let class: String = class.into();
                self.push_header([class]) as ElementRef
            })
            .collect();
        self.notify(&[MutationRecord::child_list(
            self.header_row.clone(),
            added,
            removed,
        )]);
    }

    /// Change a header's class tokens and report the attribute change.
    pub fn reclass_header<I, S>(&self, header: &Arc<MockElement>, classes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        header.set_classes(classes);
        self.notify(&[MutationRecord::attribute(header.clone(), "class")]);
    }

    /// Append a message row and report the insertion.
    pub fn insert_row(&self, cells: &[Arc<MockElement>]) -> Arc<MockElement> {
        let row = self.push_row(cells);
        self.notify(&[MutationRecord::child_list(
            self.body.clone(),
            vec![row.clone() as ElementRef],
            vec![],
        )]);
        row
    }

    /// Deliver a batch of mutation records to active observers.
    ///
    /// Returns the number of observers the batch was delivered to.
    pub fn notify(&self, records: &[MutationRecord]) -> usize {
        if self.listeners.invalid.load(Ordering::SeqCst) {
            return 0;
        }

        let callbacks: Vec<(MutationCallback, Arc<AtomicBool>)> = self
            .observers
            .lock()
            .unwrap()
            .iter()
            .map(|o| (Arc::clone(&o.callback), Arc::clone(&o.active)))
            .collect();

        let mut delivered = 0;
        for (callback, active) in callbacks {
            if active.load(Ordering::SeqCst) {
                callback(records);
                delivered += 1;
            }
        }
        delivered
    }

    /// Dispatch a DOM event to the attached listeners.
    pub fn dispatch(&self, event: &DomEvent) -> usize {
        self.listeners.dispatch(event)
    }

    /// Make every subsequent host call fail as if the table were gone.
    pub fn invalidate(&self) {
        self.listeners.invalid.store(true, Ordering::SeqCst);
    }

    pub fn set_fail_attach(&self, fail: bool) {
        self.listeners.fail_attach.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_detach(&self, fail: bool) {
        self.listeners.fail_detach.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_observe(&self, fail: bool) {
        self.fail_observe.store(fail, Ordering::SeqCst);
    }

    /// Number of listeners currently attached.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Number of listeners attached for one event type.
    pub fn listener_count_for(&self, event_type: &str) -> usize {
        self.listeners.count_for(event_type)
    }

    /// Number of observers currently connected.
    pub fn observer_count(&self) -> usize {
        self.observers
            .lock()
            .unwrap()
            .iter()
            .filter(|o| o.active.load(Ordering::SeqCst))
            .count()
    }

    /// Total successful listener attachments.
    pub fn attach_calls(&self) -> usize {
        self.listeners.attach_calls()
    }

    /// Total successful listener detachments.
    pub fn detach_calls(&self) -> usize {
        self.listeners.detach_calls()
    }

    /// How many times the header cells were queried.
    pub fn header_queries(&self) -> usize {
        self.header_queries.load(Ordering::SeqCst)
    }
}

impl EventTarget for MockTable {
    fn target_id(&self) -> u64 {
        self.handle
    }

    fn add_listener(
        &self,
        event_type: &str,
        callback: EventCallback,
        options: ListenerOptions,
    ) -> Result<HostListenerId, HostError> {
        self.listeners
            .add(self.handle, event_type, callback, options)
    }

    fn remove_listener(&self, id: HostListenerId) -> Result<(), HostError> {
        self.listeners.remove(self.handle, id)
    }
}

impl TableView for MockTable {
    fn header_cells(&self) -> Result<Vec<ElementRef>, HostError> {
        if self.listeners.invalid.load(Ordering::SeqCst) {
            return Err(HostError::Detached {
                handle: self.handle,
            });
        }
        self.header_queries.fetch_add(1, Ordering::SeqCst);
        let root: ElementRef = self.root.clone();
        Ok(header_cells_under(&root))
    }

    fn observe_mutations(
        &self,
        callback: MutationCallback,
    ) -> Result<Box<dyn ObserverHandle>, HostError> {
        if self.listeners.invalid.load(Ordering::SeqCst) {
            return Err(HostError::Detached {
                handle: self.handle,
            });
        }
        if self.fail_observe.load(Ordering::SeqCst) {
            return Err(HostError::ObserveFailed {
                message: "mock observe failure".to_string(),
            });
        }

        let id = self.next_observer.fetch_add(1, Ordering::SeqCst);
        let active = Arc::new(AtomicBool::new(true));
        self.observers.lock().unwrap().push(ObserverEntry {
            id,
            callback,
            active: Arc::clone(&active),
        });

        Ok(Box::new(MockObserver {
            id,
            handle: self.handle,
            active,
            observers: Arc::clone(&self.observers),
            invalid: Arc::clone(&self.listeners.invalid),
            fail_detach: Arc::clone(&self.listeners.fail_detach),
        }))
    }
}

/// Observer handle returned by [`MockTable::observe_mutations`].
struct MockObserver {
    id: u64,
    handle: u64,
    active: Arc<AtomicBool>,
    observers: ObserverList,
    invalid: Arc<AtomicBool>,
    fail_detach: Arc<AtomicBool>,
}

impl ObserverHandle for MockObserver {
    fn disconnect(&self) -> Result<(), HostError> {
        if !self.active.load(Ordering::SeqCst) {
            return Ok(());
        }
        if self.invalid.load(Ordering::SeqCst) {
            return Err(HostError::Detached {
                handle: self.handle,
            });
        }
        if self.fail_detach.load(Ordering::SeqCst) {
            return Err(HostError::ObserveFailed {
                message: "mock disconnect failure".to_string(),
            });
        }

        self.active.store(false, Ordering::SeqCst);
        self.observers.lock().unwrap().retain(|o| o.id != self.id);
        Ok(())
    }
}
