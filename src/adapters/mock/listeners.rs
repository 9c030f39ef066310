//! Listener bookkeeping shared by the mock table and window.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::HostError;
use crate::traits::{DomEvent, EventCallback, HostListenerId, ListenerOptions};

struct ListenerEntry {
    id: HostListenerId,
    event_type: String,
    callback: EventCallback,
    options: ListenerOptions,
}

/// Attached listeners plus failure switches and call counters.
#[derive(Default)]
pub(crate) struct ListenerSet {
    next_id: AtomicU64,
    entries: Mutex<Vec<ListenerEntry>>,
    pub(crate) invalid: Arc<AtomicBool>,
    pub(crate) fail_attach: AtomicBool,
    pub(crate) fail_detach: Arc<AtomicBool>,
    attach_calls: AtomicUsize,
    detach_calls: AtomicUsize,
}

impl ListenerSet {
    pub(crate) fn add(
        &self,
        handle: u64,
        event_type: &str,
        callback: EventCallback,
        options: ListenerOptions,
    ) -> Result<HostListenerId, HostError> {
        if self.invalid.load(Ordering::SeqCst) {
            return Err(HostError::Detached { handle });
        }
        if self.fail_attach.load(Ordering::SeqCst) {
            return Err(HostError::AttachFailed {
                event_type: event_type.to_string(),
                message: "mock attach failure".to_string(),
            });
        }

        let id = HostListenerId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.entries.lock().unwrap().push(ListenerEntry {
            id,
            event_type: event_type.to_string(),
            callback,
            options,
        });
        self.attach_calls.fetch_add(1, Ordering::SeqCst);
        Ok(id)
    }

    pub(crate) fn remove(&self, handle: u64, id: HostListenerId) -> Result<(), HostError> {
        if self.invalid.load(Ordering::SeqCst) {
            return Err(HostError::Detached { handle });
        }
        if self.fail_detach.load(Ordering::SeqCst) {
            return Err(HostError::DetachFailed {
                message: "mock detach failure".to_string(),
            });
        }

        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|e| e.id != id);
        if entries.len() != before {
            self.detach_calls.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    /// Deliver `event` to every matching listener, capture-phase listeners
    /// first. The entry list is snapshotted so callbacks may detach listeners
    /// while the event is being dispatched.
    pub(crate) fn dispatch(&self, event: &DomEvent) -> usize {
        if self.invalid.load(Ordering::SeqCst) {
            return 0;
        }

        let mut matching: Vec<(bool, EventCallback)> = self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.event_type == event.event_type)
            .map(|e| (e.options.capture, Arc::clone(&e.callback)))
            .collect();
        matching.sort_by_key(|(capture, _)| !*capture);

        for (_, callback) in &matching {
            callback(event);
        }
        matching.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub(crate) fn count_for(&self, event_type: &str) -> usize {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.event_type == event_type)
            .count()
    }

    pub(crate) fn attach_calls(&self) -> usize {
        self.attach_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn detach_calls(&self) -> usize {
        self.detach_calls.load(Ordering::SeqCst)
    }
}
