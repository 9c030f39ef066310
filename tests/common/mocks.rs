//! Mock implementations for test fixtures.
//!
//! This module re-exports the in-memory host from `quickfilter::adapters::mock`
//! and provides recorders for what the bridge publishes.

pub use quickfilter::adapters::mock::{MockElement, MockTable, MockTabs, MockWindow};

use std::sync::{Arc, Mutex};

use quickfilter::bridge::{EventBus, StructureChangedEvent, Subscription};
use quickfilter::columns::ColumnType;

/// Records every `(column, text)` pair delivered to a click listener.
#[derive(Clone, Default)]
pub struct ClickRecorder {
    seen: Arc<Mutex<Vec<(ColumnType, String)>>>,
}

impl ClickRecorder {
    /// Register a recorder on `bus`.
    pub fn attach(bus: &EventBus) -> (Self, Subscription) {
        let recorder = Self::default();
        let seen = Arc::clone(&recorder.seen);
        let subscription = bus.register_click_listener(move |column, text| {
            seen.lock().unwrap().push((column, text.to_string()));
        });
        (recorder, subscription)
    }

    pub fn events(&self) -> Vec<(ColumnType, String)> {
        self.seen.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

/// Records structure change notifications.
#[derive(Clone, Default)]
pub struct ChangeRecorder {
    seen: Arc<Mutex<Vec<StructureChangedEvent>>>,
}

impl ChangeRecorder {
    pub fn attach(bus: &EventBus) -> Self {
        let recorder = Self::default();
        let seen = Arc::clone(&recorder.seen);
        let _ = bus.on_structure_changed(move |event| {
            seen.lock().unwrap().push(event.clone());
        });
        recorder
    }

    pub fn events(&self) -> Vec<StructureChangedEvent> {
        self.seen.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}
