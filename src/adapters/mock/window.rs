//! In-memory windows and tab resolution.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::listeners::ListenerSet;
use super::table::MockTable;
use crate::error::HostError;
use crate::traits::{
    DomEvent, EventCallback, EventTarget, HostListenerId, ListenerOptions, TabId, TabResolver,
    TableView, WindowId, WindowView,
};

/// In-memory window owning at most one table.
pub struct MockWindow {
    id: WindowId,
    table: Mutex<Option<Arc<MockTable>>>,
    listeners: ListenerSet,
}

impl MockWindow {
    /// Create a window without a table.
    pub fn new(id: u64) -> Arc<Self> {
        Arc::new(Self {
            id: WindowId(id),
            table: Mutex::new(None),
            listeners: ListenerSet::default(),
        })
    }

    /// Create a window showing `table`.
    pub fn with_table(id: u64, table: Arc<MockTable>) -> Arc<Self> {
        let window = Self::new(id);
        window.set_table(Some(table));
        window
    }

    /// Swap the table shown by this window.
    pub fn set_table(&self, table: Option<Arc<MockTable>>) {
        *self.table.lock().unwrap() = table;
    }

    /// The concrete table, for test assertions.
    pub fn mock_table(&self) -> Option<Arc<MockTable>> {
        self.table.lock().unwrap().clone()
    }

    /// Fire a layout signal such as `resize` at this window.
    pub fn fire(&self, event_type: &str) -> usize {
        self.listeners.dispatch(&DomEvent::signal(event_type))
    }

    /// Make every subsequent host call on this window fail.
    pub fn invalidate(&self) {
        self.listeners.invalid.store(true, Ordering::SeqCst);
    }

    pub fn set_fail_attach(&self, fail: bool) {
        self.listeners.fail_attach.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_detach(&self, fail: bool) {
        self.listeners.fail_detach.store(fail, Ordering::SeqCst);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn detach_calls(&self) -> usize {
        self.listeners.detach_calls()
    }
}

impl EventTarget for MockWindow {
    fn target_id(&self) -> u64 {
        self.id.0
    }

    fn add_listener(
        &self,
        event_type: &str,
        callback: EventCallback,
        options: ListenerOptions,
    ) -> Result<HostListenerId, HostError> {
        self.listeners.add(self.id.0, event_type, callback, options)
    }

    fn remove_listener(&self, id: HostListenerId) -> Result<(), HostError> {
        self.listeners.remove(self.id.0, id)
    }
}

impl WindowView for MockWindow {
    fn window_id(&self) -> WindowId {
        self.id
    }

    fn table(&self) -> Option<Arc<dyn TableView>> {
        if self.listeners.invalid.load(Ordering::SeqCst) {
            return None;
        }
        self.table
            .lock()
            .unwrap()
            .clone()
            .map(|t| t as Arc<dyn TableView>)
    }
}

/// In-memory tab manager.
#[derive(Default)]
pub struct MockTabs {
    tabs: Mutex<HashMap<TabId, Arc<MockWindow>>>,
    lookups: AtomicUsize,
}

impl MockTabs {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register `tab` as showing `window`.
    pub fn insert(&self, tab: TabId, window: Arc<MockWindow>) {
        self.tabs.lock().unwrap().insert(tab, window);
    }

    /// Forget `tab`, as if it had been closed.
    pub fn remove(&self, tab: TabId) -> Option<Arc<MockWindow>> {
        self.tabs.lock().unwrap().remove(&tab)
    }

    pub fn window(&self, tab: TabId) -> Option<Arc<MockWindow>> {
        self.tabs.lock().unwrap().get(&tab).cloned()
    }

    /// Number of tab resolutions performed.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl TabResolver for MockTabs {
    fn window_for_tab(&self, tab: TabId) -> Option<Arc<dyn WindowView>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.window(tab).map(|w| w as Arc<dyn WindowView>)
    }
}
