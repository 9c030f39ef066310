//! Common test utilities for integration tests.
//!
//! This module provides a builder for an in-memory host with bound tabs,
//! plus helpers for building message rows and synthesizing clicks.
//!
//! # Example
//!
//! ```ignore
//! let host = TestHostBuilder::new()
//!     .with_tab(1, &["sendercol-column", "subjectcol-column"])
//!     .build();
//! host.manager.bind_tab(TabId(1));
//! ```

#![allow(dead_code)]

pub mod mocks;

pub use mocks::*;

use std::sync::Arc;

use quickfilter::config::BridgeConfig;
use quickfilter::lifecycle::LifecycleManager;
use quickfilter::traits::{DomEvent, ElementRef, Modifiers, PointerButton, TabId};

/// Default header layout of a message list.
pub const DEFAULT_HEADERS: &[&str] = &[
    "threadcol-column",
    "sendercol-column",
    "subjectcol-column",
    "recipientcol-column",
    "datecol-column",
];

/// An in-memory host: tabs, their windows and tables, and a manager.
pub struct TestHost {
    pub tabs: Arc<MockTabs>,
    pub windows: Vec<(TabId, Arc<MockWindow>)>,
    pub manager: LifecycleManager,
}

impl TestHost {
    pub fn window(&self, tab: u64) -> Arc<MockWindow> {
        self.windows
            .iter()
            .find(|(id, _)| *id == TabId(tab))
            .map(|(_, w)| Arc::clone(w))
            .expect("unknown tab")
    }

    pub fn table(&self, tab: u64) -> Arc<MockTable> {
        self.window(tab).mock_table().expect("tab has no table")
    }

    /// Bind every configured tab.
    pub fn bind_all(&self) {
        for (tab, _) in &self.windows {
            self.manager.bind_tab(*tab);
        }
    }
}

/// Builder for [`TestHost`].
pub struct TestHostBuilder {
    tabs: Vec<(u64, Vec<String>)>,
    config: BridgeConfig,
}

impl TestHostBuilder {
    pub fn new() -> Self {
        Self {
            tabs: Vec::new(),
            config: BridgeConfig::default(),
        }
    }

    /// Add a tab whose window shows a table with these header classes.
    pub fn with_tab(mut self, tab: u64, headers: &[&str]) -> Self {
        self.tabs
            .push((tab, headers.iter().map(|h| h.to_string()).collect()));
        self
    }

    pub fn with_config(mut self, config: BridgeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> TestHost {
        let tabs = MockTabs::new();
        let mut windows = Vec::new();
        for (tab, headers) in self.tabs {
            let table = MockTable::with_headers(headers);
            let window = MockWindow::with_table(1000 + tab, table);
            tabs.insert(TabId(tab), Arc::clone(&window));
            windows.push((TabId(tab), window));
        }
        let manager = LifecycleManager::new(tabs.clone(), self.config);
        TestHost {
            tabs,
            windows,
            manager,
        }
    }
}

/// Append a message row. Each cell is `(class, title, text)`.
///
/// Returns the cells in order.
pub fn message_row(table: &MockTable, cells: &[(&str, Option<&str>, &str)]) -> Vec<Arc<MockElement>> {
    let built: Vec<Arc<MockElement>> = cells
        .iter()
        .map(|(class, title, text)| {
            let cell = MockElement::cell([*class]).with_text(*text);
            match title {
                Some(title) => cell.with_title(*title),
                None => cell,
            }
        })
        .collect();
    table.insert_row(&built);
    built
}

/// Primary-button click with Alt held.
pub fn alt_click(target: &Arc<MockElement>) -> DomEvent {
    DomEvent::click(
        PointerButton::Primary,
        Modifiers::alt(),
        Some(Arc::clone(target) as ElementRef),
    )
}

/// Primary-button click without modifiers.
pub fn plain_click(target: &Arc<MockElement>) -> DomEvent {
    DomEvent::click(
        PointerButton::Primary,
        Modifiers::none(),
        Some(Arc::clone(target) as ElementRef),
    )
}
