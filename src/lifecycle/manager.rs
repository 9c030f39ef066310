//! Per-tab bind/unbind orchestration.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::binding::TabBinding;
use crate::bridge::EventBus;
use crate::columns::ColumnResolver;
use crate::config::BridgeConfig;
use crate::error::{BridgeError, ErrorContext};
use crate::listeners::ListenerRegistry;
use crate::traits::{TabId, TabResolver, WindowId};

/// Result of [`LifecycleManager::bind_tab`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    /// The tab is now bound.
    Bound,
    /// The tab was already bound; nothing changed.
    AlreadyBound,
    /// The tab could not be bound. The reason was logged.
    Skipped,
}

/// A binding whose teardown did not go cleanly.
#[derive(Debug)]
pub struct TeardownFailure {
    pub window_id: WindowId,
    pub tabs: Vec<TabId>,
    pub error: BridgeError,
}

/// Summary of [`LifecycleManager::shutdown_all`].
#[derive(Debug, Default)]
pub struct ShutdownReport {
    /// Cleanup was skipped because the host is going away.
    pub skipped: bool,
    pub tabs_torn_down: usize,
    pub bindings_torn_down: usize,
    pub failures: Vec<TeardownFailure>,
}

impl ShutdownReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Default)]
struct ManagerState {
    tabs: HashMap<TabId, WindowId>,
    bindings: HashMap<WindowId, TabBinding>,
}

/// Owns every tab binding and the shared registry and bus.
///
/// Binding needs a tokio runtime (the watchers' debounce timers run on it).
/// Host calls are made without holding the state lock.
pub struct LifecycleManager {
    tabs: Arc<dyn TabResolver>,
    registry: Arc<ListenerRegistry>,
    bus: EventBus,
    config: BridgeConfig,
    state: Mutex<ManagerState>,
    host_teardown: AtomicBool,
}

impl LifecycleManager {
    /// Invalid config values are logged and replaced with defaults.
    pub fn new(tabs: Arc<dyn TabResolver>, config: BridgeConfig) -> Self {
        let config = config.sanitized();
        let bus = EventBus::new(config.bus_capacity);
        Self::with_bus(tabs, bus, config)
    }

    /// Use an existing bus, e.g. one the policy layer already subscribed to.
    pub fn with_bus(tabs: Arc<dyn TabResolver>, bus: EventBus, config: BridgeConfig) -> Self {
        Self {
            tabs,
            registry: Arc::new(ListenerRegistry::new()),
            bus,
            config: config.sanitized(),
            state: Mutex::new(ManagerState::default()),
            host_teardown: AtomicBool::new(false),
        }
    }

    pub fn registry(&self) -> &Arc<ListenerRegistry> {
        &self.registry
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Bind `tab`: attach the click listener and start the watchers.
    ///
    /// Never fails. Resolution misses and registration failures are logged
    /// and reported as [`BindOutcome::Skipped`]; other tabs are unaffected.
    pub fn bind_tab(&self, tab: TabId) -> BindOutcome {
        if self.is_bound(tab) {
            tracing::debug!("Tab {} already bound", tab);
            return BindOutcome::AlreadyBound;
        }

        let ctx = || ErrorContext::new("bind_tab").with_tab(tab);

        let window = match self.tabs.window_for_tab(tab) {
            Some(window) => window,
            None => {
                BridgeError::resolution(format!("window for tab {}", tab))
                    .with_context(ctx())
                    .log();
                return BindOutcome::Skipped;
            }
        };
        let table = match window.table() {
            Some(table) => table,
            None => {
                BridgeError::resolution(format!("message table in window {}", window.window_id()))
                    .with_context(ctx())
                    .log();
                return BindOutcome::Skipped;
            }
        };
        let window_id = window.window_id();
        let table_id = table.target_id();

        // Another tab may already have bound this window's table.
        {
            let mut state = self.lock();
            if state.tabs.contains_key(&tab) {
                return BindOutcome::AlreadyBound;
            }
            if Self::join_existing(&mut state, tab, window_id, table_id) {
                tracing::info!("Tab {} shares the binding of window {}", tab, window_id);
                return BindOutcome::Bound;
            }
        }

        let binding = match TabBinding::build(
            tab,
            window,
            table,
            &self.registry,
            &self.bus,
            &self.config,
        ) {
            Ok(binding) => binding,
            Err(e) => {
                e.log();
                return BindOutcome::Skipped;
            }
        };

        // Re-check: a concurrent bind may have won while we were building.
        let (outcome, discard) = {
            let mut state = self.lock();
            if state.tabs.contains_key(&tab) {
                (BindOutcome::AlreadyBound, Some(binding))
            } else if Self::join_existing(&mut state, tab, window_id, table_id) {
                (BindOutcome::Bound, Some(binding))
            } else {
                let mut binding = binding;
                let stale = state.bindings.remove(&window_id);
                if let Some(stale) = &stale {
                    // The window swapped its table; carry its tabs over.
                    for other in stale.tabs() {
                        binding.add_tab(other);
                    }
                }
                state.tabs.insert(tab, window_id);
                state.bindings.insert(window_id, binding);
                (BindOutcome::Bound, stale)
            }
        };

        if let Some(discard) = discard {
            for e in discard.teardown(&self.registry) {
                e.log();
            }
        }
        outcome
    }

    fn join_existing(
        state: &mut ManagerState,
        tab: TabId,
        window_id: WindowId,
        table_id: u64,
    ) -> bool {
        match state.bindings.get_mut(&window_id) {
            Some(existing) if existing.table_id() == table_id => {
                existing.add_tab(tab);
                state.tabs.insert(tab, window_id);
                true
            }
            _ => false,
        }
    }

    /// Unbind a single tab. Returns whether it was bound.
    ///
    /// The window's binding is torn down once no tab uses it.
    pub fn unbind_tab(&self, tab: TabId) -> bool {
        let released = {
            let mut state = self.lock();
            let window_id = match state.tabs.remove(&tab) {
                Some(window_id) => window_id,
                None => return false,
            };
            let last = state
                .bindings
                .get_mut(&window_id)
                .map(|binding| binding.remove_tab(tab))
                .unwrap_or(false);
            if last {
                state.bindings.remove(&window_id)
            } else {
                None
            }
        };

        if let Some(binding) = released {
            for e in binding.teardown(&self.registry) {
                e.log();
            }
        }
        tracing::debug!("Tab {} unbound", tab);
        true
    }

    /// Tear down every binding.
    ///
    /// With `is_host_teardown` set nothing is cleaned up: the host is
    /// exiting and reclaims everything itself. Otherwise every binding is
    /// torn down even if others fail; failures are logged and reported.
    pub fn shutdown_all(&self, is_host_teardown: bool) -> ShutdownReport {
        if is_host_teardown {
            self.host_teardown.store(true, Ordering::SeqCst);
            tracing::info!("Host teardown, skipping cleanup");
            return ShutdownReport {
                skipped: true,
                ..Default::default()
            };
        }

        let mut bindings: Vec<TabBinding> = {
            let mut state = self.lock();
            state.tabs.clear();
            state.bindings.drain().map(|(_, binding)| binding).collect()
        };
        bindings.sort_by_key(|b| b.window_id());

        let mut report = ShutdownReport::default();
        for binding in bindings {
            let window_id = binding.window_id();
            let tabs = binding.tabs();
            let errors = binding.teardown(&self.registry);

            report.bindings_torn_down += 1;
            report.tabs_torn_down += tabs.len();
            for error in errors {
                error.log();
                report.failures.push(TeardownFailure {
                    window_id,
                    tabs: tabs.clone(),
                    error,
                });
            }
        }

        tracing::info!(
            "Shutdown complete: {} tabs, {} bindings, {} failures",
            report.tabs_torn_down,
            report.bindings_torn_down,
            report.failures.len()
        );
        report
    }

    pub fn is_bound(&self, tab: TabId) -> bool {
        self.lock().tabs.contains_key(&tab)
    }

    /// Bound tabs in ascending order.
    pub fn bound_tabs(&self) -> Vec<TabId> {
        let mut tabs: Vec<TabId> = self.lock().tabs.keys().copied().collect();
        tabs.sort();
        tabs
    }

    /// Number of distinct window bindings.
    pub fn binding_count(&self) -> usize {
        self.lock().bindings.len()
    }

    /// Resolver of a bound window.
    pub fn resolver_for(&self, window: WindowId) -> Option<Arc<ColumnResolver>> {
        self.lock()
            .bindings
            .get(&window)
            .map(|binding| Arc::clone(binding.resolver()))
    }

    /// Window a bound tab resolved to.
    pub fn window_of(&self, tab: TabId) -> Option<WindowId> {
        self.lock().tabs.get(&tab).copied()
    }

    fn lock(&self) -> MutexGuard<'_, ManagerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for LifecycleManager {
    fn drop(&mut self) {
        if self.host_teardown.load(Ordering::SeqCst) {
            return;
        }
        if self.binding_count() > 0 {
            tracing::debug!("Lifecycle manager dropped with live bindings, cleaning up");
            self.shutdown_all(false);
        }
    }
}

impl std::fmt::Debug for LifecycleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleManager")
            .field("bound_tabs", &self.bound_tabs())
            .field("bindings", &self.binding_count())
            .field("listeners", &self.registry.count())
            .finish()
    }
}
