//! Everything registered for one bound window.

use std::collections::BTreeSet;
use std::sync::{Arc, Weak};

use crate::bridge::{ChangeCause, EventBridge, EventBus, StructureChangedEvent};
use crate::columns::ColumnResolver;
use crate::config::BridgeConfig;
use crate::error::{BridgeError, BridgeResult, ErrorContext, ResultExt};
use crate::listeners::{ListenerId, ListenerRegistry};
use crate::traits::{TabId, TableView, WindowId, WindowView};
use crate::watcher::{LayoutWatcher, MutationWatcher, Watcher};

/// Listener, watchers and column cache created for a window's table.
///
/// Tabs resolving to the same window share one binding; it is torn down
/// when the last of them is unbound. Clicks are reported as coming from the
/// lowest tab id still bound.
pub struct TabBinding {
    window_id: WindowId,
    table_id: u64,
    tabs: BTreeSet<TabId>,
    resolver: Arc<ColumnResolver>,
    bridge: Arc<EventBridge>,
    click_listener: ListenerId,
    watchers: Vec<Box<dyn Watcher>>,
}

impl TabBinding {
    /// Register the click listener and start the watchers.
    ///
    /// On failure, whatever was already registered is removed again.
    pub(crate) fn build(
        tab: TabId,
        window: Arc<dyn WindowView>,
        table: Arc<dyn TableView>,
        registry: &Arc<ListenerRegistry>,
        bus: &EventBus,
        config: &BridgeConfig,
    ) -> BridgeResult<Self> {
        let window_id = window.window_id();
        let table_id = table.target_id();
        let ctx = || {
            ErrorContext::new("bind_tab")
                .with_tab(tab)
                .with_component("tab_binding")
        };

        let resolver = Arc::new(ColumnResolver::new(window_id));
        let bridge = EventBridge::new(tab, &window, Arc::clone(&resolver), bus.clone(), config);
        let click_listener = bridge
            .attach(registry, Arc::clone(&table))
            .with_context(ctx)?;

        let mut watchers: Vec<Box<dyn Watcher>> = Vec::with_capacity(2);

        let on_mutation = refresh_on_change(
            Arc::clone(&resolver),
            Arc::downgrade(&window),
            bus.clone(),
            ChangeCause::Mutation,
        );
        match MutationWatcher::observe(table.as_ref(), config.debounce_window, on_mutation) {
            Ok(watcher) => watchers.push(Box::new(watcher)),
            Err(e) => {
                bridge.detach(registry);
                return Err(e.with_context(ctx()));
            }
        }

        if config.watch_layout {
            let on_layout = refresh_on_change(
                Arc::clone(&resolver),
                Arc::downgrade(&window),
                bus.clone(),
                ChangeCause::Layout,
            );
            match LayoutWatcher::start(
                Arc::clone(registry),
                Arc::clone(&window),
                config.debounce_window,
                on_layout,
            ) {
                Ok(watcher) => watchers.push(Box::new(watcher)),
                Err(e) => {
                    for watcher in &watchers {
                        if let Err(cleanup) = watcher.disconnect() {
                            cleanup.log();
                        }
                    }
                    bridge.detach(registry);
                    return Err(e.with_context(ctx()));
                }
            }
        }

        tracing::info!(
            tab = %tab,
            window = %window_id,
            "Bound message table ({} watchers)",
            watchers.len()
        );

        Ok(Self {
            window_id,
            table_id,
            tabs: BTreeSet::from([tab]),
            resolver,
            bridge,
            click_listener,
            watchers,
        })
    }

    pub fn window_id(&self) -> WindowId {
        self.window_id
    }

    pub fn table_id(&self) -> u64 {
        self.table_id
    }

    pub fn tabs(&self) -> Vec<TabId> {
        self.tabs.iter().copied().collect()
    }

    pub fn resolver(&self) -> &Arc<ColumnResolver> {
        &self.resolver
    }

    pub fn bridge(&self) -> &Arc<EventBridge> {
        &self.bridge
    }

    pub fn click_listener(&self) -> ListenerId {
        self.click_listener
    }

    pub fn watcher_names(&self) -> Vec<&'static str> {
        self.watchers.iter().map(|w| w.name()).collect()
    }

    pub(crate) fn add_tab(&mut self, tab: TabId) {
        self.tabs.insert(tab);
        self.sync_origin();
    }

    /// Forget `tab`. Returns true when no tab is left.
    pub(crate) fn remove_tab(&mut self, tab: TabId) -> bool {
        self.tabs.remove(&tab);
        self.sync_origin();
        self.tabs.is_empty()
    }

    fn sync_origin(&self) {
        if let Some(first) = self.tabs.iter().next() {
            self.bridge.set_origin(*first);
        }
    }

    /// Detach the click listener and disconnect every watcher.
    ///
    /// Keeps going past failures and returns all of them.
    pub(crate) fn teardown(self, registry: &ListenerRegistry) -> Vec<BridgeError> {
        let tab = self.tabs.iter().next().copied();
        let ctx = |component: &str| {
            let ctx = ErrorContext::new("teardown").with_component(component);
            match tab {
                Some(tab) => ctx.with_tab(tab),
                None => ctx,
            }
        };

        let mut errors = Vec::new();

        let report = registry.remove_many(&[self.click_listener]);
        errors.extend(
            report
                .failures
                .into_iter()
                .map(|(_, e)| BridgeError::Cleanup(e).with_context(ctx("event_bridge"))),
        );

        for watcher in &self.watchers {
            if let Err(e) = watcher.disconnect() {
                errors.push(e.with_context(ctx(watcher.name())));
            }
        }

        if errors.is_empty() {
            tracing::debug!(window = %self.window_id, "Tore down binding for tabs {:?}", self.tabs);
        }
        errors
    }
}

impl std::fmt::Debug for TabBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TabBinding")
            .field("window_id", &self.window_id)
            .field("table_id", &self.table_id)
            .field("tabs", &self.tabs)
            .field("click_listener", &self.click_listener)
            .field("watchers", &self.watcher_names())
            .finish()
    }
}

/// Refresh the mapping and announce it. Runs when a watcher's debounce
/// window elapses.
fn refresh_on_change(
    resolver: Arc<ColumnResolver>,
    window: Weak<dyn WindowView>,
    bus: EventBus,
    cause: ChangeCause,
) -> impl Fn() + Send + Sync + 'static {
    move || {
        let window = match window.upgrade() {
            Some(window) => window,
            None => {
                tracing::debug!("Window {} gone, skipping refresh", resolver.window_id());
                return;
            }
        };
        let mapping = resolver.refresh(window.as_ref());
        tracing::info!(
            window = %resolver.window_id(),
            "Column layout changed ({:?}), remapped: {:?}",
            cause,
            mapping
        );
        bus.publish_structure_changed(StructureChangedEvent::new(
            resolver.window_id(),
            cause,
            mapping,
        ));
    }
}
