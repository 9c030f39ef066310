//! Window-level layout signals.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use super::debouncer::Debouncer;
use super::Watcher;
use crate::error::{BridgeError, BridgeResult, ErrorContext};
use crate::listeners::{ListenerId, ListenerRegistry};
use crate::traits::{DomEvent, EventCallback, ListenerOptions, WindowId, WindowView};

/// Window events after which column classes may have been re-rendered.
pub const LAYOUT_EVENTS: &[&str] = &["resize", "color-scheme-change", "contrast-change"];

/// Debounced watcher for [`LAYOUT_EVENTS`] on one window.
///
/// Runs independently of the table's [`MutationWatcher`](super::MutationWatcher):
/// each has its own debounce window.
pub struct LayoutWatcher {
    window_id: WindowId,
    registry: Arc<ListenerRegistry>,
    listener_ids: Mutex<Vec<ListenerId>>,
    debouncer: Arc<Debouncer>,
    connected: Arc<AtomicBool>,
    signals: Arc<AtomicU64>,
}

impl LayoutWatcher {
    /// Attach listeners for every layout event on `window`.
    ///
    /// If any attachment fails the ones already made are removed again.
    pub fn start<F>(
        registry: Arc<ListenerRegistry>,
        window: Arc<dyn WindowView>,
        debounce: Duration,
        on_change: F,
    ) -> BridgeResult<Self>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let window_id = window.window_id();
        let debouncer = Arc::new(Debouncer::new(debounce, on_change).map_err(|e| {
            BridgeError::Registration(e).with_context(
                ErrorContext::new("start layout watcher").with_component("layout_watcher"),
            )
        })?);
        let connected = Arc::new(AtomicBool::new(true));
        let signals = Arc::new(AtomicU64::new(0));

        let callback: EventCallback = {
            let debouncer = Arc::clone(&debouncer);
            let connected = Arc::clone(&connected);
            let signals = Arc::clone(&signals);
            Arc::new(move |event: &DomEvent| {
                if !connected.load(Ordering::SeqCst) {
                    return;
                }
                tracing::trace!("Layout signal '{}'", event.event_type);
                signals.fetch_add(1, Ordering::SeqCst);
                debouncer.arm();
            })
        };

        let mut listener_ids = Vec::with_capacity(LAYOUT_EVENTS.len());
        for event_type in LAYOUT_EVENTS {
            match registry.add(
                Arc::clone(&window),
                event_type,
                Arc::clone(&callback),
                ListenerOptions::default(),
            ) {
                Ok(id) => listener_ids.push(id),
                Err(e) => {
                    debouncer.close();
                    let rollback = registry.remove_many(&listener_ids);
                    tracing::debug!(
                        "Rolled back {} layout listeners on window {}",
                        rollback.removed,
                        window_id
                    );
                    return Err(e);
                }
            }
        }

        tracing::debug!(window = %window_id, "Watching layout signals");
        Ok(Self {
            window_id,
            registry,
            listener_ids: Mutex::new(listener_ids),
            debouncer,
            connected,
            signals,
        })
    }

    pub fn window_id(&self) -> WindowId {
        self.window_id
    }

    /// Layout signals received so far.
    pub fn signal_count(&self) -> u64 {
        self.signals.load(Ordering::SeqCst)
    }

    pub fn change_count(&self) -> u64 {
        self.debouncer.fire_count()
    }

    pub fn listener_ids(&self) -> Vec<ListenerId> {
        self.listener_ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Watcher for LayoutWatcher {
    fn name(&self) -> &'static str {
        "layout"
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn disconnect(&self) -> BridgeResult<()> {
        self.connected.store(false, Ordering::SeqCst);
        self.debouncer.close();

        let ids = std::mem::take(
            &mut *self
                .listener_ids
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        if ids.is_empty() {
            return Ok(());
        }
        self.registry.remove_many(&ids).into_result().map(|removed| {
            tracing::debug!(
                "Stopped watching layout on window {} ({} listeners)",
                self.window_id,
                removed
            );
        })
    }
}

impl Drop for LayoutWatcher {
    fn drop(&mut self) {
        if self.is_connected() {
            if let Err(e) = self.disconnect() {
                tracing::debug!("Layout watcher dropped while connected: {}", e);
            }
        }
    }
}
