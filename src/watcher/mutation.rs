//! Structural observation of the message table.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use super::debouncer::Debouncer;
use super::Watcher;
use crate::error::{BridgeError, BridgeResult, ErrorContext};
use crate::traits::{
    contains_header_cell, Element, MutationCallback, MutationKind, MutationRecord,
    ObserverHandle, TableView,
};

/// Whether a mutation record can change the column layout.
///
/// Node insertions or removals count when a header cell is among (or
/// inside) the affected nodes. Attribute changes count only for the
/// `class` attribute of a header cell. Row churn never counts.
pub fn is_column_affecting(record: &MutationRecord) -> bool {
    match &record.kind {
        MutationKind::ChildList => record
            .added
            .iter()
            .chain(record.removed.iter())
            .any(contains_header_cell),
        MutationKind::Attributes { name } => name == "class" && record.target.is_header_cell(),
    }
}

/// Watches one table and calls `on_change` once per burst of
/// column-affecting mutations.
pub struct MutationWatcher {
    table_id: u64,
    observer: Mutex<Option<Box<dyn ObserverHandle>>>,
    debouncer: Arc<Debouncer>,
    connected: Arc<AtomicBool>,
    qualifying: Arc<AtomicU64>,
}

impl MutationWatcher {
    /// Start observing `table`.
    ///
    /// Must be called inside a tokio runtime; the debounce timer runs on it.
    pub fn observe<F>(table: &dyn TableView, window: Duration, on_change: F) -> BridgeResult<Self>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let table_id = table.target_id();
        let ctx = || {
            ErrorContext::new("observe table mutations").with_component("mutation_watcher")
        };

        let debouncer = Arc::new(
            Debouncer::new(window, on_change)
                .map_err(|e| BridgeError::Registration(e).with_context(ctx()))?,
        );
        let connected = Arc::new(AtomicBool::new(true));
        let qualifying = Arc::new(AtomicU64::new(0));

        let callback: MutationCallback = {
            let debouncer = Arc::clone(&debouncer);
            let connected = Arc::clone(&connected);
            let qualifying = Arc::clone(&qualifying);
            Arc::new(move |records: &[MutationRecord]| {
                if !connected.load(Ordering::SeqCst) {
                    return;
                }
                let hits = records.iter().filter(|r| is_column_affecting(r)).count();
                if hits == 0 {
                    tracing::trace!("Ignoring {} non-column mutations", records.len());
                    return;
                }
                qualifying.fetch_add(hits as u64, Ordering::SeqCst);
                debouncer.arm();
            })
        };

        let observer = table
            .observe_mutations(callback)
            .map_err(|e| BridgeError::Registration(e).with_context(ctx()))?;

        tracing::debug!(table = table_id, "Observing table for column changes");
        Ok(Self {
            table_id,
            observer: Mutex::new(Some(observer)),
            debouncer,
            connected,
            qualifying,
        })
    }

    pub fn table_id(&self) -> u64 {
        self.table_id
    }

    /// Column-affecting records seen so far.
    pub fn qualifying_count(&self) -> u64 {
        self.qualifying.load(Ordering::SeqCst)
    }

    /// Number of times `on_change` has run.
    pub fn change_count(&self) -> u64 {
        self.debouncer.fire_count()
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }
}

impl Watcher for MutationWatcher {
    fn name(&self) -> &'static str {
        "mutation"
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn disconnect(&self) -> BridgeResult<()> {
        self.connected.store(false, Ordering::SeqCst);
        self.debouncer.close();

        let observer = self
            .observer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match observer {
            Some(observer) => {
                observer.disconnect().map_err(|e| {
                    BridgeError::Cleanup(e).with_context(
                        ErrorContext::new("disconnect table observer")
                            .with_component("mutation_watcher"),
                    )
                })?;
                tracing::debug!(table = self.table_id, "Stopped observing table");
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl Drop for MutationWatcher {
    fn drop(&mut self) {
        if self.is_connected() {
            if let Err(e) = self.disconnect() {
                tracing::debug!("Mutation watcher dropped while connected: {}", e);
            }
        }
    }
}

impl std::fmt::Debug for MutationWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutationWatcher")
            .field("table_id", &self.table_id)
            .field("debouncer", &self.debouncer)
            .field("connected", &self.connected)
            .field("qualifying", &self.qualifying)
            .finish_non_exhaustive()
    }
}
