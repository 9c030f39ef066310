//! Column discovery with a per-window cache.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use super::mapping::ColumnMapping;
use crate::traits::{TableView, WindowId, WindowView};

/// Discovers and caches the column mapping of one window.
///
/// The cache is replaced as a whole; readers either see the previous
/// mapping or the new one, never a mix. Only the resolver writes it.
///
/// Every invalidation bumps a generation counter. A discovery only stores
/// its result if no invalidation happened since it started reading headers,
/// so a slow discovery can never overwrite a newer refresh.
#[derive(Debug)]
pub struct ColumnResolver {
    window_id: WindowId,
    cache: RwLock<Option<Arc<ColumnMapping>>>,
    generation: AtomicU64,
    discoveries: AtomicU64,
}

impl ColumnResolver {
    pub fn new(window_id: WindowId) -> Self {
        Self {
            window_id,
            cache: RwLock::new(None),
            generation: AtomicU64::new(0),
            discoveries: AtomicU64::new(0),
        }
    }

    pub fn window_id(&self) -> WindowId {
        self.window_id
    }

    /// Scan the window's header cells and cache the resulting mapping.
    ///
    /// When the window has no table, or its headers cannot be read, an
    /// all-absent mapping is returned and nothing is cached, so the next
    /// read tries again.
    pub fn discover(&self, window: &dyn WindowView) -> Arc<ColumnMapping> {
        match window.table() {
            Some(table) => self.discover_in_table(table.as_ref()),
            None => {
                tracing::warn!(
                    "Column discovery skipped: window {} has no message table",
                    window.window_id()
                );
                Arc::new(ColumnMapping::default())
            }
        }
    }

    /// Same as [`discover`](Self::discover) with the table already in hand.
    pub fn discover_in_table(&self, table: &dyn TableView) -> Arc<ColumnMapping> {
        let started = self.generation.load(Ordering::SeqCst);
        let headers = match table.header_cells() {
            Ok(headers) => headers,
            Err(e) => {
                tracing::warn!(
                    "Column discovery failed for window {}: {}",
                    self.window_id,
                    e
                );
                return Arc::new(ColumnMapping::default());
            }
        };

        let mapping = Arc::new(ColumnMapping::from_headers(&headers));
        self.discoveries.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            window = %self.window_id,
            headers = headers.len(),
            "Discovered column mapping: {:?}",
            mapping
        );

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        if self.generation.load(Ordering::SeqCst) == started {
            *cache = Some(Arc::clone(&mapping));
        } else {
            tracing::debug!(
                window = %self.window_id,
                "Discarding discovery that raced an invalidation"
            );
        }
        mapping
    }

    /// Cached mapping, without triggering discovery.
    pub fn cached(&self) -> Option<Arc<ColumnMapping>> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Cached mapping, discovering it first if the cache is empty.
    pub fn mapping(&self, window: &dyn WindowView) -> Arc<ColumnMapping> {
        match self.cached() {
            Some(mapping) => mapping,
            None => self.discover(window),
        }
    }

    /// Drop the cached mapping. Discovery happens on the next read.
    pub fn invalidate(&self) {
        let previous = {
            let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
            self.generation.fetch_add(1, Ordering::SeqCst);
            cache.take()
        };
        if previous.is_some() {
            tracing::trace!("Column mapping for window {} invalidated", self.window_id);
        }
    }

    /// Invalidate, then discover again.
    pub fn refresh(&self, window: &dyn WindowView) -> Arc<ColumnMapping> {
        self.invalidate();
        self.discover(window)
    }

    /// Number of invalidations so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Number of successful discoveries so far.
    pub fn discovery_count(&self) -> u64 {
        self.discoveries.load(Ordering::Relaxed)
    }
}
