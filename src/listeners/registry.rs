//! Registry of attached listeners with process-unique handles.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::{BridgeError, BridgeResult, ErrorContext, HostError};
use crate::traits::{EventCallback, EventTarget, HostListenerId, ListenerOptions};

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

/// Handle for a registered listener. Never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    fn next() -> Self {
        ListenerId(NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

type DetachFn = Box<dyn FnOnce() -> Result<(), HostError> + Send + Sync>;

/// One attached listener.
pub struct ListenerBinding {
    id: ListenerId,
    owner: u64,
    event_type: String,
    callback: EventCallback,
    options: ListenerOptions,
    host_id: HostListenerId,
    detach: DetachFn,
}

impl ListenerBinding {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// `target_id` of the target the listener is attached to.
    pub fn owner(&self) -> u64 {
        self.owner
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn callback(&self) -> &EventCallback {
        &self.callback
    }

    pub fn options(&self) -> ListenerOptions {
        self.options
    }

    fn detach(self) -> Result<(), HostError> {
        (self.detach)()
    }
}

impl fmt::Debug for ListenerBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerBinding")
            .field("id", &self.id)
            .field("owner", &self.owner)
            .field("event_type", &self.event_type)
            .field("options", &self.options)
            .field("host_id", &self.host_id)
            .finish()
    }
}

/// Outcome of a best-effort bulk removal.
#[derive(Debug, Default)]
pub struct CleanupReport {
    /// Entries discarded, whether or not their detach succeeded.
    pub removed: usize,
    /// Detach failures, in removal order.
    pub failures: Vec<(ListenerId, HostError)>,
}

impl CleanupReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Fold the failures into a single cleanup error, if any occurred.
    pub fn into_result(self) -> BridgeResult<usize> {
        let removed = self.removed;
        match self.failures.into_iter().next() {
            None => Ok(removed),
            Some((id, err)) => Err(BridgeError::Cleanup(err).with_context(
                ErrorContext::new("remove_listeners")
                    .with_component("listener_registry")
                    .with_listener_id(id.get()),
            )),
        }
    }
}

/// Every listener the bridge attached, keyed by [`ListenerId`].
///
/// Removal always detaches the real listener on its target and is
/// idempotent. Host calls are made without holding the registry lock, so
/// callbacks may add or remove listeners while an event is being dispatched.
#[derive(Default)]
pub struct ListenerRegistry {
    bindings: Mutex<BTreeMap<ListenerId, ListenerBinding>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `callback` to `target` and record it.
    ///
    /// Nothing is recorded when the host refuses the attachment.
    pub fn add<T>(
        &self,
        target: Arc<T>,
        event_type: &str,
        callback: EventCallback,
        options: ListenerOptions,
    ) -> BridgeResult<ListenerId>
    where
        T: EventTarget + ?Sized + 'static,
    {
        let owner = target.target_id();
        let host_id = target
            .add_listener(event_type, Arc::clone(&callback), options)
            .map_err(|e| {
                BridgeError::Registration(e).with_context(
                    ErrorContext::new(format!("add '{}' listener", event_type))
                        .with_component("listener_registry"),
                )
            })?;

        let id = ListenerId::next();
        let binding = ListenerBinding {
            id,
            owner,
            event_type: event_type.to_string(),
            callback,
            options,
            host_id,
            detach: Box::new(move || target.remove_listener(host_id)),
        };
        self.lock().insert(id, binding);

        tracing::debug!(
            listener_id = id.get(),
            owner,
            "Registered '{}' listener (capture: {})",
            event_type,
            options.capture
        );
        Ok(id)
    }

    /// Detach and discard one listener.
    ///
    /// Returns whether an entry existed. A failed detach is logged and the
    /// entry is discarded anyway.
    pub fn remove(&self, id: ListenerId) -> bool {
        let binding = self.lock().remove(&id);
        match binding {
            Some(binding) => {
                if let Err((id, err)) = Self::detach(binding) {
                    Self::log_failure(id, &err);
                }
                true
            }
            None => false,
        }
    }

    /// Detach and discard the listed entries, continuing past failures.
    pub fn remove_many(&self, ids: &[ListenerId]) -> CleanupReport {
        let taken: Vec<ListenerBinding> = {
            let mut bindings = self.lock();
            ids.iter().filter_map(|id| bindings.remove(id)).collect()
        };
        Self::detach_all(taken)
    }

    /// Detach and discard every entry, continuing past failures.
    pub fn remove_all(&self) -> CleanupReport {
        let taken = std::mem::take(&mut *self.lock());
        let report = Self::detach_all(taken.into_values().collect());
        if report.removed > 0 {
            tracing::info!(
                "Removed {} listeners ({} detach failures)",
                report.removed,
                report.failures.len()
            );
        }
        report
    }

    pub fn count(&self) -> usize {
        self.lock().len()
    }

    pub fn contains(&self, id: ListenerId) -> bool {
        self.lock().contains_key(&id)
    }

    /// Number of listeners attached to the target with `owner` id.
    pub fn count_for_owner(&self, owner: u64) -> usize {
        self.lock().values().filter(|b| b.owner == owner).count()
    }

    /// Event type of a registered listener.
    pub fn event_type(&self, id: ListenerId) -> Option<String> {
        self.lock().get(&id).map(|b| b.event_type.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<ListenerId, ListenerBinding>> {
        self.bindings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn detach(binding: ListenerBinding) -> Result<(), (ListenerId, HostError)> {
        let id = binding.id;
        let event_type = binding.event_type.clone();
        binding.detach().map_err(|err| (id, err))?;
        tracing::trace!(listener_id = id.get(), "Detached '{}' listener", event_type);
        Ok(())
    }

    fn detach_all(bindings: Vec<ListenerBinding>) -> CleanupReport {
        let mut report = CleanupReport::default();
        for binding in bindings {
            report.removed += 1;
            if let Err((id, err)) = Self::detach(binding) {
                Self::log_failure(id, &err);
                report.failures.push((id, err));
            }
        }
        report
    }

    fn log_failure(id: ListenerId, err: &HostError) {
        tracing::error!(
            listener_id = id.get(),
            gone = err.is_handle_gone(),
            "Failed to detach listener, discarding it: {}",
            err
        );
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("count", &self.count())
            .finish()
    }
}
