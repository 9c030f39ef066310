//! Arm/reset/fire debouncing on the tokio timer.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::error::HostError;

/// Default coalescing window.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

type FireFn = Arc<dyn Fn() + Send + Sync>;

struct DebounceState {
    generation: AtomicU64,
    closed: AtomicBool,
    fired: AtomicU64,
    pending: Mutex<Option<JoinHandle<()>>>,
    on_fire: FireFn,
}

/// Collapses bursts of triggers into a single callback.
///
/// Every [`arm`](Self::arm) restarts the window; the callback runs once the
/// window elapses without another arm. Each arm spawns a sleep task on the
/// runtime captured at construction and aborts the previous one, and a
/// generation counter discards a sleep that woke after being superseded.
pub struct Debouncer {
    window: Duration,
    runtime: Handle,
    state: Arc<DebounceState>,
}

impl Debouncer {
    /// Create a debouncer bound to the current tokio runtime.
    ///
    /// Fails with [`HostError::NoRuntime`] outside a runtime context.
    pub fn new<F>(window: Duration, on_fire: F) -> Result<Self, HostError>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let runtime = Handle::try_current().map_err(|_| HostError::NoRuntime)?;
        Ok(Self::with_handle(runtime, window, on_fire))
    }

    /// Create a debouncer that schedules its timers on `runtime`.
    pub fn with_handle<F>(runtime: Handle, window: Duration, on_fire: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            window,
            runtime,
            state: Arc::new(DebounceState {
                generation: AtomicU64::new(0),
                closed: AtomicBool::new(false),
                fired: AtomicU64::new(0),
                pending: Mutex::new(None),
                on_fire: Arc::new(on_fire),
            }),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Start or restart the window. Ignored once closed.
    pub fn arm(&self) {
        if self.state.closed.load(Ordering::SeqCst) {
            return;
        }

        let generation = self.state.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let state = Arc::clone(&self.state);
        let window = self.window;

        let task = self.runtime.spawn(async move {
            tokio::time::sleep(window).await;
            if state.closed.load(Ordering::SeqCst)
                || state.generation.load(Ordering::SeqCst) != generation
            {
                return;
            }
            state.fired.fetch_add(1, Ordering::SeqCst);
            tracing::trace!("Debounce window elapsed after {:?}", window);
            (state.on_fire)();
        });

        let previous = self
            .state
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(task);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Drop a pending fire without closing the debouncer.
    pub fn cancel(&self) {
        self.state.generation.fetch_add(1, Ordering::SeqCst);
        let pending = self
            .state
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = pending {
            task.abort();
        }
    }

    /// Cancel and refuse all future arms. Safe to call repeatedly.
    pub fn close(&self) {
        self.state.closed.store(true, Ordering::SeqCst);
        self.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.state.closed.load(Ordering::SeqCst)
    }

    /// Whether a fire is scheduled and has not happened yet.
    pub fn is_pending(&self) -> bool {
        if self.is_closed() {
            return false;
        }
        self.state
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|task| !task.is_finished())
            .unwrap_or(false)
    }

    /// How many times the callback has run.
    pub fn fire_count(&self) -> u64 {
        self.state.fired.load(Ordering::SeqCst)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Debouncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("window", &self.window)
            .field("closed", &self.is_closed())
            .field("fired", &self.fire_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counting(window: Duration) -> (Debouncer, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        let debouncer = Debouncer::new(window, move || {
            h.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
        (debouncer, hits)
    }

    #[test]
    fn test_requires_runtime() {
        let result = Debouncer::new(DEFAULT_DEBOUNCE, || {});
        assert!(matches!(result, Err(HostError::NoRuntime)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_fires_once() {
        let (debouncer, hits) = counting(DEFAULT_DEBOUNCE);

        for _ in 0..5 {
            debouncer.arm();
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert!(debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(450)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(debouncer.fire_count(), 1);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_fire_separately() {
        let (debouncer, hits) = counting(Duration::from_millis(200));

        debouncer.arm();
        tokio::time::sleep(Duration::from_millis(300)).await;
        debouncer.arm();
        debouncer.arm();
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending() {
        let (debouncer, hits) = counting(DEFAULT_DEBOUNCE);

        debouncer.arm();
        debouncer.cancel();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        debouncer.arm();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_is_final_and_repeatable() {
        let (debouncer, hits) = counting(DEFAULT_DEBOUNCE);

        debouncer.arm();
        debouncer.close();
        debouncer.close();
        debouncer.arm();
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert!(debouncer.is_closed());
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        let (debouncer, hits) = counting(DEFAULT_DEBOUNCE);
        debouncer.arm();
        drop(debouncer);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
