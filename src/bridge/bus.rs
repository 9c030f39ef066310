//! Typed pub/sub between the bridge and its consumers.
//!
//! Built once and handed by clone to both publishers and subscribers. Two
//! delivery paths exist:
//!
//! - synchronous callbacks registered per [`Topic`], invoked in subscription
//!   order on the publishing thread
//! - a `tokio::sync::broadcast` channel of click events for async consumers
//!
//! A failing or panicking callback is logged as a consumer error and never
//! reaches the publisher. Nothing is buffered for late subscribers.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use tokio::sync::broadcast;

use super::event::{SemanticClickEvent, StructureChangedEvent};
use crate::columns::ColumnType;
use crate::error::BridgeError;

/// Result returned by fallible subscribers.
pub type ConsumerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

type Handler = Arc<dyn Fn(&BusEvent) -> ConsumerResult + Send + Sync>;

/// Default capacity of the click broadcast channel.
pub const DEFAULT_BUS_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    ColumnClick,
    StructureChanged,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::ColumnClick => "column_click",
            Topic::StructureChanged => "structure_changed",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub enum BusEvent {
    ColumnClick(SemanticClickEvent),
    StructureChanged(StructureChangedEvent),
}

impl BusEvent {
    pub fn topic(&self) -> Topic {
        match self {
            BusEvent::ColumnClick(_) => Topic::ColumnClick,
            BusEvent::StructureChanged(_) => Topic::StructureChanged,
        }
    }
}

struct Subscriber {
    id: u64,
    topic: Topic,
    handler: Handler,
}

struct BusInner {
    subscribers: Mutex<Vec<Subscriber>>,
    next_id: AtomicU64,
    clicks: broadcast::Sender<SemanticClickEvent>,
    failures: AtomicU64,
}

impl BusInner {
    fn remove(&self, id: u64) -> bool {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let before = subscribers.len();
        subscribers.retain(|s| s.id != id);
        subscribers.len() != before
    }
}

/// Shared event bus. Clones publish to and subscribe on the same bus.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl EventBus {
    /// Create a bus whose click broadcast channel holds `capacity` events.
    pub fn new(capacity: usize) -> Self {
        let (clicks, _) = broadcast::channel(capacity.max(1));
        Self {
            inner: Arc::new(BusInner {
                subscribers: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
                clicks,
                failures: AtomicU64::new(0),
            }),
        }
    }

    /// Register a fallible callback for one topic.
    pub fn subscribe<F>(&self, topic: Topic, handler: F) -> Subscription
    where
        F: Fn(&BusEvent) -> ConsumerResult + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Subscriber {
                id,
                topic,
                handler: Arc::new(handler),
            });
        tracing::debug!(subscriber = id, "Subscribed to {}", topic);

        Subscription {
            id,
            topic,
            bus: Arc::downgrade(&self.inner),
        }
    }

    /// Register a callback receiving `(column, raw text)` for every click.
    ///
    /// Drop-in for policy layers that only need the two values.
    pub fn register_click_listener<F>(&self, callback: F) -> Subscription
    where
        F: Fn(ColumnType, &str) + Send + Sync + 'static,
    {
        self.subscribe(Topic::ColumnClick, move |event| {
            if let BusEvent::ColumnClick(click) = event {
                callback(click.column_type, &click.raw_cell_text);
            }
            Ok(())
        })
    }

    /// Register a fallible callback receiving the full click event.
    pub fn on_click<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&SemanticClickEvent) -> ConsumerResult + Send + Sync + 'static,
    {
        self.subscribe(Topic::ColumnClick, move |event| match event {
            BusEvent::ColumnClick(click) => callback(click),
            _ => Ok(()),
        })
    }

    pub fn on_structure_changed<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&StructureChangedEvent) + Send + Sync + 'static,
    {
        self.subscribe(Topic::StructureChanged, move |event| {
            if let BusEvent::StructureChanged(change) = event {
                callback(change);
            }
            Ok(())
        })
    }

    /// Receiver for async consumers. Only clicks published after this call
    /// are delivered; a receiver that falls behind sees `Lagged`.
    pub fn subscribe_clicks(&self) -> broadcast::Receiver<SemanticClickEvent> {
        self.inner.clicks.subscribe()
    }

    /// Deliver `event` to every subscriber of its topic.
    ///
    /// Returns how many callbacks completed successfully. Publishing with no
    /// subscribers is a no-op.
    pub fn publish(&self, event: BusEvent) -> usize {
        let topic = event.topic();

        if let BusEvent::ColumnClick(click) = &event {
            if self.inner.clicks.receiver_count() > 0 {
                // Err only when every receiver dropped in between.
                let _ = self.inner.clicks.send(click.clone());
            }
        }

        let handlers: Vec<(u64, Handler)> = self
            .inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|s| s.topic == topic)
            .map(|s| (s.id, Arc::clone(&s.handler)))
            .collect();

        if handlers.is_empty() {
            tracing::trace!("No subscribers for {}", topic);
            return 0;
        }

        let mut delivered = 0;
        for (id, handler) in handlers {
            match panic::catch_unwind(AssertUnwindSafe(|| handler(&event))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(e)) => self.consumer_failed(id, e.to_string()),
                Err(payload) => self.consumer_failed(
                    id,
                    format!("panicked: {}", panic_message(payload.as_ref())),
                ),
            }
        }
        delivered
    }

    pub fn publish_click(&self, event: SemanticClickEvent) -> usize {
        self.publish(BusEvent::ColumnClick(event))
    }

    pub fn publish_structure_changed(&self, event: StructureChangedEvent) -> usize {
        self.publish(BusEvent::StructureChanged(event))
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|s| s.topic == topic)
            .count()
    }

    /// Consumer failures caught so far.
    pub fn failure_count(&self) -> u64 {
        self.inner.failures.load(Ordering::Relaxed)
    }

    fn consumer_failed(&self, subscriber: u64, message: String) {
        self.inner.failures.fetch_add(1, Ordering::Relaxed);
        BridgeError::Consumer {
            subscriber,
            message,
        }
        .log();
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_BUS_CAPACITY)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("click_subscribers", &self.subscriber_count(Topic::ColumnClick))
            .field(
                "structure_subscribers",
                &self.subscriber_count(Topic::StructureChanged),
            )
            .field("receivers", &self.inner.clicks.receiver_count())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Registration handle returned by the `subscribe` family.
///
/// Dropping it leaves the callback registered; call
/// [`unregister`](Self::unregister) to remove it.
#[must_use = "dropping a Subscription keeps the callback registered; keep it to unregister later"]
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    topic: Topic,
    bus: Weak<BusInner>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn topic(&self) -> Topic {
        self.topic
    }

    /// Remove the callback. Returns false if it was already removed or the
    /// bus is gone.
    pub fn unregister(&self) -> bool {
        match self.bus.upgrade() {
            Some(bus) => {
                let removed = bus.remove(self.id);
                if removed {
                    tracing::debug!(subscriber = self.id, "Unsubscribed from {}", self.topic);
                }
                removed
            }
            None => false,
        }
    }
}
