//! Click interception and event publication.
//!
//! [`EventBridge`] listens on a table and turns qualifying clicks into
//! [`SemanticClickEvent`]s, which go out on the [`EventBus`] under
//! [`Topic::ColumnClick`]. Structure refreshes are published under
//! [`Topic::StructureChanged`].

mod bus;
mod click;
mod event;

pub use bus::{BusEvent, ConsumerResult, EventBus, Subscription, Topic, DEFAULT_BUS_CAPACITY};
pub use click::{ClickOutcome, EventBridge};
pub use event::{ChangeCause, SemanticClickEvent, StructureChangedEvent};
