//! Prelude module for convenient imports.
//!
//! ```ignore
//! use quickfilter::prelude::*;
//! ```
//!
//! This will import:
//! - Lifecycle entry points (LifecycleManager, BindOutcome, ShutdownReport)
//! - Bus and event types (EventBus, SemanticClickEvent, Subscription)
//! - Column types (ColumnType, ColumnMapping)
//! - Configuration (BridgeConfig, LoggingConfig)
//! - Errors (BridgeError, BridgeResult)
//! - Host capability traits and ids

// Lifecycle
pub use crate::lifecycle::{BindOutcome, LifecycleManager, ShutdownReport};

// Bus and events
pub use crate::bridge::{
    ChangeCause, EventBus, SemanticClickEvent, StructureChangedEvent, Subscription, Topic,
};

// Columns
pub use crate::columns::{ColumnMapping, ColumnType};

// Configuration
pub use crate::config::{BridgeConfig, LoggingConfig};
pub use crate::logging::init_tracing;

// Errors
pub use crate::error::{BridgeError, BridgeResult, ErrorCategory};

// Host capabilities
pub use crate::traits::{
    Element, ElementRef, EventTarget, Modifier, TabId, TabResolver, TableView, WindowId,
    WindowView,
};
