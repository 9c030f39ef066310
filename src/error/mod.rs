//! Unified error handling for the bridge.
//!
//! - **Error Categories**: resolution, registration, cleanup, consumer
//! - **Host Errors**: failures reported across the capability boundary
//! - **Unified Error Type**: `BridgeError` consolidates all of them
//! - **Error Context**: operation/tab metadata attached to errors
//! - **Result Type Alias**: `BridgeResult<T>`
//!
//! | Category | Typical cause | Effect |
//! |----------|---------------|--------|
//! | Resolution | window/table/cell missing, unknown column | warning, no-op |
//! | Registration | listener/observer attach throws | error, tab binding aborts |
//! | Cleanup | detach throws during shutdown | error, teardown continues |
//! | Consumer | subscriber returns Err or panics | error, next click unaffected |
//!
//! Nothing here is fatal to the host process.

mod bridge_error;
mod category;
mod context;
mod host;
mod result;

pub use bridge_error::BridgeError;
pub use category::ErrorCategory;
pub use context::ErrorContext;
pub use host::HostError;
pub use result::{BridgeResult, ResultExt};
