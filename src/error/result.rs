//! Result type alias for bridge operations.

use super::bridge_error::BridgeError;
use super::context::ErrorContext;

/// Type alias for Results using BridgeError.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Extension trait for Result types to add context to errors.
pub trait ResultExt<T> {
    /// Add context to an error if the result is Err.
    fn context(self, ctx: ErrorContext) -> BridgeResult<T>;

    /// Add context using a closure (only called on error).
    fn with_context<F>(self, f: F) -> BridgeResult<T>
    where
        F: FnOnce() -> ErrorContext;
}

impl<T> ResultExt<T> for BridgeResult<T> {
    fn context(self, ctx: ErrorContext) -> BridgeResult<T> {
        self.map_err(|e| e.with_context(ctx))
    }

    fn with_context<F>(self, f: F) -> BridgeResult<T>
    where
        F: FnOnce() -> ErrorContext,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HostError;

    #[test]
    fn test_context_on_err() {
        let result: BridgeResult<()> = Err(BridgeError::Registration(HostError::NoRuntime));
        let err = result
            .context(ErrorContext::new("observe"))
            .unwrap_err();
        assert_eq!(err.context().unwrap().operation, "observe");
    }

    #[test]
    fn test_with_context_lazy_on_ok() {
        let result: BridgeResult<u8> = Ok(1);
        let value = result
            .with_context(|| panic!("context closure must not run on Ok"))
            .unwrap();
        assert_eq!(value, 1);
    }
}
