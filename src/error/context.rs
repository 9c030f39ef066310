//! Error context for enriched error information.
//!
//! A context records which operation failed and for which tab, so that a
//! cleanup failure buried in a shutdown report can still be traced back.

use chrono::{DateTime, Utc};

use crate::traits::TabId;

/// Context information attached to errors for debugging.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorContext {
    /// Human-readable description of the operation that failed.
    pub operation: String,

    /// Tab the operation was running for, if any.
    pub tab_id: Option<TabId>,

    /// Timestamp when the error occurred.
    pub timestamp: DateTime<Utc>,

    /// Optional component/module where the error originated.
    pub component: Option<String>,

    /// Listener registry id involved, if any.
    pub listener_id: Option<u64>,
}

impl ErrorContext {
    /// Create a new ErrorContext for an operation.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            tab_id: None,
            timestamp: Utc::now(),
            component: None,
            listener_id: None,
        }
    }

    /// Set the tab for this context.
    pub fn with_tab(mut self, tab_id: TabId) -> Self {
        self.tab_id = Some(tab_id);
        self
    }

    /// Set the component for this context.
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    /// Set the listener id for this context.
    pub fn with_listener_id(mut self, id: u64) -> Self {
        self.listener_id = Some(id);
        self
    }

    /// Get a formatted context string suitable for logging.
    pub fn to_log_string(&self) -> String {
        let mut parts = vec![format!("operation={}", self.operation)];

        if let Some(tab_id) = self.tab_id {
            parts.push(format!("tab={}", tab_id));
        }

        if let Some(ref component) = self.component {
            parts.push(format!("component={}", component));
        }

        if let Some(listener_id) = self.listener_id {
            parts.push(format!("listener={}", listener_id));
        }

        parts.push(format!("timestamp={}", self.timestamp.to_rfc3339()));

        parts.join(" ")
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new("unknown")
    }
}

impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.operation)?;

        if let Some(tab_id) = self.tab_id {
            write!(f, " tab={}", tab_id)?;
        }

        if let Some(ref component) = self.component {
            write!(f, " component={}", component)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_builder() {
        let ctx = ErrorContext::new("bind_tab")
            .with_tab(TabId(7))
            .with_component("lifecycle")
            .with_listener_id(42);

        assert_eq!(ctx.operation, "bind_tab");
        assert_eq!(ctx.tab_id, Some(TabId(7)));
        assert_eq!(ctx.component.as_deref(), Some("lifecycle"));
        assert_eq!(ctx.listener_id, Some(42));
    }

    #[test]
    fn test_context_display() {
        let ctx = ErrorContext::new("shutdown").with_tab(TabId(3));
        assert_eq!(ctx.to_string(), "[shutdown] tab=3");
    }

    #[test]
    fn test_context_log_string() {
        let ctx = ErrorContext::new("remove")
            .with_listener_id(9)
            .with_component("registry");
        let log = ctx.to_log_string();

        assert!(log.starts_with("operation=remove"));
        assert!(log.contains("component=registry"));
        assert!(log.contains("listener=9"));
        assert!(log.contains("timestamp="));
    }

    #[test]
    fn test_context_default() {
        assert_eq!(ErrorContext::default().operation, "unknown");
    }
}
