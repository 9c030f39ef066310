//! Events published on the bus.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::columns::{ColumnMapping, ColumnType};
use crate::traits::{TabId, WindowId};

/// An Alt-click on a recognized column, ready for a filter to act on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticClickEvent {
    pub column_type: ColumnType,
    /// Tooltip of the clicked cell, or its visible text.
    pub raw_cell_text: String,
    pub origin_tab: TabId,
    pub timestamp: DateTime<Utc>,
}

impl SemanticClickEvent {
    pub fn new(column_type: ColumnType, raw_cell_text: impl Into<String>, origin_tab: TabId) -> Self {
        Self {
            column_type,
            raw_cell_text: raw_cell_text.into(),
            origin_tab,
            timestamp: Utc::now(),
        }
    }

    /// Serialize for handing to a consumer in another execution context.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// What caused a structure refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeCause {
    Mutation,
    Layout,
}

/// The column mapping of a window was rediscovered.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureChangedEvent {
    pub window_id: WindowId,
    pub cause: ChangeCause,
    pub mapping: Arc<ColumnMapping>,
    pub timestamp: DateTime<Utc>,
}

impl StructureChangedEvent {
    pub fn new(window_id: WindowId, cause: ChangeCause, mapping: Arc<ColumnMapping>) -> Self {
        Self {
            window_id,
            cause,
            mapping,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_json_shape() {
        let event = SemanticClickEvent::new(ColumnType::Subject, "Quarterly Report", TabId(4));
        let value: serde_json::Value = serde_json::from_str(&event.to_json().unwrap()).unwrap();

        assert_eq!(value["columnType"], "subject");
        assert_eq!(value["rawCellText"], "Quarterly Report");
        assert_eq!(value["originTab"], 4);
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn test_click_json_parses_back() {
        let event = SemanticClickEvent::new(ColumnType::Sender, "alice@example.com", TabId(1));
        let parsed: SemanticClickEvent = serde_json::from_str(&event.to_json().unwrap()).unwrap();
        assert_eq!(parsed, event);
    }
}
