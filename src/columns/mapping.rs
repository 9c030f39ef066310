//! Semantic columns and the class-name mapping discovered for them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::traits::{column_tokens, Element, ElementRef};

/// Semantic column a click can be attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Subject,
    Recipient,
    /// Sender or correspondent; the two share one slot.
    Sender,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Subject => "subject",
            ColumnType::Recipient => "recipient",
            ColumnType::Sender => "sender",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current class name of each semantic column.
///
/// A slot is `None` when no header exposed a usable token for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub subject: Option<String>,
    pub recipient: Option<String>,
    pub sender: Option<String>,
    pub correspondent: Option<String>,
}

impl ColumnMapping {
    /// Build a mapping from header cells in document order.
    ///
    /// Only tokens ending in `-column` are considered. A later header
    /// overwrites an earlier one for the same slot.
    ///
    /// A "sender" or "correspondent" token fills both of those slots. No
    /// other column pair is merged.
    pub fn from_headers(headers: &[ElementRef]) -> Self {
        let mut mapping = Self::default();
        for header in headers {
            for token in column_tokens(header.as_ref()) {
                mapping.absorb(&token);
            }
        }
        mapping
    }

    fn absorb(&mut self, token: &str) {
        if token.contains("subject") {
            self.subject = Some(token.to_string());
        }
        if token.contains("recipient") {
            self.recipient = Some(token.to_string());
        }
        if token.contains("sender") || token.contains("correspondent") {
            self.sender = Some(token.to_string());
            self.correspondent = Some(token.to_string());
        }
    }

    /// True when every slot is absent.
    pub fn is_empty(&self) -> bool {
        self.subject.is_none()
            && self.recipient.is_none()
            && self.sender.is_none()
            && self.correspondent.is_none()
    }

    /// Column identified by any of `tokens`.
    ///
    /// Slots are checked subject, recipient, sender, correspondent; a
    /// correspondent match is reported as [`ColumnType::Sender`].
    pub fn column_for_tokens<S: AsRef<str>>(&self, tokens: &[S]) -> Option<ColumnType> {
        let has = |slot: &Option<String>| {
            slot.as_deref()
                .map(|class| tokens.iter().any(|t| t.as_ref() == class))
                .unwrap_or(false)
        };

        if has(&self.subject) {
            Some(ColumnType::Subject)
        } else if has(&self.recipient) {
            Some(ColumnType::Recipient)
        } else if has(&self.sender) || has(&self.correspondent) {
            Some(ColumnType::Sender)
        } else {
            None
        }
    }

    /// Column of a table cell, judged by its class tokens.
    pub fn column_for_cell(&self, cell: &dyn Element) -> Option<ColumnType> {
        self.column_for_tokens(&cell.class_tokens())
    }
}
