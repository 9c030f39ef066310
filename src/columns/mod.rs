//! Semantic column resolution.
//!
//! The message list can be reordered, localized and restyled by the host,
//! so a column is identified by the class token its header carries rather
//! than by position or label. [`ColumnResolver`] scans the header row once
//! and caches the result per window until the table's structure changes.

mod mapping;
mod resolver;

pub use mapping::{ColumnMapping, ColumnType};
pub use resolver::ColumnResolver;
