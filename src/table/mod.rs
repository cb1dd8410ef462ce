//! Table files.
//!
//! - [`Table`] - Record reading with natural or indexed navigation
//! - [`TableHeader`] / [`Field`] - Parsed header and field descriptors

mod header;
#[allow(clippy::module_inception)]
mod table;

pub use header::{Field, TableHeader};
pub use table::Table;

/// Outcome of [`Table::find`].
///
/// Compares the search key with the key of the record the table ends up
/// on, over the length of the search key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindState {
    /// The record's key starts with the search key.
    Found,
    /// The search key sorts after the record's key; it is larger than
    /// every key in the index.
    Before,
    /// The search key sorts before the record's key; the table stands on
    /// the next greater key.
    After,
    /// No record is positioned.
    NotFound,
}
