//! Error types for dbfntx.

use std::io;

use thiserror::Error;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors raised by the table and index readers.
///
/// Variants tied to a file carry the file name and the name of the
/// operation that failed, so a message is self-describing without a
/// backtrace.
#[derive(Debug, Error)]
pub enum Error {
    /// Open, seek or read failure.
    #[error("{file}: {op}: {source}")]
    Io {
        file: String,
        op: &'static str,
        #[source]
        source: io::Error,
    },

    /// The index file violates its format or its ordering.
    #[error("{file}: {op}: corrupt index: {reason}")]
    CorruptIndex {
        file: String,
        op: &'static str,
        reason: String,
    },

    /// A page that must already be cached is missing.
    #[error("{file}: {op}: page at offset {offset} is not cached")]
    NotFound {
        file: String,
        op: &'static str,
        offset: u64,
    },

    /// The table header is malformed.
    #[error("{file}: {op}: corrupt table: {reason}")]
    CorruptTable {
        file: String,
        op: &'static str,
        reason: String,
    },

    /// No field with this name exists in the table.
    #[error("field '{0}' not found")]
    FieldNotFound(String),
}

impl Error {
    pub(crate) fn io(file: &str, op: &'static str, source: io::Error) -> Self {
        Error::Io {
            file: file.to_owned(),
            op,
            source,
        }
    }

    pub(crate) fn corrupt_index(file: &str, op: &'static str, reason: impl Into<String>) -> Self {
        Error::CorruptIndex {
            file: file.to_owned(),
            op,
            reason: reason.into(),
        }
    }

    pub(crate) fn corrupt_table(file: &str, op: &'static str, reason: impl Into<String>) -> Self {
        Error::CorruptTable {
            file: file.to_owned(),
            op,
            reason: reason.into(),
        }
    }

    /// True for errors reporting a damaged index file.
    pub fn is_corrupt_index(&self) -> bool {
        matches!(self, Error::CorruptIndex { .. })
    }
}
