//! Format constants and open-time options.

/// Size of an index page in bytes.
///
/// Every NTX page, including the header page at offset 0, is exactly one
/// kilobyte. Page offsets stored in the file are byte offsets and must be
/// multiples of this value.
pub const PAGE_SIZE: usize = 1024;

/// Largest key an index may declare.
pub const MAX_KEY_LEN: usize = 256;

/// Smallest legal index file: the header page plus one tree page.
pub const MIN_INDEX_FILE_LEN: u64 = 2 * PAGE_SIZE as u64;

/// Accepted values of the first signature byte.
pub const VALID_SIGNATURES: [u8; 5] = [0x03, 0x06, 0x07, 0x26, 0x27];

/// Size of the fixed part of a table header.
pub const TABLE_HEADER_SIZE: usize = 32;

/// Size of one field descriptor in a table header.
pub const FIELD_DESC_SIZE: usize = 32;

/// Byte terminating the field descriptor array.
pub const FIELD_TERMINATOR: u8 = 0x0D;

/// Marker in the first byte of a deleted record.
pub const DELETED_FLAG: u8 = b'*';

/// Options applied when an index file is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexConfig {
    /// Reject files whose signature byte is not one of [`VALID_SIGNATURES`].
    pub verify_signature: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            verify_signature: true,
        }
    }
}

/// Options applied when a table is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableConfig {
    /// Skip records carrying the deletion flag during navigation.
    pub hide_deleted: bool,
    /// Index file settings used by [`crate::table::Table::attach_index`].
    pub index: IndexConfig,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            hide_deleted: true,
            index: IndexConfig::default(),
        }
    }
}
