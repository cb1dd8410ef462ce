//! Page - the fundamental 1KB unit of index storage.
//!
//! A [`Page`] is the raw block read from an index file. It is parsed into
//! an [`IndexRoot`](super::IndexRoot) (the header page) or an
//! [`IndexPage`](super::IndexPage) (a tree page) right after the read.

use crate::common::config::PAGE_SIZE;

/// A raw page of index data (1KB).
///
/// All multi-byte fields in the index format are little-endian; the
/// accessors below decode them. Callers are responsible for keeping
/// positions inside the page, which the parsers check before reading.
///
/// # Example
/// ```
/// use dbfntx::storage::page::Page;
///
/// let mut page = Page::new();
/// page.as_mut_slice()[0..2].copy_from_slice(&7u16.to_le_bytes());
/// assert_eq!(page.u16_at(0), 7);
/// ```
pub struct Page {
    data: [u8; PAGE_SIZE],
}

impl Page {
    /// Create a new zeroed page.
    #[inline]
    pub fn new() -> Self {
        Self {
            data: [0u8; PAGE_SIZE],
        }
    }

    /// Get immutable slice of page data.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Get mutable slice of page data.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Get the size of a page.
    #[inline]
    pub const fn size() -> usize {
        PAGE_SIZE
    }

    /// Read a little-endian u16 at `pos`.
    #[inline]
    pub fn u16_at(&self, pos: usize) -> u16 {
        u16::from_le_bytes([self.data[pos], self.data[pos + 1]])
    }

    /// Read a little-endian u32 at `pos`.
    #[inline]
    pub fn u32_at(&self, pos: usize) -> u32 {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(&self.data[pos..pos + 4]);
        u32::from_le_bytes(buf)
    }

    /// Read a little-endian u64 at `pos`.
    #[inline]
    pub fn u64_at(&self, pos: usize) -> u64 {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&self.data[pos..pos + 8]);
        u64::from_le_bytes(buf)
    }

    /// Bytes `pos..pos + len`.
    #[inline]
    pub fn bytes_at(&self, pos: usize, len: usize) -> &[u8] {
        &self.data[pos..pos + len]
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("entries", &self.u16_at(0))
            .finish_non_exhaustive()
    }
}

// ============================================================================
// TESTS
// ============================================================================
