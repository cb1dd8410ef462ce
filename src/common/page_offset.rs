//! Page offset type.

use std::fmt;

use super::config::PAGE_SIZE;

/// Identifies an index page by its byte offset in the file.
///
/// Index files link pages by absolute byte offsets rather than page
/// numbers. Offset 0 is the header page, so it never names a tree page and
/// doubles as "no page" in child and parent links.
///
/// # Example
/// ```
/// use dbfntx::PageOffset;
///
/// let offset = PageOffset::new(2048);
/// assert!(offset.is_some());
/// assert!(offset.is_aligned());
/// assert!(!PageOffset::NONE.is_some());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageOffset(pub u64);

impl PageOffset {
    /// Sentinel for "no page": a leaf item's child, or the root's parent.
    pub const NONE: PageOffset = PageOffset(0);

    /// Create a new PageOffset.
    #[inline]
    pub fn new(offset: u64) -> Self {
        PageOffset(offset)
    }

    /// Check that this offset links to a page.
    #[inline]
    pub fn is_some(&self) -> bool {
        *self != Self::NONE
    }

    /// Check that this offset falls on a page boundary.
    #[inline]
    pub fn is_aligned(&self) -> bool {
        self.0 % PAGE_SIZE as u64 == 0
    }
}

impl fmt::Display for PageOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::NONE {
            write!(f, "Page(NONE)")
        } else {
            write!(f, "Page(@{})", self.0)
        }
    }
}

/// 1-based ordinal of a record in a table file.
pub type RecNo = u64;
