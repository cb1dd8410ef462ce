//! Key comparison.
//!
//! Index keys are fixed-size byte strings. The key expression evaluator
//! that produced them already formats numbers and dates into sortable
//! bytes, so ordering is plain byte order with no collation.

use std::cmp::Ordering;

/// Compare a search key against a stored key.
///
/// Only the first `search.len()` bytes of `stored` take part, so a short
/// search key matches every stored key it is a prefix of. The result is
/// the ordering of `search` relative to `stored`.
///
/// # Example
/// ```
/// use std::cmp::Ordering;
/// use dbfntx::index::key::compare;
///
/// assert_eq!(compare(b"SMI", b"SMITH     "), Ordering::Equal);
/// assert_eq!(compare(b"SMA", b"SMITH     "), Ordering::Less);
/// assert_eq!(compare(b"SMZ", b"SMITH     "), Ordering::Greater);
/// ```
#[inline]
pub fn compare(search: &[u8], stored: &[u8]) -> Ordering {
    let len = search.len().min(stored.len());
    search.cmp(&stored[..len])
}

/// Cut a search key down to the declared key size.
#[inline]
pub fn truncate(search: &[u8], key_size: usize) -> &[u8] {
    &search[..search.len().min(key_size)]
}
