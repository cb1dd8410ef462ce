//! Index header page.
//!
//! The first page of every index file is an [`IndexRoot`] describing the
//! tree: where the root page lives, how wide keys and items are, and the
//! key expression the index was built from.

use crate::common::config::{IndexConfig, MAX_KEY_LEN, PAGE_SIZE, VALID_SIGNATURES};
use crate::common::{Error, PageOffset, Result};

use super::page::Page;

/// Width of the child-offset and record-number fields of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldWidth {
    /// 4-byte fields: the classic layout, `item_size == key_size + 8`.
    Narrow,
    /// 8-byte fields: `item_size == key_size + 16`.
    Wide,
}

impl FieldWidth {
    /// Field width in bytes.
    #[inline]
    pub fn bytes(self) -> usize {
        match self {
            FieldWidth::Narrow => 4,
            FieldWidth::Wide => 8,
        }
    }
}

/// Parsed and validated index header.
///
/// # Layout (little-endian, packed)
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       2     signature
/// 2       2     version (update counter)
/// 4       4     root page offset
/// 8       4     first unused page offset
/// 12      2     item size
/// 14      2     key size
/// 16      2     key decimals
/// 18      2     max items per page
/// 20      2     half page (min items per page)
/// 22      256   key expression, NUL padded
/// 278     1     unique flag
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRoot {
    pub signature: u16,
    pub version: u16,
    pub root: PageOffset,
    pub unused: PageOffset,
    pub item_size: u16,
    pub key_size: u16,
    pub key_dec: u16,
    pub max_items: u16,
    pub half_page: u16,
    pub key_expr: String,
    pub unique: bool,
    pub field_width: FieldWidth,
}

impl IndexRoot {
    pub const OFFSET_SIGNATURE: usize = 0;
    pub const OFFSET_VERSION: usize = 2;
    pub const OFFSET_ROOT: usize = 4;
    pub const OFFSET_UNUSED: usize = 8;
    pub const OFFSET_ITEM_SIZE: usize = 12;
    pub const OFFSET_KEY_SIZE: usize = 14;
    pub const OFFSET_KEY_DEC: usize = 16;
    pub const OFFSET_MAX_ITEMS: usize = 18;
    pub const OFFSET_HALF_PAGE: usize = 20;
    pub const OFFSET_KEY_EXPR: usize = 22;
    pub const OFFSET_UNIQUE: usize = 278;

    /// Decode and validate the header page of `file`.
    ///
    /// # Errors
    /// `Error::CorruptIndex` if the key size is out of range, the item size
    /// does not match the key size, the signature is unknown (when
    /// `config.verify_signature` is set), the slot table cannot fit a page,
    /// or the root offset is missing or unaligned.
    pub fn from_page(page: &Page, file: &str, config: &IndexConfig) -> Result<Self> {
        const OP: &str = "load_root";

        let signature = page.u16_at(Self::OFFSET_SIGNATURE);
        let key_size = page.u16_at(Self::OFFSET_KEY_SIZE);
        let item_size = page.u16_at(Self::OFFSET_ITEM_SIZE);
        let max_items = page.u16_at(Self::OFFSET_MAX_ITEMS);
        let root = PageOffset::new(page.u32_at(Self::OFFSET_ROOT) as u64);

        if config.verify_signature {
            let lead = signature.to_le_bytes()[0];
            if !VALID_SIGNATURES.contains(&lead) {
                return Err(Error::corrupt_index(
                    file,
                    OP,
                    format!("unknown signature byte {lead:#04x}"),
                ));
            }
        }

        if key_size == 0 || key_size as usize > MAX_KEY_LEN {
            return Err(Error::corrupt_index(
                file,
                OP,
                format!("key size {key_size} outside 1..={MAX_KEY_LEN}"),
            ));
        }

        let field_width = if item_size as usize == key_size as usize + 8 {
            FieldWidth::Narrow
        } else if item_size as usize == key_size as usize + 16 {
            FieldWidth::Wide
        } else {
            return Err(Error::corrupt_index(
                file,
                OP,
                format!("item size {item_size} does not match key size {key_size}"),
            ));
        };

        // Count word plus one slot offset per item and one for the sentinel.
        if max_items == 0 || 2 + 2 * (max_items as usize + 1) > PAGE_SIZE {
            return Err(Error::corrupt_index(
                file,
                OP,
                format!("max items per page {max_items} does not fit a page"),
            ));
        }

        if !root.is_some() || !root.is_aligned() {
            return Err(Error::corrupt_index(
                file,
                OP,
                format!("invalid root page offset {}", root.0),
            ));
        }

        let expr = page.bytes_at(Self::OFFSET_KEY_EXPR, MAX_KEY_LEN);
        let end = expr.iter().position(|&b| b == 0).unwrap_or(expr.len());
        let key_expr = String::from_utf8_lossy(&expr[..end]).trim().to_string();

        Ok(Self {
            signature,
            version: page.u16_at(Self::OFFSET_VERSION),
            root,
            unused: PageOffset::new(page.u32_at(Self::OFFSET_UNUSED) as u64),
            item_size,
            key_size,
            key_dec: page.u16_at(Self::OFFSET_KEY_DEC),
            max_items,
            half_page: page.u16_at(Self::OFFSET_HALF_PAGE),
            key_expr,
            unique: page.as_slice()[Self::OFFSET_UNIQUE] != 0,
            field_width,
        })
    }

    /// Key size in bytes.
    #[inline]
    pub fn key_len(&self) -> usize {
        self.key_size as usize
    }
}

// ============================================================================
// TESTS
// ============================================================================
