//! Table header and field descriptors.
//!
//! ```text
//! Offset  Size  Field
//! ──────  ────  ─────────────────────────
//!    0     1    signature
//!    1     3    last update (YY MM DD)
//!    4     4    record count
//!    8     2    header length
//!   10     2    record length
//!   32    32    field descriptor × N, then 0x0D
//! ```
//!
//! Field descriptor: name (11 bytes, NUL padded) @0, type @11, length @16,
//! decimal count @17.

use std::io::Read;

use crate::common::config::{FIELD_DESC_SIZE, FIELD_TERMINATOR, TABLE_HEADER_SIZE};
use crate::common::{Error, Result};

const OFFSET_SIGNATURE: usize = 0;
const OFFSET_UPDATED: usize = 1;
const OFFSET_RECORD_COUNT: usize = 4;
const OFFSET_HEADER_LEN: usize = 8;
const OFFSET_RECORD_LEN: usize = 10;

const FIELD_NAME_LEN: usize = 11;
const OFFSET_FIELD_TYPE: usize = 11;
const OFFSET_FIELD_LEN: usize = 16;
const OFFSET_FIELD_DEC: usize = 17;

/// Fixed part of a table header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableHeader {
    pub signature: u8,
    /// Last update as stored: years since 1900, month, day.
    pub last_update: (u8, u8, u8),
    /// Record count recorded in the header.
    pub record_count: u32,
    /// Bytes before the first record.
    pub header_len: u16,
    /// Bytes per record, deletion flag included.
    pub record_len: u16,
}

impl TableHeader {
    fn from_bytes(data: &[u8; TABLE_HEADER_SIZE]) -> Self {
        let u16_at = |pos: usize| u16::from_le_bytes([data[pos], data[pos + 1]]);
        Self {
            signature: data[OFFSET_SIGNATURE],
            last_update: (
                data[OFFSET_UPDATED],
                data[OFFSET_UPDATED + 1],
                data[OFFSET_UPDATED + 2],
            ),
            record_count: u32::from_le_bytes([
                data[OFFSET_RECORD_COUNT],
                data[OFFSET_RECORD_COUNT + 1],
                data[OFFSET_RECORD_COUNT + 2],
                data[OFFSET_RECORD_COUNT + 3],
            ]),
            header_len: u16_at(OFFSET_HEADER_LEN),
            record_len: u16_at(OFFSET_RECORD_LEN),
        }
    }

    /// Last update as a calendar date `(year, month, day)`.
    pub fn last_update_date(&self) -> (u16, u8, u8) {
        let (yy, mm, dd) = self.last_update;
        (1900 + yy as u16, mm, dd)
    }
}

/// One column of the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    /// Type letter (`C`, `N`, `D`, `L`, `M`, ...).
    pub field_type: char,
    pub length: u8,
    pub decimals: u8,
    /// Position of the field in the record; 0 is the deletion flag.
    pub offset: usize,
}

impl Field {
    fn from_bytes(data: &[u8; FIELD_DESC_SIZE], offset: usize) -> Self {
        let name = &data[..FIELD_NAME_LEN];
        let end = name.iter().position(|&b| b == 0).unwrap_or(FIELD_NAME_LEN);
        Self {
            name: String::from_utf8_lossy(&name[..end]).trim().to_owned(),
            field_type: data[OFFSET_FIELD_TYPE] as char,
            length: data[OFFSET_FIELD_LEN],
            decimals: data[OFFSET_FIELD_DEC],
            offset,
        }
    }

    /// Byte range of the field inside a record.
    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.length as usize
    }
}

/// Read the header and field descriptors from the start of `reader`.
///
/// # Errors
/// - `Error::Io` if the header cannot be read
/// - `Error::CorruptTable` if the lengths do not describe a usable table
pub(crate) fn read_header<R: Read>(reader: &mut R, file: &str) -> Result<(TableHeader, Vec<Field>)> {
    const OP: &str = "read_header";

    let mut data = [0u8; TABLE_HEADER_SIZE];
    reader
        .read_exact(&mut data)
        .map_err(|e| Error::io(file, OP, e))?;
    let header = TableHeader::from_bytes(&data);

    let header_len = header.header_len as usize;
    if header_len < TABLE_HEADER_SIZE + 1 {
        return Err(Error::corrupt_table(
            file,
            OP,
            format!("header length {header_len} is too short"),
        ));
    }
    if header.record_len < 2 {
        return Err(Error::corrupt_table(
            file,
            OP,
            format!("record length {} is too short", header.record_len),
        ));
    }

    // Descriptors run until the terminator or the end of the header.
    let max_fields = (header_len - TABLE_HEADER_SIZE) / FIELD_DESC_SIZE;
    let mut fields = Vec::with_capacity(max_fields);
    let mut offset = 1;
    for _ in 0..max_fields {
        let mut desc = [0u8; FIELD_DESC_SIZE];
        reader
            .read_exact(&mut desc[..1])
            .map_err(|e| Error::io(file, OP, e))?;
        if desc[0] == FIELD_TERMINATOR {
            break;
        }
        reader
            .read_exact(&mut desc[1..])
            .map_err(|e| Error::io(file, OP, e))?;

        let field = Field::from_bytes(&desc, offset);
        offset += field.length as usize;
        fields.push(field);
    }

    if fields.is_empty() {
        return Err(Error::corrupt_table(file, OP, "no field descriptors"));
    }
    if offset > header.record_len as usize {
        return Err(Error::corrupt_table(
            file,
            OP,
            format!(
                "fields need {offset} bytes but records are {} bytes",
                header.record_len
            ),
        ));
    }

    Ok((header, fields))
}
