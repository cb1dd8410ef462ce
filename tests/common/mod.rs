//! Shared fixtures: index and table files written into temporary directories.

#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::iter;
use std::path::Path;

use dbfntx::PAGE_SIZE;

/// Key bytes and record number of one index entry.
pub type Entry = (Vec<u8>, u64);

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Entries for `keys`, numbered from 1 in the given order and sorted the
/// way an index stores them.
pub fn entries(keys: &[&str]) -> Vec<Entry> {
    let mut out: Vec<Entry> = keys
        .iter()
        .enumerate()
        .map(|(n, key)| (key.as_bytes().to_vec(), n as u64 + 1))
        .collect();
    out.sort();
    out
}

/// Lays out an index file page by page.
///
/// Tree pages are numbered from offset 1024 in the order they are added;
/// the root is whichever page is passed to [`write`](Self::write).
pub struct IndexWriter {
    key_size: usize,
    max_items: usize,
    wide: bool,
    signature: u16,
    item_size: Option<u16>,
    expression: String,
    pages: Vec<Vec<u8>>,
}

impl IndexWriter {
    pub fn new(key_size: usize) -> Self {
        let item_len = key_size + 8;
        Self {
            key_size,
            max_items: (PAGE_SIZE - 2) / (item_len + 2) - 1,
            wide: false,
            signature: 0x06,
            item_size: None,
            expression: "KEY".to_owned(),
            pages: Vec::new(),
        }
    }

    pub fn max_items(mut self, max_items: usize) -> Self {
        assert!(max_items >= 2);
        self.max_items = max_items;
        self
    }

    /// Use 8-byte child and record fields.
    pub fn wide(mut self) -> Self {
        self.wide = true;
        self.max_items = self.max_items.min((PAGE_SIZE - 2) / (self.item_len() + 2) - 1);
        self
    }

    pub fn signature(mut self, signature: u16) -> Self {
        self.signature = signature;
        self
    }

    /// Declare an item size other than the one the layout uses.
    pub fn declared_item_size(mut self, item_size: u16) -> Self {
        self.item_size = Some(item_size);
        self
    }

    pub fn expression(mut self, expression: &str) -> Self {
        self.expression = expression.to_owned();
        self
    }

    fn width(&self) -> usize {
        if self.wide {
            8
        } else {
            4
        }
    }

    fn item_len(&self) -> usize {
        self.key_size + 2 * self.width()
    }

    fn put(&self, data: &mut [u8], pos: usize, value: u64) {
        if self.wide {
            data[pos..pos + 8].copy_from_slice(&value.to_le_bytes());
        } else {
            data[pos..pos + 4].copy_from_slice(&(value as u32).to_le_bytes());
        }
    }

    /// Add a page of `(child, rec_no, key)` items with an upper bound child.
    /// Keys are padded with blanks to the key size.
    pub fn page(&mut self, items: &[(u64, u64, &[u8])], upper: u64) -> u64 {
        assert!(items.len() <= self.max_items, "page overflow");

        let mut data = vec![0u8; PAGE_SIZE];
        data[0..2].copy_from_slice(&(items.len() as u16).to_le_bytes());

        let table_end = 2 + 2 * (self.max_items + 1);
        let item_len = self.item_len();
        let width = self.width();
        let slots = items
            .iter()
            .copied()
            .chain(iter::once((upper, 0, &b""[..])));
        for (slot, (child, rec_no, key)) in slots.enumerate() {
            let pos = table_end + slot * item_len;
            assert!(pos + item_len <= PAGE_SIZE, "item past page end");

            data[2 + 2 * slot..4 + 2 * slot].copy_from_slice(&(pos as u16).to_le_bytes());
            self.put(&mut data, pos, child);
            self.put(&mut data, pos + width, rec_no);

            let key_pos = pos + 2 * width;
            let stored = &mut data[key_pos..key_pos + self.key_size];
            stored.fill(b' ');
            let len = key.len().min(self.key_size);
            stored[..len].copy_from_slice(&key[..len]);
        }

        self.pages.push(data);
        (self.pages.len() * PAGE_SIZE) as u64
    }

    /// Add a leaf holding `(key, rec_no)` entries.
    pub fn leaf(&mut self, entries: &[(&[u8], u64)]) -> u64 {
        let items: Vec<(u64, u64, &[u8])> = entries.iter().map(|&(key, rec)| (0, rec, key)).collect();
        self.page(&items, 0)
    }

    /// Add a balanced tree over sorted `entries`, returning its root.
    pub fn tree(&mut self, entries: &[Entry]) -> u64 {
        let cap = self.max_items;
        if entries.len() <= cap {
            let leaf: Vec<(&[u8], u64)> = entries.iter().map(|(k, r)| (k.as_slice(), *r)).collect();
            return self.leaf(&leaf);
        }

        let children = (entries.len() + 1).div_ceil(cap + 1).clamp(2, cap + 1);
        let rest = entries.len() - (children - 1);
        let (base, extra) = (rest / children, rest % children);

        let mut separators: Vec<(u64, u64, Vec<u8>)> = Vec::new();
        let mut upper = 0;
        let mut start = 0;
        for n in 0..children {
            let len = base + usize::from(n < extra);
            let child = self.tree(&entries[start..start + len]);
            start += len;
            if n + 1 < children {
                let (key, rec_no) = &entries[start];
                separators.push((child, *rec_no, key.clone()));
                start += 1;
            } else {
                upper = child;
            }
        }

        let items: Vec<(u64, u64, &[u8])> = separators
            .iter()
            .map(|(child, rec, key)| (*child, *rec, key.as_slice()))
            .collect();
        self.page(&items, upper)
    }

    /// Write the header and every page, with the tree rooted at `root`.
    pub fn write(&self, path: &Path, root: u64) {
        let mut header = vec![0u8; PAGE_SIZE];
        let item_size = self.item_size.unwrap_or(self.item_len() as u16);
        header[0..2].copy_from_slice(&self.signature.to_le_bytes());
        header[2..4].copy_from_slice(&1u16.to_le_bytes());
        header[4..8].copy_from_slice(&(root as u32).to_le_bytes());
        header[12..14].copy_from_slice(&item_size.to_le_bytes());
        header[14..16].copy_from_slice(&(self.key_size as u16).to_le_bytes());
        header[18..20].copy_from_slice(&(self.max_items as u16).to_le_bytes());
        header[20..22].copy_from_slice(&((self.max_items / 2) as u16).to_le_bytes());
        header[22..22 + self.expression.len()].copy_from_slice(self.expression.as_bytes());

        let mut file = File::create(path).unwrap();
        file.write_all(&header).unwrap();
        for page in &self.pages {
            file.write_all(page).unwrap();
        }
    }
}

/// Write an index over `entries` with up to `max_items` keys per page.
pub fn write_index(path: &Path, key_size: usize, max_items: usize, entries: &[Entry]) {
    let mut writer = IndexWriter::new(key_size).max_items(max_items);
    let root = writer.tree(entries);
    writer.write(path, root);
}

/// One table row: deletion flag and field values in field order.
pub type Row<'a> = (bool, &'a [&'a str]);

/// Write a table of character fields `(name, length)`.
pub fn write_table(path: &Path, fields: &[(&str, u8)], rows: &[Row]) {
    let record_len: usize = 1 + fields.iter().map(|&(_, len)| len as usize).sum::<usize>();
    let header_len = 32 + 32 * fields.len() + 1;

    let mut bytes = vec![0u8; 32];
    bytes[0] = 0x03;
    bytes[1..4].copy_from_slice(&[124, 1, 31]);
    bytes[4..8].copy_from_slice(&(rows.len() as u32).to_le_bytes());
    bytes[8..10].copy_from_slice(&(header_len as u16).to_le_bytes());
    bytes[10..12].copy_from_slice(&(record_len as u16).to_le_bytes());

    for &(name, len) in fields {
        let mut desc = [0u8; 32];
        desc[..name.len()].copy_from_slice(name.as_bytes());
        desc[11] = b'C';
        desc[16] = len;
        bytes.extend_from_slice(&desc);
    }
    bytes.push(0x0D);

    for &(deleted, values) in rows {
        bytes.push(if deleted { b'*' } else { b' ' });
        for (&(_, len), value) in fields.iter().zip(values) {
            bytes.extend_from_slice(format!("{:<width$}", value, width = len as usize).as_bytes());
        }
    }
    bytes.push(0x1A);

    File::create(path).unwrap().write_all(&bytes).unwrap();
}
