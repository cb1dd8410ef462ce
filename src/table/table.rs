//! Table - record access in natural or index order.

use std::cmp::Ordering;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

use log::debug;

use crate::common::config::{TableConfig, DELETED_FLAG};
use crate::common::{Error, RecNo, Result};
use crate::index::{key, Navigator};

use super::header::{read_header, Field, TableHeader};
use super::FindState;

/// One open table file, optionally ordered by an index.
///
/// The table holds one record at a time. Every navigation call returns
/// `Ok(true)` when a record is positioned and `Ok(false)` when there is
/// none in that direction; errors are reserved for I/O failures and
/// damaged files.
///
/// Without an index, records are visited by record number. With an index
/// attached, [`top`](Self::top), [`bottom`](Self::bottom),
/// [`next`](Self::next) and [`prev`](Self::prev) follow key order.
pub struct Table {
    file: File,
    name: String,
    header: TableHeader,
    fields: Vec<Field>,
    /// Raw bytes of the current record.
    record: Vec<u8>,
    current: Option<RecNo>,
    index: Option<Navigator>,
    config: TableConfig,
}

impl Table {
    /// Open a table with default options.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, TableConfig::default())
    }

    /// Open a table and read its header.
    ///
    /// No record is positioned until a navigation call.
    ///
    /// # Errors
    /// - `Error::Io` if the file cannot be opened or its header read
    /// - `Error::CorruptTable` if the header is malformed
    pub fn open_with<P: AsRef<Path>>(path: P, config: TableConfig) -> Result<Self> {
        let name = path.as_ref().display().to_string();
        let mut file = OpenOptions::new()
            .read(true)
            .open(&path)
            .map_err(|e| Error::io(&name, "open", e))?;

        let (header, fields) = read_header(&mut file, &name)?;
        debug!(
            "opened table {} ({} records, {} fields)",
            name,
            header.record_count,
            fields.len()
        );

        Ok(Self {
            file,
            name,
            record: vec![b' '; header.record_len as usize],
            header,
            fields,
            current: None,
            index: None,
            config,
        })
    }

    /// Order the table by the index at `path`, replacing any previous one.
    pub fn attach_index<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let nav = Navigator::open_with(path, self.config.index)?;
        debug!(
            "table {}: index on '{}' attached",
            self.name,
            nav.key_expression()
        );
        self.index = Some(nav);
        Ok(())
    }

    /// Go back to natural order, returning the detached index.
    pub fn detach_index(&mut self) -> Option<Navigator> {
        self.index.take()
    }

    pub fn index(&self) -> Option<&Navigator> {
        self.index.as_ref()
    }

    // ========================================================================
    // Public API: Navigation
    // ========================================================================

    /// Position on the first record.
    pub fn top(&mut self) -> Result<bool> {
        let rec_no = match self.index.as_mut() {
            Some(nav) => nav.top()?,
            None => Some(1),
        };
        self.settle(rec_no, true)
    }

    /// Position on the last record.
    pub fn bottom(&mut self) -> Result<bool> {
        let rec_no = match self.index.as_mut() {
            Some(nav) => nav.bottom()?,
            None => Some(self.last_record()?),
        };
        self.settle(rec_no, false)
    }

    /// Position on the following record.
    pub fn next(&mut self) -> Result<bool> {
        self.step(true)
    }

    /// Position on the preceding record.
    pub fn prev(&mut self) -> Result<bool> {
        self.step(false)
    }

    /// Position on record `rec_no` directly, deleted or not.
    ///
    /// The index position is left as it is.
    pub fn go_to(&mut self, rec_no: RecNo) -> Result<bool> {
        self.read_record(Some(rec_no))
    }

    /// Position on the first record whose key is not below `search`.
    ///
    /// Deleted records are stepped over when hidden. The state compares
    /// `search` with the key of the record positioned on. Without an index
    /// the result is always `NotFound`.
    pub fn find(&mut self, search: &[u8]) -> Result<FindState> {
        let Some(nav) = self.index.as_mut() else {
            debug!("table {}: find without an index", self.name);
            return Ok(FindState::NotFound);
        };

        let search = key::truncate(search, nav.key_size());
        let rec_no = nav.find(search)?.map(|found| found.rec_no);
        if !self.settle(rec_no, true)? {
            return Ok(FindState::NotFound);
        }

        let Some(current) = self.index.as_ref().and_then(Navigator::current_key) else {
            return Ok(FindState::NotFound);
        };
        Ok(match key::compare(search, current) {
            Ordering::Equal => FindState::Found,
            Ordering::Less => FindState::After,
            Ordering::Greater => FindState::Before,
        })
    }

    /// Find `search` and report whether it matched.
    pub fn seek(&mut self, search: &[u8]) -> Result<bool> {
        Ok(self.find(search)? == FindState::Found)
    }

    /// Find `search`, accepting the next greater key when it is missing.
    ///
    /// True when the table stands on a record at or after `search`.
    pub fn soft_seek(&mut self, search: &[u8]) -> Result<bool> {
        Ok(matches!(
            self.find(search)?,
            FindState::Found | FindState::After
        ))
    }

    /// Drop the current record and the index page cache.
    pub fn reset_all(&mut self) -> Result<()> {
        self.clear();
        match self.index.as_mut() {
            Some(nav) => nav.reset(),
            None => Ok(()),
        }
    }

    // ========================================================================
    // Public API: Record and fields
    // ========================================================================

    /// Number of the current record.
    pub fn current(&self) -> Option<RecNo> {
        self.current
    }

    /// True if the current record carries the deletion flag.
    pub fn deleted(&self) -> bool {
        self.current.is_some() && self.record.first() == Some(&DELETED_FLAG)
    }

    /// Raw bytes of the current record, deletion flag first.
    pub fn record(&self) -> Option<&[u8]> {
        self.current.map(|_| self.record.as_slice())
    }

    pub fn header(&self) -> &TableHeader {
        &self.header
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Field descriptor by position.
    pub fn field(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    /// Field descriptor by name, ignoring case.
    pub fn field_by_name(&self, name: &str) -> Result<&Field> {
        self.fields
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::FieldNotFound(name.to_owned()))
    }

    /// Raw bytes of field `name` in the current record.
    ///
    /// `None` when no record is positioned.
    pub fn field_bytes(&self, name: &str) -> Result<Option<&[u8]>> {
        let range = self.field_by_name(name)?.range();
        Ok(self.record().map(|record| &record[range]))
    }

    /// Field `name` of the current record as text with trailing blanks cut.
    pub fn field_str(&self, name: &str) -> Result<Option<String>> {
        Ok(self
            .field_bytes(name)?
            .map(|bytes| String::from_utf8_lossy(bytes).trim_end().to_owned()))
    }

    /// Number of the last record, derived from the file length.
    ///
    /// Unlike the header count this sees records appended since the header
    /// was written.
    pub fn last_record(&self) -> Result<RecNo> {
        let len = self
            .file
            .metadata()
            .map_err(|e| Error::io(&self.name, "last_record", e))?
            .len();
        let data = len.saturating_sub(self.header.header_len as u64);
        Ok(data / self.header.record_len as u64)
    }

    /// Table file name as used in error messages.
    pub fn name(&self) -> &str {
        &self.name
    }

    // ========================================================================
    // Internal
    // ========================================================================

    fn step(&mut self, forward: bool) -> Result<bool> {
        loop {
            let rec_no = match (self.index.as_mut(), forward) {
                (Some(nav), true) => nav.next()?,
                (Some(nav), false) => nav.prev()?,
                (None, true) => self.current.map(|rec_no| rec_no + 1),
                (None, false) => self.current.map(|rec_no| rec_no - 1),
            };
            if !self.read_record(rec_no)? {
                return Ok(false);
            }
            if !self.hidden() {
                return Ok(true);
            }
        }
    }

    /// Read `rec_no`, then step over hidden records in `forward` direction.
    fn settle(&mut self, rec_no: Option<RecNo>, forward: bool) -> Result<bool> {
        if !self.read_record(rec_no)? {
            return Ok(false);
        }
        if self.hidden() {
            return self.step(forward);
        }
        Ok(true)
    }

    fn hidden(&self) -> bool {
        self.config.hide_deleted && self.deleted()
    }

    /// Load `rec_no` into the record buffer.
    ///
    /// A record past the end of the file is not an error: the table is left
    /// without a current record.
    fn read_record(&mut self, rec_no: Option<RecNo>) -> Result<bool> {
        let rec_no = match rec_no {
            Some(rec_no) if rec_no > 0 => rec_no,
            _ => {
                self.clear();
                return Ok(false);
            }
        };

        let offset =
            self.header.header_len as u64 + (rec_no - 1) * self.header.record_len as u64;
        self.file
            .seek(SeekFrom::Start(offset))
            .map_err(|e| Error::io(&self.name, "read_record", e))?;

        match self.file.read_exact(&mut self.record) {
            Ok(()) => {
                self.current = Some(rec_no);
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                self.clear();
                Ok(false)
            }
            Err(e) => {
                self.clear();
                Err(Error::io(&self.name, "read_record", e))
            }
        }
    }

    fn clear(&mut self) {
        self.record.fill(b' ');
        self.current = None;
    }
}
