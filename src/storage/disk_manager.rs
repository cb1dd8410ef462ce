//! Disk Manager - low-level file I/O for index pages.
//!
//! The [`DiskManager`] handles all direct file operations on an index file:
//! - Validating the file shape and reading the header page
//! - Reading tree pages by byte offset

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use log::debug;

use crate::common::config::{IndexConfig, MIN_INDEX_FILE_LEN, PAGE_SIZE};
use crate::common::{Error, PageOffset, Result};
use crate::storage::page::{IndexRoot, Page};

/// Reads pages from a single index file.
///
/// # File Layout
/// ```text
/// ┌──────────┬─────────┬─────────┬─────────┬─────────┐
/// │ Header   │ Page    │ Page    │  ...    │ Page    │
/// │ (1KB)    │ (1KB)   │ (1KB)   │         │ (1KB)   │
/// └──────────┴─────────┴─────────┴─────────┴─────────┘
/// Offset:  0      1024     2048    ...    N×1024
/// ```
///
/// Pages link to each other by byte offset, and the tree root is wherever
/// the header says it is; it need not be the first tree page.
///
/// # Thread Safety
/// `DiskManager` is **single-threaded** and owns its file handle. Readers
/// that want to work in parallel open their own `DiskManager`.
#[derive(Debug)]
pub struct DiskManager {
    file: File,
    /// File name used in error messages.
    name: String,
    /// File length at open time.
    file_len: u64,
}

impl DiskManager {
    /// Open an existing index file for reading.
    ///
    /// # Errors
    /// Returns `Error::Io` if the file cannot be opened, and
    /// `Error::CorruptIndex` if it is shorter than two pages or not a whole
    /// number of pages.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let name = path.as_ref().display().to_string();
        let file = OpenOptions::new()
            .read(true)
            .open(&path)
            .map_err(|e| Error::io(&name, "open", e))?;

        let file_len = file
            .metadata()
            .map_err(|e| Error::io(&name, "open", e))?
            .len();

        if file_len < MIN_INDEX_FILE_LEN {
            return Err(Error::corrupt_index(
                &name,
                "open",
                format!("file length {file_len} is shorter than {MIN_INDEX_FILE_LEN}"),
            ));
        }
        if file_len % PAGE_SIZE as u64 != 0 {
            return Err(Error::corrupt_index(
                &name,
                "open",
                format!("file length {file_len} is not a multiple of {PAGE_SIZE}"),
            ));
        }

        debug!("opened index {} ({} bytes)", name, file_len);
        Ok(Self {
            file,
            name,
            file_len,
        })
    }

    /// Read and validate the header page.
    ///
    /// Also refreshes the file length, which may have changed since open.
    pub fn read_root(&mut self, config: &IndexConfig) -> Result<IndexRoot> {
        self.file_len = self
            .file
            .metadata()
            .map_err(|e| Error::io(&self.name, "load_root", e))?
            .len();
        let page = self.read_at(0, "load_root")?;
        IndexRoot::from_page(&page, &self.name, config)
    }

    /// Read one tree page.
    ///
    /// # Errors
    /// Returns `Error::CorruptIndex` if `offset` is not page aligned and
    /// `Error::Io` if the page cannot be read in full.
    pub fn read_page(&mut self, offset: PageOffset) -> Result<Page> {
        if !offset.is_aligned() {
            return Err(Error::corrupt_index(
                &self.name,
                "fetch_page",
                format!("offset {} is not a multiple of {PAGE_SIZE}", offset.0),
            ));
        }
        self.read_at(offset.0, "fetch_page")
    }

    fn read_at(&mut self, pos: u64, op: &'static str) -> Result<Page> {
        self.file
            .seek(SeekFrom::Start(pos))
            .map_err(|e| Error::io(&self.name, op, e))?;

        let mut page = Page::new();
        self.file
            .read_exact(page.as_mut_slice())
            .map_err(|e| Error::io(&self.name, op, e))?;

        Ok(page)
    }

    /// File name as used in error messages.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Total size of the index file in bytes.
    #[inline]
    pub fn file_len(&self) -> u64 {
        self.file_len
    }

    /// Number of whole pages in the file, header included.
    #[inline]
    pub fn page_count(&self) -> u64 {
        self.file_len / PAGE_SIZE as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_file(path: &Path, pages: &[Page]) {
        let mut file = File::create(path).unwrap();
        for page in pages {
            file.write_all(page.as_slice()).unwrap();
        }
    }

    fn header() -> Page {
        let mut page = Page::new();
        let data = page.as_mut_slice();
        data[0..2].copy_from_slice(&6u16.to_le_bytes());
        data[4..8].copy_from_slice(&1024u32.to_le_bytes());
        data[12..14].copy_from_slice(&18u16.to_le_bytes());
        data[14..16].copy_from_slice(&10u16.to_le_bytes());
        data[18..20].copy_from_slice(&40u16.to_le_bytes());
        page
    }

    #[test]
    fn test_open_nonexistent_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.ntx");

        match DiskManager::open(&path) {
            Err(Error::Io { op, .. }) => assert_eq!(op, "open"),
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_open_too_short() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("short.ntx");
        write_file(&path, &[header()]);

        assert!(DiskManager::open(&path).unwrap_err().is_corrupt_index());
    }

    #[test]
    fn test_open_not_page_multiple() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ragged.ntx");
        write_file(&path, &[header(), Page::new()]);
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(&[0u8; 10]).unwrap();

        assert!(DiskManager::open(&path).unwrap_err().is_corrupt_index());
    }

    #[test]
    fn test_read_root_and_page() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("names.ntx");

        let mut tree_page = Page::new();
        tree_page.as_mut_slice()[0] = 0x42;
        write_file(&path, &[header(), tree_page]);

        let mut dm = DiskManager::open(&path).unwrap();
        assert_eq!(dm.file_len(), 2048);
        assert_eq!(dm.page_count(), 2);

        let root = dm.read_root(&IndexConfig::default()).unwrap();
        assert_eq!(root.root, PageOffset::new(1024));

        let page = dm.read_page(root.root).unwrap();
        assert_eq!(page.as_slice()[0], 0x42);
    }

    #[test]
    fn test_read_unaligned_page() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("names.ntx");
        write_file(&path, &[header(), Page::new()]);

        let mut dm = DiskManager::open(&path).unwrap();
        assert!(dm.read_page(PageOffset::new(1000)).unwrap_err().is_corrupt_index());
    }

    #[test]
    fn test_read_past_end() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("names.ntx");
        write_file(&path, &[header(), Page::new()]);

        let mut dm = DiskManager::open(&path).unwrap();
        match dm.read_page(PageOffset::new(4096)) {
            Err(Error::Io { op, .. }) => assert_eq!(op, "fetch_page"),
            _ => panic!("Expected Io error on short read"),
        }
    }
}
