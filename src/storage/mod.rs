//! Storage layer - disk I/O and page formats.
//!
//! This module handles the index file on disk:
//! - [`DiskManager`] - Low-level file I/O
//! - [`page`] - Raw pages, the header page and parsed tree pages

mod disk_manager;
pub mod page;

pub use disk_manager::DiskManager;
