//! Page types and layout.
//!
//! This module contains:
//! - [`Page`] - The raw 1KB block read from disk
//! - [`IndexRoot`] - The header page at offset 0
//! - [`IndexPage`] - A parsed tree page with its items and sentinel slot

mod index_page;
mod index_root;
#[allow(clippy::module_inception)]
mod page;

pub use index_page::{IndexPage, Item, Slot};
pub use index_root::{FieldWidth, IndexRoot};
pub use page::Page;
