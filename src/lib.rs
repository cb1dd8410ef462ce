//! dbfntx - Read access to DBF tables and their NTX B-tree indexes.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            dbfntx                               │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                Table Reader (table/)                     │   │
//! │  │   header + fields → record buffer → hide deleted        │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                   ↓ record numbers ↑                            │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                Navigator (index/)                        │   │
//! │  │     top | bottom | next | prev | find + order check     │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                Page Cache (buffer/)                      │   │
//! │  │   offset → parsed page, parent links, statistics        │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                Storage Layer (storage/)                  │   │
//! │  │        DiskManager + Page + IndexRoot + IndexPage       │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (PageOffset, RecNo, config)
//! - [`error`] - The crate error type
//! - [`storage`] - Index file I/O and page formats
//! - [`buffer`] - Page cache and its statistics
//! - [`index`] - B-tree navigation and key comparison
//! - [`table`] - Table records and fields
//!
//! # Quick Start
//! ```no_run
//! use dbfntx::{FindState, Table};
//!
//! let mut table = Table::open("customer.dbf")?;
//! table.attach_index("custname.ntx")?;
//!
//! if table.find(b"SMITH")? == FindState::Found {
//!     println!("{:?}", table.field_str("NAME")?);
//! }
//!
//! let mut ok = table.top()?;
//! while ok {
//!     println!("{:?}", table.current());
//!     ok = table.next()?;
//! }
//! # Ok::<(), dbfntx::Error>(())
//! ```

pub mod buffer;
pub mod common;
pub mod error;
pub mod index;
pub mod storage;
pub mod table;

// Re-export commonly used items at crate root for convenience
pub use common::config::PAGE_SIZE;
pub use common::{IndexConfig, PageOffset, RecNo, TableConfig};
pub use error::{Error, Result};

pub use buffer::{PageCache, PageCacheStats, StatsSnapshot};
pub use index::{Found, Navigator};
pub use storage::page::{IndexPage, IndexRoot, Page};
pub use storage::DiskManager;
pub use table::{Field, FindState, Table, TableHeader};
