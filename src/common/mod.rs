//! Common types and utilities shared across dbfntx.
//!
//! This module contains fundamental primitives used throughout the codebase:
//! - Format constants and open options
//! - Identifiers (PageOffset, RecNo)

pub mod config;
mod page_offset;

pub use config::{IndexConfig, TableConfig};
pub use crate::error::{Error, Result};
pub use page_offset::{PageOffset, RecNo};
