//! Index navigation.
//!
//! - [`Navigator`] - Ordered walk and key search over one index file
//! - [`key`] - Byte-wise key comparison

pub mod key;
mod navigator;

pub use navigator::{Found, Navigator, Position};
