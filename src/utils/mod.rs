//! Shared helpers.
//!
//! - [`timestamp`] - The `yyyy-MM-dd HH:mm:ss` wire format used at every boundary

pub mod timestamp;
