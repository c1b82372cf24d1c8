//! Core business entities.
//!
//! - [`Hit`] / [`NewHit`] - one recorded request observation
//! - [`ViewStats`] - per-`(application, uri)` hit count

pub mod hit;
pub mod view_stats;

pub use hit::{Hit, NewHit};
pub use view_stats::ViewStats;
