//! Cache module for storing raw telemetry responses on disk
//!
//! The cache is an opaque byte store keyed by cook id. Freshness is read from
//! the file's modification time and compared against the refresh interval.

mod manager;

pub use manager::{is_stale, CacheManager, CachedData};
