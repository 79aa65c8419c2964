//! In-memory response cache.
//!
//! Maps a `(url, selector, raw)` key to a serialized JSON payload and the
//! instant it was produced. It supports:
//!
//! - Capacity bound with least-recently-used eviction
//! - Fixed TTL enforced on lookup and by periodic sweeps
//! - Concurrent access from many request tasks

pub mod key;
pub mod store;

pub use key::CacheKey;
pub use store::{CacheEntry, ResponseCache};
