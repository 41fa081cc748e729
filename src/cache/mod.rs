//! Cache Module
//!
//! In-memory response cache with TTL expiration and deterministic keys.

mod entry;
mod key;
mod stats;
mod store;


use std::time::Duration;

// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry};
pub use key::{cache_key_for, generate_cache_key, query_pairs};
pub use stats::CacheStats;
pub use store::{ResponseCache, SharedCache};

// == Public Constants ==
/// TTL used when a caller does not pick one
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Interval of the background sweep
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(5 * 60);
