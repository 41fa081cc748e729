//! Cache Statistics Module
//!
//! Tracks how often cached responses saved a backend round-trip.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache effectiveness.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that fell through to the backend (absent or expired)
    pub misses: u64,
    /// Entries dropped because their TTL elapsed
    pub expirations: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Adds a batch of entries that were found stale, by lookup or sweep.
    pub fn record_expirations(&mut self, count: usize) {
        self.expirations = self.expirations.saturating_add(count as u64);
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
