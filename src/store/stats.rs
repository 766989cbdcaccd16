//! Store Statistics Module
//!
//! Tracks read hits and misses plus lazy expirations.

use serde::Serialize;

// == Store Stats ==
/// Store read metrics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StoreStats {
    /// Reads that found a live value
    pub hits: u64,
    /// Reads of absent or expired keys
    pub misses: u64,
    /// Entries removed because their TTL elapsed
    pub expirations: u64,
    /// Current number of keys in the store
    pub total_keys: usize,
}

impl StoreStats {
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if nothing was read yet.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Counts a read that returned a live value.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    /// Counts a read of an absent key, including one that just expired.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Counts an entry dropped on access because its TTL elapsed.
    pub fn record_expiration(&mut self) {
        self.expirations += 1;
    }

    /// Snapshots the key count; filled in when stats are read.
    pub fn set_total_keys(&mut self, count: usize) {
        self.total_keys = count;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = StoreStats::new();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.expirations, 0);
        assert_eq!(stats.total_keys, 0);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        assert_eq!(StoreStats::new().hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut stats = StoreStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.hit_rate(), 0.75);
    }

    #[test]
    fn test_serializes_fields() {
        let mut stats = StoreStats::new();
        stats.record_expiration();
        stats.set_total_keys(3);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["expirations"], 1);
        assert_eq!(json["total_keys"], 3);
    }
}
