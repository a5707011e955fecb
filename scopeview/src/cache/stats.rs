//! Tile cache statistics.

use std::fmt;

use serde::Serialize;

/// Point-in-time snapshot of tile cache counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that sampled a new tile.
    pub misses: u64,
    /// Tiles dropped to stay within the byte budget.
    pub evictions: u64,
    pub entry_count: u64,
    pub size_bytes: u64,
    pub max_size_bytes: u64,
}

impl CacheStats {
    /// Fraction of lookups served from cache, 0.0 when nothing was looked up.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0.0;
        }
        self.hits as f64 / total as f64
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tiles, {} / {} bytes, {} hits, {} misses, {} evictions",
            self.entry_count, self.size_bytes, self.max_size_bytes, self.hits, self.misses, self.evictions
        )
    }
}
