//! Bounded in-memory tile cache using moka.
//!
//! Tiles are created on first access and kept until the byte budget is
//! exceeded, at which point the least recently used tiles are evicted. Values
//! are `Arc<Tile<T>>`, so a tile that is still attached to the render
//! surface stays alive after eviction; it is only re-sampled if requested
//! again once its last holder drops it.
//!
//! Concurrent lookups of the same missing coordinate run the sampler once;
//! the other callers wait for and share its result.

mod stats;

pub use stats::CacheStats;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use moka::notification::RemovalCause;
use moka::policy::EvictionPolicy;
use moka::sync::Cache;

use crate::coord::TileCoord;
use crate::raster::Sample;
use crate::tile::Tile;

/// Default tile cache budget: 512 MiB.
pub const DEFAULT_CACHE_SIZE_BYTES: u64 = 512 * 1024 * 1024;

/// Byte-bounded cache of pyramid tiles keyed by coordinate.
pub struct TileCache<T: Sample> {
    cache: Cache<TileCoord, Arc<Tile<T>>>,
    max_size_bytes: u64,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: Arc<AtomicU64>,
}

impl<T: Sample> TileCache<T> {
    /// Create a cache holding at most `max_size_bytes` of tile data.
    pub fn new(max_size_bytes: u64) -> Self {
        let evictions = Arc::new(AtomicU64::new(0));
        let listener_evictions = Arc::clone(&evictions);

        let cache = Cache::builder()
            // Weight each entry by its pixel buffer size
            .weigher(|_coord: &TileCoord, tile: &Arc<Tile<T>>| -> u32 {
                tile.size_bytes().min(u32::MAX as usize) as u32
            })
            .max_capacity(max_size_bytes)
            // Newly sampled tiles are always admitted
            .eviction_policy(EvictionPolicy::lru())
            .eviction_listener(move |_coord, _tile, cause| {
                if cause == RemovalCause::Size {
                    listener_evictions.fetch_add(1, Ordering::Relaxed);
                }
            })
            .build();

        Self {
            cache,
            max_size_bytes,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions,
        }
    }

    /// Return the cached tile for `coord`, building it with `create` if absent.
    ///
    /// `create` runs at most once per resident key, even under concurrent
    /// calls for the same coordinate.
    pub fn get_or_create(&self, coord: TileCoord, create: impl FnOnce() -> Tile<T>) -> Arc<Tile<T>> {
        let mut created = false;
        let tile = self.cache.get_with(coord, || {
            created = true;
            Arc::new(create())
        });
        if created {
            self.misses.fetch_add(1, Ordering::Relaxed);
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        tile
    }

    /// Look up a tile without creating it.
    pub fn get(&self, coord: &TileCoord) -> Option<Arc<Tile<T>>> {
        self.cache.get(coord)
    }

    pub fn contains(&self, coord: &TileCoord) -> bool {
        self.cache.contains_key(coord)
    }

    /// Number of resident tiles (after pending maintenance).
    pub fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }

    /// Resident tile bytes (after pending maintenance).
    pub fn size_bytes(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.weighted_size()
    }

    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_bytes
    }

    /// Drop every cached tile.
    pub fn clear(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            entry_count: self.entry_count(),
            size_bytes: self.size_bytes(),
            max_size_bytes: self.max_size_bytes,
        }
    }
}
