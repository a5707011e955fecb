//! Configuration for the pyramid viewer.

use crate::cache::DEFAULT_CACHE_SIZE_BYTES;

/// Default tile edge length in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 256;

/// Default stacking priority of full-resolution tiles.
///
/// A tile at zoom `z` is drawn at `base_priority - z`.
pub const DEFAULT_BASE_PRIORITY: i32 = 100;

/// Configuration for a [`super::ZoomableMap`].
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    /// Tile edge length in pixels.
    pub tile_size: u32,

    /// Stacking priority of zoom-0 tiles.
    pub base_priority: i32,

    /// Value used to pad partial edge tiles; `None` pads with zero.
    pub fill: Option<f64>,

    /// Tile cache budget in bytes.
    pub cache_size_bytes: u64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            base_priority: DEFAULT_BASE_PRIORITY,
            fill: None,
            cache_size_bytes: DEFAULT_CACHE_SIZE_BYTES,
        }
    }
}

impl ViewerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tile edge length.
    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size;
        self
    }

    /// Set the stacking priority of zoom-0 tiles.
    pub fn with_base_priority(mut self, base_priority: i32) -> Self {
        self.base_priority = base_priority;
        self
    }

    /// Set the padding value for partial tiles.
    pub fn with_fill(mut self, fill: f64) -> Self {
        self.fill = Some(fill);
        self
    }

    /// Set the tile cache budget.
    pub fn with_cache_size(mut self, bytes: u64) -> Self {
        self.cache_size_bytes = bytes;
        self
    }
}
