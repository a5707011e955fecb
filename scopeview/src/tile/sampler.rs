//! TileSampler trait for abstracting tile construction.

use crate::coord::TileCoord;
use crate::raster::{Raster, Sample};
use crate::tile::{sample_tile, Tile};

/// Builds the pixel content of a tile from the source raster.
///
/// Implementations must be thread-safe (`Send + Sync`) since a whole zoom
/// level can be prewarmed in parallel.
pub trait TileSampler<T: Sample>: Send + Sync {
    /// Build tile `coord` of `tile_size × tile_size`, padding with `fill`.
    fn sample(&self, source: &Raster<T>, coord: TileCoord, tile_size: u32, fill: T) -> Tile<T>;
}

/// Exact strided sampling with no interpolation.
#[derive(Debug, Default, Clone, Copy)]
pub struct StridedSampler;

impl<T: Sample> TileSampler<T> for StridedSampler {
    fn sample(&self, source: &Raster<T>, coord: TileCoord, tile_size: u32, fill: T) -> Tile<T> {
        sample_tile(source, coord, tile_size, fill)
    }
}
