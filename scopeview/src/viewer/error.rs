//! Error types for the pyramid viewer.

use thiserror::Error;

use crate::coord::TileCoord;
use crate::raster::RasterError;

/// Errors raised by [`super::ZoomableMap`].
///
/// Construction errors are configuration mistakes and are not recoverable;
/// the remaining variants reject out-of-range tile requests.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ViewerError {
    /// Tile size must be a positive number of pixels.
    #[error("Invalid tile size {0}: must be positive")]
    InvalidTileSize(u32),

    /// The source image has no pixels.
    #[error("Source image is empty ({width}×{height})")]
    EmptyImage { width: u32, height: u32 },

    /// Requested zoom level is coarser than the pyramid's top.
    #[error("Zoom level {zoom} out of range (max: {max})")]
    ZoomOutOfRange { zoom: u8, max: u8 },

    /// Requested tile lies outside the grid at its zoom level.
    #[error("Tile {coord} outside the {cols}×{rows} grid")]
    TileOutOfRange { coord: TileCoord, cols: u32, rows: u32 },

    /// The source raster could not be built.
    #[error("Invalid source raster: {0}")]
    Raster(#[from] RasterError),
}
