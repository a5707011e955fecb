//! Coordinate types for the tile pyramid.

use std::fmt;
use std::ops::Range;

use serde::Serialize;

/// Deepest zoom level representable for `u32` image dimensions.
pub const MAX_ZOOM: u8 = 32;

/// Identifies one decimated tile of the pyramid.
///
/// Ordering is zoom-major, then row, then col, which gives a stable
/// iteration order for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TileCoord {
    /// Zoom level (sampling stride is `2^zoom`)
    pub zoom: u8,
    /// Tile row (y axis)
    pub row: u32,
    /// Tile column (x axis)
    pub col: u32,
}

impl TileCoord {
    /// Create a new tile coordinate.
    pub fn new(zoom: u8, row: u32, col: u32) -> Self {
        Self { zoom, row, col }
    }

    /// Sampling stride in source pixels.
    #[inline]
    pub fn stride(&self) -> u64 {
        1u64 << self.zoom
    }

    /// Source-pixel origin `(x, y)` of this tile's top-left corner.
    #[inline]
    pub fn origin(&self, tile_size: u32) -> (u64, u64) {
        let span = u64::from(tile_size) << self.zoom;
        (u64::from(self.col) * span, u64::from(self.row) * span)
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "z{}/r{}/c{}", self.zoom, self.row, self.col)
    }
}

/// Half-open tile index window `[rows) × [cols)` at a single zoom level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileBounds {
    pub zoom: u8,
    pub rows: Range<u32>,
    pub cols: Range<u32>,
}

impl TileBounds {
    pub fn new(zoom: u8, rows: Range<u32>, cols: Range<u32>) -> Self {
        Self { zoom, rows, cols }
    }

    /// Whether `coord` is at this zoom and inside the window.
    pub fn contains(&self, coord: &TileCoord) -> bool {
        coord.zoom == self.zoom && self.rows.contains(&coord.row) && self.cols.contains(&coord.col)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.cols.is_empty()
    }

    /// Number of tiles in the window.
    pub fn len(&self) -> usize {
        self.rows.len() * self.cols.len()
    }

    /// Iterates the window row by row.
    pub fn coords(&self) -> impl Iterator<Item = TileCoord> + '_ {
        let zoom = self.zoom;
        self.rows
            .clone()
            .flat_map(move |row| self.cols.clone().map(move |col| TileCoord::new(zoom, row, col)))
    }
}

/// Image dimensions plus tile size: everything the index arithmetic needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PyramidGeometry {
    pub width: u32,
    pub height: u32,
    pub tile_size: u32,
}

impl PyramidGeometry {
    pub fn new(width: u32, height: u32, tile_size: u32) -> Self {
        Self {
            width,
            height,
            tile_size,
        }
    }

    /// Coarsest zoom level; see [`super::max_zoom`].
    pub fn max_zoom(&self) -> u8 {
        super::max_zoom(self.width, self.height, self.tile_size)
    }

    /// `(Nx_tiles, Ny_tiles)` at zoom `z`.
    pub fn tiles_at_zoom(&self, zoom: u8) -> (u32, u32) {
        super::tiles_at_zoom(self.width, self.height, zoom, self.tile_size)
    }

    /// Every tile at zoom `z`.
    pub fn level(&self, zoom: u8) -> TileBounds {
        let (nx, ny) = self.tiles_at_zoom(zoom);
        TileBounds::new(zoom, 0..ny, 0..nx)
    }

    /// Tile window covering the source-space rectangle spanned by two points.
    pub fn window(&self, p0: (f64, f64), p1: (f64, f64), zoom: u8) -> TileBounds {
        super::tile_window(p0, p1, zoom, self.tile_size, self.tiles_at_zoom(zoom))
    }
}
