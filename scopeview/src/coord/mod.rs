//! Pyramid coordinate module
//!
//! Provides the integer geometry of a power-of-two image pyramid: tile
//! coordinates, the coarsest useful zoom level, tile counts per level, and
//! the clamped tile index window covering a region of source pixel space.
//!
//! # Conventions
//!
//! - Zoom `z` samples the source at stride `2^z`; `z = 0` is full resolution.
//! - `row` indexes the y axis (image height), `col` the x axis (image width).
//! - A tile at `(z, row, col)` covers source pixels
//!   `[row·T·2^z, (row+1)·T·2^z)` × `[col·T·2^z, (col+1)·T·2^z)`.

mod types;

pub use types::{PyramidGeometry, TileBounds, TileCoord, MAX_ZOOM};

/// Returns the coarsest zoom level at which the largest image dimension
/// fits inside a single tile.
///
/// This is `ceil(log2(max(width, height) / tile_size))`, floored at 0,
/// computed with integers: the smallest `z` with `tile_size · 2^z >= max`.
///
/// # Arguments
///
/// * `width` - Source width in pixels (Nx)
/// * `height` - Source height in pixels (Ny)
/// * `tile_size` - Tile edge length in pixels (must be non-zero)
#[inline]
pub fn max_zoom(width: u32, height: u32, tile_size: u32) -> u8 {
    debug_assert!(tile_size > 0, "tile_size must be positive");
    let largest = u64::from(width.max(height));
    let mut span = u64::from(tile_size.max(1));
    let mut zoom = 0u8;
    while span < largest && zoom < MAX_ZOOM {
        span <<= 1;
        zoom += 1;
    }
    zoom
}

/// Number of tiles covering one axis of `extent` pixels at zoom `z`.
#[inline]
pub fn tiles_along(extent: u32, zoom: u8, tile_size: u32) -> u32 {
    let span = tile_span(zoom, tile_size);
    u64::from(extent).div_ceil(span) as u32
}

/// Returns `(Nx_tiles, Ny_tiles)`, the number of tile columns and rows
/// covering the image at zoom `z`.
#[inline]
pub fn tiles_at_zoom(width: u32, height: u32, zoom: u8, tile_size: u32) -> (u32, u32) {
    (
        tiles_along(width, zoom, tile_size),
        tiles_along(height, zoom, tile_size),
    )
}

/// Source pixels covered by one tile edge at zoom `z` (`tile_size · 2^z`).
#[inline]
pub fn tile_span(zoom: u8, tile_size: u32) -> u64 {
    u64::from(tile_size) << zoom
}

/// Computes the half-open tile index window covering the source-space
/// rectangle spanned by two points, clamped to the tiles that exist.
///
/// The points may arrive in any order (flipped transforms swap them).
/// Non-finite input yields an empty window.
pub fn tile_window(
    p0: (f64, f64),
    p1: (f64, f64),
    zoom: u8,
    tile_size: u32,
    tiles: (u32, u32),
) -> TileBounds {
    let (nx_tiles, ny_tiles) = tiles;
    let span = tile_span(zoom, tile_size) as f64;

    let axis = |a: f64, b: f64, limit: u32| -> (u32, u32) {
        if !a.is_finite() || !b.is_finite() {
            return (0, 0);
        }
        let lo = (a.min(b) / span).floor().max(0.0);
        let hi = (a.max(b) / span).ceil().min(f64::from(limit));
        if hi <= lo {
            return (0, 0);
        }
        (lo as u32, hi as u32)
    };

    let (col0, col1) = axis(p0.0, p1.0, nx_tiles);
    let (row0, row1) = axis(p0.1, p1.1, ny_tiles);

    TileBounds::new(zoom, row0..row1, col0..col1)
}
