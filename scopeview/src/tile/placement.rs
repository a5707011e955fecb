//! Tile placement in world space.

use crate::coord::TileCoord;
use crate::transform::Affine;

/// World transform for a tile's image item.
///
/// The tile's own transform scales tile pixels by `2^zoom` and translates
/// them to the tile origin `(col, row)·2^zoom·T` in source pixel space; the
/// shared view transform is applied after it.
pub fn tile_placement(coord: TileCoord, tile_size: u32, view: &Affine) -> Affine {
    let scale = coord.stride() as f64;
    let (x, y) = coord.origin(tile_size);
    Affine::scale_translate(scale, scale, x as f64, y as f64).then(view)
}
