//! Pyramid tiles.
//!
//! A [`Tile`] is a fixed `tile_size × tile_size` sub-image sampled from the
//! source raster at stride `2^zoom`. Its buffer is built once and never
//! changes; where the sampled region runs past the image edge the remainder
//! is padded with the fill value.
//!
//! ```text
//! zoom 0: rows  r·T     .. (r+1)·T       step 1
//! zoom 1: rows  r·T·2   .. (r+1)·T·2     step 2
//! zoom z: rows  r·T·2^z .. (r+1)·T·2^z   step 2^z
//! ```
//!
//! [`TileSampler`] is the seam between the viewer and tile construction so
//! tests can count or fake sampling.

mod placement;
mod sampler;

pub use placement::tile_placement;
pub use sampler::{StridedSampler, TileSampler};

use crate::coord::TileCoord;
use crate::raster::{Raster, Sample};

/// A materialized pyramid tile.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile<T: Sample> {
    coord: TileCoord,
    data: Raster<T>,
    valid: (u32, u32),
}

impl<T: Sample> Tile<T> {
    /// Wrap a fully populated buffer.
    pub fn new(coord: TileCoord, data: Raster<T>) -> Self {
        let valid = (data.width(), data.height());
        Self { coord, data, valid }
    }

    /// Wrap a buffer whose top-left `valid_width × valid_height` region holds
    /// source samples and whose remainder is padding.
    pub fn with_valid_size(coord: TileCoord, data: Raster<T>, valid_width: u32, valid_height: u32) -> Self {
        let valid = (valid_width.min(data.width()), valid_height.min(data.height()));
        Self { coord, data, valid }
    }

    pub fn coord(&self) -> TileCoord {
        self.coord
    }

    /// The tile's pixel buffer (`tile_size × tile_size × channels`).
    pub fn data(&self) -> &Raster<T> {
        &self.data
    }

    /// `(width, height)` of the region sampled from the source.
    pub fn valid_size(&self) -> (u32, u32) {
        self.valid
    }

    /// Samples from the source region only, skipping edge padding.
    pub fn valid_samples(&self) -> impl Iterator<Item = T> + '_ {
        let (valid_width, valid_height) = self.valid;
        let ch = self.data.channels() as usize;
        let row_len = self.data.width() as usize * ch;
        let valid_len = valid_width as usize * ch;
        self.data
            .as_slice()
            .chunks_exact(row_len)
            .take(valid_height as usize)
            .flat_map(move |row| row[..valid_len].iter().copied())
    }

    /// Buffer size in bytes, used to weight cache entries.
    pub fn size_bytes(&self) -> usize {
        std::mem::size_of_val(self.data.as_slice())
    }
}

/// Sample tile `coord` from `source`.
///
/// Pixel `(tx, ty)` of the tile is source pixel
/// `(col·T·2^z + tx·2^z, row·T·2^z + ty·2^z)`; samples past the image edge
/// keep `fill`. No interpolation.
pub fn sample_tile<T: Sample>(source: &Raster<T>, coord: TileCoord, tile_size: u32, fill: T) -> Tile<T> {
    let channels = source.channels();
    let mut data = Raster::filled(tile_size, tile_size, channels, fill);

    let stride = coord.stride();
    let (x0, y0) = coord.origin(tile_size);
    let width = u64::from(source.width());
    let height = u64::from(source.height());

    // Number of in-range samples along each axis: ceil((extent - origin) / stride), capped at T
    let in_range = |origin: u64, extent: u64| -> usize {
        if origin >= extent {
            0
        } else {
            (extent - origin).div_ceil(stride).min(u64::from(tile_size)) as usize
        }
    };
    let cols = in_range(x0, width);
    let rows = in_range(y0, height);

    let ch = channels as usize;
    let tile_row_len = tile_size as usize * ch;
    let src = source.as_slice();
    let dst = data.as_mut_slice();
    let src_row_len = width as usize * ch;

    for ty in 0..rows {
        let sy = (y0 + ty as u64 * stride) as usize;
        let src_row = &src[sy * src_row_len..(sy + 1) * src_row_len];
        let dst_row = &mut dst[ty * tile_row_len..(ty + 1) * tile_row_len];
        for tx in 0..cols {
            let sx = (x0 + tx as u64 * stride) as usize;
            dst_row[tx * ch..(tx + 1) * ch].copy_from_slice(&src_row[sx * ch..(sx + 1) * ch]);
        }
    }

    Tile::with_valid_size(coord, data, cols as u32, rows as u32)
}
