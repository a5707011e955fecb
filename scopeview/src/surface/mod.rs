//! Render surface abstraction.
//!
//! The viewer never draws. It attaches image items to a [`PlotSurface`]
//! (a plot canvas in a GUI toolkit) and updates them in place through the
//! handle the surface returns.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐   add / remove / transform / z / lut / levels
//! │     ZoomableMap      │ ─────────────────────────────────────────────►┌─────────────┐
//! │  (visible tile set)  │ ◄──────────────── view_pixel_size ─────────── │ PlotSurface │
//! └──────────────────────┘                                               └──────┬──────┘
//!                                                                               │
//!                                                                   ┌───────────┴──────────┐
//!                                                                   ▼                      ▼
//!                                                           GUI plot adapter      RecordingSurface
//!                                                                                 (tests, headless)
//! ```

mod options;
mod recording;

pub use options::{Levels, LookupTable, RenderOptions};
pub use recording::{RecordedItem, RecordingSurface, SurfaceOp};

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use crate::raster::Sample;
use crate::tile::Tile;
use crate::transform::Affine;

/// A plot canvas that can host tile image items.
///
/// # Implementors
///
/// - [`RecordingSurface`] - In-memory surface recording every operation
pub trait PlotSurface<T: Sample> {
    /// Identifies an attached image item.
    type Handle: Copy + Eq + Hash + Debug;

    /// Attach an image item built from `tile`'s buffer with the given
    /// rendering options.
    fn add_item(&mut self, tile: &Arc<Tile<T>>, options: &RenderOptions) -> Self::Handle;

    /// Detach an image item. Unknown handles are ignored.
    fn remove_item(&mut self, handle: Self::Handle);

    /// Set the item's image-to-world transform.
    fn set_item_transform(&mut self, handle: Self::Handle, transform: Affine);

    /// Set the item's stacking priority; higher draws on top.
    fn set_item_z_value(&mut self, handle: Self::Handle, z_value: i32);

    fn set_item_lookup_table(&mut self, handle: Self::Handle, lut: &LookupTable);

    fn set_item_levels(&mut self, handle: Self::Handle, levels: Levels);

    /// World units per device pixel along x and y.
    fn view_pixel_size(&self) -> (f64, f64);
}
