//! In-memory plot surface that records what the viewer does to it.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::coord::TileCoord;
use crate::raster::Sample;
use crate::surface::{Levels, LookupTable, PlotSurface, RenderOptions};
use crate::tile::Tile;
use crate::transform::Affine;

/// One operation applied to the surface, in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    Add { handle: u64, coord: TileCoord },
    Remove { handle: u64 },
    Transform { handle: u64 },
    ZValue { handle: u64, z_value: i32 },
    LookupTable { handle: u64 },
    Levels { handle: u64, levels: Levels },
}

/// State of an attached item.
#[derive(Debug, Clone)]
pub struct RecordedItem<T: Sample> {
    pub tile: Arc<Tile<T>>,
    pub transform: Affine,
    pub z_value: i32,
    pub options: RenderOptions,
}

/// Headless [`PlotSurface`] backed by a map of attached items.
#[derive(Debug)]
pub struct RecordingSurface<T: Sample> {
    items: BTreeMap<u64, RecordedItem<T>>,
    ops: Vec<SurfaceOp>,
    next_handle: u64,
    pixel_size: (f64, f64),
}

impl<T: Sample> RecordingSurface<T> {
    /// Create a surface reporting `pixel_size` world units per device pixel.
    pub fn new(pixel_size: (f64, f64)) -> Self {
        Self {
            items: BTreeMap::new(),
            ops: Vec::new(),
            next_handle: 1,
            pixel_size,
        }
    }

    pub fn set_pixel_size(&mut self, pixel_size: (f64, f64)) {
        self.pixel_size = pixel_size;
    }

    pub fn item(&self, handle: u64) -> Option<&RecordedItem<T>> {
        self.items.get(&handle)
    }

    /// Attached items in handle order.
    pub fn items(&self) -> impl Iterator<Item = (&u64, &RecordedItem<T>)> {
        self.items.iter()
    }

    /// The attached item showing `coord`, if any.
    pub fn item_for(&self, coord: TileCoord) -> Option<&RecordedItem<T>> {
        self.items.values().find(|item| item.tile.coord() == coord)
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Attached items sorted by stacking priority, bottom first.
    pub fn draw_order(&self) -> Vec<TileCoord> {
        let mut items: Vec<_> = self.items.values().collect();
        items.sort_by_key(|item| (item.z_value, item.tile.coord()));
        items.iter().map(|item| item.tile.coord()).collect()
    }

    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    /// Count of add operations since the last `clear_ops`.
    pub fn add_count(&self) -> usize {
        self.ops.iter().filter(|op| matches!(op, SurfaceOp::Add { .. })).count()
    }

    /// Count of remove operations since the last `clear_ops`.
    pub fn remove_count(&self) -> usize {
        self.ops.iter().filter(|op| matches!(op, SurfaceOp::Remove { .. })).count()
    }
}

impl<T: Sample> PlotSurface<T> for RecordingSurface<T> {
    type Handle = u64;

    fn add_item(&mut self, tile: &Arc<Tile<T>>, options: &RenderOptions) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.items.insert(
            handle,
            RecordedItem {
                tile: Arc::clone(tile),
                transform: Affine::IDENTITY,
                z_value: 0,
                options: options.clone(),
            },
        );
        self.ops.push(SurfaceOp::Add {
            handle,
            coord: tile.coord(),
        });
        handle
    }

    fn remove_item(&mut self, handle: u64) {
        if self.items.remove(&handle).is_some() {
            self.ops.push(SurfaceOp::Remove { handle });
        }
    }

    fn set_item_transform(&mut self, handle: u64, transform: Affine) {
        if let Some(item) = self.items.get_mut(&handle) {
            item.transform = transform;
            self.ops.push(SurfaceOp::Transform { handle });
        }
    }

    fn set_item_z_value(&mut self, handle: u64, z_value: i32) {
        if let Some(item) = self.items.get_mut(&handle) {
            item.z_value = z_value;
            self.ops.push(SurfaceOp::ZValue { handle, z_value });
        }
    }

    fn set_item_lookup_table(&mut self, handle: u64, lut: &LookupTable) {
        if let Some(item) = self.items.get_mut(&handle) {
            item.options.lut = Some(lut.clone());
            self.ops.push(SurfaceOp::LookupTable { handle });
        }
    }

    fn set_item_levels(&mut self, handle: u64, levels: Levels) {
        if let Some(item) = self.items.get_mut(&handle) {
            item.options.levels = Some(levels);
            self.ops.push(SurfaceOp::Levels { handle, levels });
        }
    }

    fn view_pixel_size(&self) -> (f64, f64) {
        self.pixel_size
    }
}
