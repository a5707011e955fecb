//! The zoomable tiled image viewer.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use rayon::prelude::*;
use tracing::{debug, info, trace};

use crate::cache::{CacheStats, TileCache};
use crate::coord::{PyramidGeometry, TileBounds, TileCoord};
use crate::raster::{Raster, Sample};
use crate::surface::{Levels, LookupTable, PlotSurface};
use crate::tile::{tile_placement, StridedSampler, Tile, TileSampler};
use crate::transform::Affine;
use crate::viewer::histogram::Histogram;
use crate::viewer::state::ViewState;
use crate::viewer::viewport::{plan_viewport, DegenerateReason, ViewRange};
use crate::viewer::{ViewerConfig, ViewerError};

/// Summary of an applied viewport update.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportUpdate {
    /// Source pixels per device pixel.
    pub zoom_factor: f64,
    /// Active zoom level.
    pub zoom: u8,
    /// Tile window shown at `zoom`.
    pub bounds: TileBounds,
    /// Tiles attached by this update.
    pub shown: usize,
    /// Tiles detached by this update.
    pub hidden: usize,
    /// Visible tiles after the update, fallback included.
    pub visible: usize,
}

/// What happened to a viewport change.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Applied(ViewportUpdate),
    /// Another update held the guard; this one was dropped.
    Skipped,
    /// Geometry made the zoom factor undefined; nothing changed.
    Degenerate(DegenerateReason),
}

impl UpdateOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, UpdateOutcome::Applied(_))
    }

    pub fn update(&self) -> Option<&ViewportUpdate> {
        match self {
            UpdateOutcome::Applied(update) => Some(update),
            _ => None,
        }
    }
}

/// A tile attached to the surface.
struct VisibleTile<T: Sample, H> {
    tile: Arc<Tile<T>>,
    handle: H,
}

/// State guarded by the viewport-update critical section.
struct Inner<T: Sample, S: PlotSurface<T>> {
    surface: S,
    state: ViewState,
    visible: HashMap<TileCoord, VisibleTile<T, S::Handle>>,
}

/// Tiled pan/zoom viewer over an in-memory raster.
///
/// Keeps a power-of-two pyramid of fixed-size tiles, creating tiles on
/// demand, and attaches to the surface exactly the tiles covering the
/// current viewport at one zoom level. The coarsest level stays attached
/// underneath as a fallback background.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use scopeview::raster::Raster;
/// use scopeview::surface::RecordingSurface;
/// use scopeview::viewer::{ViewRange, ViewerConfig, ZoomableMap};
///
/// let source = Arc::new(Raster::<u8>::filled(1000, 1000, 1, 7));
/// let surface = RecordingSurface::new((4.0, 4.0));
/// let map = ZoomableMap::new(source, surface, ViewerConfig::default()).unwrap();
///
/// let outcome = map.on_viewport_changed(ViewRange::new(0.0, 1000.0, 0.0, 1000.0));
/// assert_eq!(outcome.update().unwrap().zoom, 2);
/// assert_eq!(map.visible_coords().len(), 1);
/// ```
pub struct ZoomableMap<T: Sample, S: PlotSurface<T>> {
    pyramid: Pyramid<T>,
    base_priority: i32,
    inner: Mutex<Inner<T, S>>,
}

/// Source raster plus tile cache; shared across prewarm workers.
struct Pyramid<T: Sample> {
    source: Arc<Raster<T>>,
    geometry: PyramidGeometry,
    fill: T,
    cache: TileCache<T>,
    sampler: Arc<dyn TileSampler<T>>,
}

impl<T: Sample> Pyramid<T> {
    fn tile(&self, coord: TileCoord) -> Arc<Tile<T>> {
        self.cache.get_or_create(coord, || {
            trace!(%coord, "Sampling tile");
            self.sampler
                .sample(&self.source, coord, self.geometry.tile_size, self.fill)
        })
    }
}

impl<T: Sample, S: PlotSurface<T>> ZoomableMap<T, S> {
    /// Create a viewer with the strided sampler and an identity transform.
    ///
    /// The fallback tiles are attached immediately.
    ///
    /// # Errors
    ///
    /// Returns `ViewerError::InvalidTileSize` or `ViewerError::EmptyImage`.
    pub fn new(source: Arc<Raster<T>>, surface: S, config: ViewerConfig) -> Result<Self, ViewerError> {
        Self::with_sampler(source, surface, config, Arc::new(StridedSampler))
    }

    /// Create a viewer with a custom tile sampler.
    pub fn with_sampler(
        source: Arc<Raster<T>>,
        surface: S,
        config: ViewerConfig,
        sampler: Arc<dyn TileSampler<T>>,
    ) -> Result<Self, ViewerError> {
        if config.tile_size == 0 {
            return Err(ViewerError::InvalidTileSize(config.tile_size));
        }
        if source.width() == 0 || source.height() == 0 || source.is_empty() {
            return Err(ViewerError::EmptyImage {
                width: source.width(),
                height: source.height(),
            });
        }

        let geometry = PyramidGeometry::new(source.width(), source.height(), config.tile_size);
        let fill = config.fill.map(T::from_f64).unwrap_or_default();

        let map = Self {
            pyramid: Pyramid {
                source,
                geometry,
                fill,
                cache: TileCache::new(config.cache_size_bytes),
                sampler,
            },
            base_priority: config.base_priority,
            inner: Mutex::new(Inner {
                surface,
                state: ViewState::default(),
                visible: HashMap::new(),
            }),
        };

        {
            let mut inner = map.inner.lock();
            map.attach_fallback(&mut inner);
        }

        info!(
            width = geometry.width,
            height = geometry.height,
            tile_size = geometry.tile_size,
            max_zoom = geometry.max_zoom(),
            "Zoomable map created"
        );

        Ok(map)
    }

    pub fn source(&self) -> &Arc<Raster<T>> {
        &self.pyramid.source
    }

    pub fn geometry(&self) -> PyramidGeometry {
        self.pyramid.geometry
    }

    pub fn tile_size(&self) -> u32 {
        self.pyramid.geometry.tile_size
    }

    /// Coarsest zoom level: the whole image fits one tile.
    pub fn max_zoom(&self) -> u8 {
        self.pyramid.geometry.max_zoom()
    }

    /// `(Nx_tiles, Ny_tiles)` at zoom `z`.
    pub fn tiles_at_zoom(&self, zoom: u8) -> (u32, u32) {
        self.pyramid.geometry.tiles_at_zoom(zoom)
    }

    /// Return the tile at `coord`, sampling it on first access.
    ///
    /// # Errors
    ///
    /// Rejects zoom levels above `max_zoom()` and tiles outside the grid.
    pub fn get_tile(&self, coord: TileCoord) -> Result<Arc<Tile<T>>, ViewerError> {
        let max = self.max_zoom();
        if coord.zoom > max {
            return Err(ViewerError::ZoomOutOfRange {
                zoom: coord.zoom,
                max,
            });
        }
        let (cols, rows) = self.tiles_at_zoom(coord.zoom);
        if coord.row >= rows || coord.col >= cols {
            return Err(ViewerError::TileOutOfRange { coord, cols, rows });
        }
        Ok(self.fetch_tile(coord))
    }

    fn fetch_tile(&self, coord: TileCoord) -> Arc<Tile<T>> {
        self.pyramid.tile(coord)
    }

    /// Stacking priority of tiles at `zoom`; finer tiles draw on top.
    pub fn z_value(&self, zoom: u8) -> i32 {
        self.base_priority - i32::from(zoom)
    }

    /// Recompute the visible tile set for a new viewport.
    ///
    /// If another update is in progress this one is dropped and
    /// `UpdateOutcome::Skipped` is returned; the next change will catch up.
    pub fn on_viewport_changed(&self, range: ViewRange) -> UpdateOutcome {
        let Some(mut guard) = self.inner.try_lock() else {
            debug!(?range, "Viewport update in progress, dropping change");
            return UpdateOutcome::Skipped;
        };
        let inner = &mut *guard;

        let pixel_size = inner.surface.view_pixel_size();
        let plan = match plan_viewport(&range, pixel_size, &inner.state.transform, &self.pyramid.geometry) {
            Ok(plan) => plan,
            Err(reason) => {
                debug!(%reason, ?range, "Ignoring degenerate viewport");
                return UpdateOutcome::Degenerate(reason);
            }
        };

        let max_zoom = self.max_zoom();

        // Detach tiles at the wrong zoom or outside the window; fallback tiles stay
        let stale: Vec<TileCoord> = inner
            .visible
            .keys()
            .filter(|coord| coord.zoom != max_zoom && !plan.bounds.contains(coord))
            .copied()
            .collect();
        for coord in &stale {
            self.detach(inner, coord);
        }

        let mut shown = 0;
        for coord in plan.bounds.coords() {
            if self.attach(inner, coord) {
                shown += 1;
            }
        }
        shown += self.attach_fallback(inner);

        let update = ViewportUpdate {
            zoom_factor: plan.zoom_factor,
            zoom: plan.zoom,
            bounds: plan.bounds,
            shown,
            hidden: stale.len(),
            visible: inner.visible.len(),
        };

        debug!(
            zoom_factor = update.zoom_factor,
            zoom = update.zoom,
            shown = update.shown,
            hidden = update.hidden,
            visible = update.visible,
            "Viewport updated"
        );

        UpdateOutcome::Applied(update)
    }

    /// Replace the shared view transform and re-place every visible tile.
    ///
    /// Tile buffers are untouched.
    pub fn set_view_transform(&self, transform: Affine) {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        inner.state.transform = transform;
        for (coord, visible) in &inner.visible {
            let placement = tile_placement(*coord, self.pyramid.geometry.tile_size, &transform);
            inner.surface.set_item_transform(visible.handle, placement);
        }
        debug!(tiles = inner.visible.len(), "View transform replaced");
    }

    /// Map the whole image onto the world rectangle `(left, top, width, height)`.
    pub fn set_rect(&self, left: f64, top: f64, width: f64, height: f64) {
        let geometry = self.pyramid.geometry;
        let transform = Affine::from_rect(left, top, width, height, geometry.width, geometry.height);
        self.set_view_transform(transform);
    }

    /// Apply a lookup table to every visible tile and use it for new tiles.
    pub fn set_lookup_table(&self, lut: LookupTable) {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        for visible in inner.visible.values() {
            inner.surface.set_item_lookup_table(visible.handle, &lut);
        }
        inner.state.lut = Some(lut);
    }

    /// Apply a level window to every visible tile and use it for new tiles.
    pub fn set_levels(&self, levels: Levels) {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        for visible in inner.visible.values() {
            inner.surface.set_item_levels(visible.handle, levels);
        }
        inner.state.levels = Some(levels);
    }

    /// Current transform, lookup table and levels.
    pub fn view_state(&self) -> ViewState {
        self.inner.lock().state.clone()
    }

    /// Histogram of the fallback tile's source samples.
    ///
    /// The coarsest tile sees the whole image, so it is a cheap stand-in
    /// for the full-resolution histogram.
    pub fn histogram(&self, bins: usize) -> Option<Histogram> {
        let tile = self.fetch_tile(TileCoord::new(self.max_zoom(), 0, 0));
        Histogram::from_samples(tile.valid_samples().map(Sample::to_f64), bins)
    }

    /// Drop cached tiles.
    ///
    /// With `clear_visible`, visible tiles are detached as well and the
    /// fallback level is re-attached so the background never disappears.
    pub fn clear_tile_cache(&self, clear_visible: bool) {
        self.pyramid.cache.clear();
        if clear_visible {
            let mut guard = self.inner.lock();
            let inner = &mut *guard;
            let coords: Vec<TileCoord> = inner.visible.keys().copied().collect();
            for coord in &coords {
                self.detach(inner, coord);
            }
            self.attach_fallback(inner);
        }
        info!(clear_visible, "Tile cache cleared");
    }

    /// Sample every tile of `zoom` into the cache, in parallel.
    ///
    /// Returns the number of tiles at that level.
    pub fn prewarm_zoom(&self, zoom: u8) -> Result<usize, ViewerError> {
        let max = self.max_zoom();
        if zoom > max {
            return Err(ViewerError::ZoomOutOfRange { zoom, max });
        }
        let coords: Vec<TileCoord> = self.pyramid.geometry.level(zoom).coords().collect();
        let pyramid = &self.pyramid;
        coords.par_iter().for_each(|coord| {
            pyramid.tile(*coord);
        });
        debug!(zoom, tiles = coords.len(), "Zoom level prewarmed");
        Ok(coords.len())
    }

    /// Visible tile coordinates, sorted.
    pub fn visible_coords(&self) -> Vec<TileCoord> {
        let mut coords: Vec<TileCoord> = self.inner.lock().visible.keys().copied().collect();
        coords.sort();
        coords
    }

    pub fn is_visible(&self, coord: TileCoord) -> bool {
        self.inner.lock().visible.contains_key(&coord)
    }

    /// The visible tile at `coord`, if attached.
    pub fn visible_tile(&self, coord: TileCoord) -> Option<Arc<Tile<T>>> {
        self.inner
            .lock()
            .visible
            .get(&coord)
            .map(|visible| Arc::clone(&visible.tile))
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.pyramid.cache.stats()
    }

    /// Read access to the surface.
    pub fn with_surface<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.inner.lock().surface)
    }

    /// Write access to the surface, e.g. after a resize changes its pixel size.
    pub fn with_surface_mut<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        f(&mut self.inner.lock().surface)
    }

    /// Attach `coord` if not already visible. Returns whether it was attached.
    fn attach(&self, inner: &mut Inner<T, S>, coord: TileCoord) -> bool {
        if inner.visible.contains_key(&coord) {
            return false;
        }
        let tile = self.fetch_tile(coord);
        let handle = inner.surface.add_item(&tile, &inner.state.render_options());
        inner.surface.set_item_transform(
            handle,
            tile_placement(coord, self.pyramid.geometry.tile_size, &inner.state.transform),
        );
        inner.surface.set_item_z_value(handle, self.z_value(coord.zoom));
        inner.visible.insert(coord, VisibleTile { tile, handle });
        true
    }

    fn detach(&self, inner: &mut Inner<T, S>, coord: &TileCoord) {
        if let Some(visible) = inner.visible.remove(coord) {
            inner.surface.remove_item(visible.handle);
        }
    }

    /// Ensure every tile of the coarsest level is attached.
    fn attach_fallback(&self, inner: &mut Inner<T, S>) -> usize {
        let level = self.pyramid.geometry.level(self.max_zoom());
        level.coords().filter(|coord| self.attach(inner, *coord)).count()
    }
}
