//! Integration tests for the zoomable tile viewer.
//!
//! These tests drive `ZoomableMap` through the public API the way a plot
//! widget would:
//! - Zooming in and out across pyramid levels
//! - Flipped view transforms
//! - Viewport updates racing from several threads
//! - Rate-limited updates through the viewport pump
//!
//! Run with: `cargo test --test viewer_integration`

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use scopeview::coord::TileCoord;
use scopeview::raster::Raster;
use scopeview::surface::{LookupTable, RecordingSurface};
use scopeview::throttle::spawn_viewport_pump;
use scopeview::transform::Affine;
use scopeview::viewer::{UpdateOutcome, ViewRange, ViewerConfig, ZoomableMap};

// ============================================================================
// Helper Functions
// ============================================================================

type Map = ZoomableMap<u16, RecordingSurface<u16>>;

/// A 1000×1000 gradient image with 256-pixel tiles (3 zoom levels).
fn make_map(pixel_size: f64) -> Map {
    let source = Arc::new(Raster::from_fn(1000, 1000, 1, |x, y, _| (x + y) as u16));
    ZoomableMap::new(source, RecordingSurface::new((pixel_size, pixel_size)), ViewerConfig::default()).unwrap()
}

/// Check the visible set against the last applied update.
fn assert_consistent(map: &Map, zoom: u8) {
    let visible = map.visible_coords();
    let non_fallback: Vec<&TileCoord> = visible.iter().filter(|c| c.zoom != map.max_zoom()).collect();
    assert!(non_fallback.iter().all(|c| c.zoom == zoom));
    assert!(map.is_visible(TileCoord::new(map.max_zoom(), 0, 0)));

    map.with_surface(|surface| {
        assert_eq!(surface.item_count(), visible.len());
        let attached: HashSet<TileCoord> = surface.items().map(|(_, item)| item.tile.coord()).collect();
        assert_eq!(attached, visible.iter().copied().collect());
    });
}

// ============================================================================
// Integration Tests
// ============================================================================

/// Zoom out step by step from full resolution to the fallback level.
#[test]
fn test_zoom_out_walks_every_level() {
    let map = make_map(1.0);
    let range = ViewRange::new(0.0, 1000.0, 0.0, 1000.0);

    let mut seen = Vec::new();
    for pixel_size in [1.0, 2.0, 4.0, 8.0] {
        map.with_surface_mut(|surface| surface.set_pixel_size((pixel_size, pixel_size)));
        let outcome = map.on_viewport_changed(range);
        let update = outcome.update().unwrap().clone();
        assert_consistent(&map, update.zoom);
        seen.push((update.zoom, update.visible));
    }

    assert_eq!(seen, vec![(0, 17), (1, 5), (2, 1), (2, 1)]);
}

/// A y-flipped transform maps the top of the world to the first image rows.
#[test]
fn test_flipped_transform_selects_correct_tiles() {
    let map = make_map(1.0);
    map.set_view_transform(Affine::scale_translate(1.0, -1.0, 0.0, 1000.0));

    let outcome = map.on_viewport_changed(ViewRange::new(0.0, 300.0, 700.0, 1000.0));
    let update = outcome.update().unwrap();
    assert_eq!(update.zoom, 0);
    assert_eq!(update.bounds.rows, 0..2);
    assert_eq!(update.bounds.cols, 0..2);

    map.with_surface(|surface| {
        let item = surface.item_for(TileCoord::new(0, 1, 0)).unwrap();
        // Tile row 1 starts at source y = 256, world y = 744
        assert_eq!(item.transform.map(0.0, 0.0), (0.0, 744.0));
    });
}

/// Concurrent updates never corrupt the visible set; dropped ones are reported.
#[test]
fn test_concurrent_viewport_updates() {
    let map = Arc::new(make_map(1.0));
    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let map = Arc::clone(&map);
            thread::spawn(move || {
                let mut applied = 0;
                let mut skipped = 0;
                for step in 0..50 {
                    let offset = f64::from((worker * 50 + step) % 700);
                    match map.on_viewport_changed(ViewRange::new(offset, offset + 300.0, offset, offset + 300.0)) {
                        UpdateOutcome::Applied(_) => applied += 1,
                        UpdateOutcome::Skipped => skipped += 1,
                        UpdateOutcome::Degenerate(reason) => panic!("unexpected degenerate viewport: {}", reason),
                    }
                }
                (applied, skipped)
            })
        })
        .collect();

    let (applied, skipped) = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .fold((0, 0), |acc, (a, s)| (acc.0 + a, acc.1 + s));
    assert_eq!(applied + skipped, 200);
    assert!(applied > 0);

    // A final quiet update converges
    let outcome = map.on_viewport_changed(ViewRange::new(0.0, 300.0, 0.0, 300.0));
    assert!(outcome.is_applied());
    assert_consistent(&map, 0);
    assert_eq!(map.visible_coords().len(), 5);
}

/// Random pans and zooms always leave exactly the planned window plus the fallback.
#[test]
fn test_random_walk_matches_planned_window() {
    let map = make_map(1.0);
    let mut rng = StdRng::seed_from_u64(0x5c09e);
    let fallback = TileCoord::new(map.max_zoom(), 0, 0);

    for _ in 0..200 {
        let pixel_size = rng.random_range(0.25..6.0);
        let (x, y) = (rng.random_range(-300.0..1100.0), rng.random_range(-300.0..1100.0));
        let (w, h) = (rng.random_range(10.0..1200.0), rng.random_range(10.0..1200.0));
        map.with_surface_mut(|surface| surface.set_pixel_size((pixel_size, pixel_size)));

        let outcome = map.on_viewport_changed(ViewRange::new(x, x + w, y, y + h));
        let update = outcome.update().unwrap().clone();
        assert_consistent(&map, update.zoom);

        let mut expected: HashSet<TileCoord> = update.bounds.coords().collect();
        expected.insert(fallback);
        let visible: HashSet<TileCoord> = map.visible_coords().into_iter().collect();
        assert_eq!(visible, expected);
        assert_eq!(update.visible, expected.len());
    }
}

/// Tiles are shared with the cache: panning back reuses the same buffers.
#[test]
fn test_pan_back_reuses_cached_tiles() {
    let map = make_map(1.0);
    let home = ViewRange::new(0.0, 200.0, 0.0, 200.0);
    map.on_viewport_changed(home);
    let first = map.visible_tile(TileCoord::new(0, 0, 0)).unwrap();

    map.on_viewport_changed(home.translated(600.0, 600.0));
    assert!(!map.is_visible(TileCoord::new(0, 0, 0)));

    map.on_viewport_changed(home);
    let again = map.visible_tile(TileCoord::new(0, 0, 0)).unwrap();
    assert!(Arc::ptr_eq(&first, &again));
    assert!(map.cache_stats().hits > 0);
}

/// Color state survives zoom level changes.
#[test]
fn test_lookup_table_applies_across_levels() {
    let map = make_map(1.0);
    let lut = LookupTable::grayscale(256);
    map.set_lookup_table(lut.clone());

    map.on_viewport_changed(ViewRange::new(0.0, 300.0, 0.0, 300.0));
    map.with_surface_mut(|surface| surface.set_pixel_size((2.0, 2.0)));
    map.on_viewport_changed(ViewRange::new(0.0, 1000.0, 0.0, 1000.0));

    map.with_surface(|surface| {
        assert!(surface
            .items()
            .all(|(_, item)| item.options.lut.as_ref().is_some_and(|l| l.ptr_eq(&lut))));
    });
}

/// RGB sources keep their channels through sampling.
#[test]
fn test_rgb_source() {
    let source = Arc::new(Raster::<u8>::from_fn(600, 300, 3, |x, _, c| if c == 0 { (x % 256) as u8 } else { 0 }));
    let map = ZoomableMap::new(source, RecordingSurface::new((1.0, 1.0)), ViewerConfig::default().with_tile_size(128)).unwrap();
    assert_eq!(map.max_zoom(), 3);
    let tile = map.get_tile(TileCoord::new(0, 0, 1)).unwrap();
    assert_eq!(tile.data().channels(), 3);
    assert_eq!(tile.data().pixel(0, 0), Some(&[128u8, 0, 0][..]));
}

/// The pump converges the viewer on the last range sent.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_pump_converges_on_last_range() {
    let map = Arc::new(make_map(1.0));
    let (tx, rx) = mpsc::channel(64);
    let cancel = CancellationToken::new();
    let handle = spawn_viewport_pump(Arc::clone(&map), rx, 60.0, cancel.clone());

    for step in 0..40 {
        let offset = f64::from(step) * 15.0;
        tx.send(ViewRange::new(offset, offset + 250.0, 0.0, 250.0)).await.unwrap();
    }
    drop(tx);

    let stats = handle.await.unwrap();
    assert_eq!(stats.received, 40);
    assert_eq!(stats.delivered + stats.coalesced, 40);
    assert!(stats.coalesced > 0);

    // Last range: x 585..835, y 0..250
    let expected: HashSet<TileCoord> = [(0, 0, 2), (0, 0, 3), (2, 0, 0)]
        .into_iter()
        .map(|(z, r, c)| TileCoord::new(z, r, c))
        .collect();
    let visible: HashSet<TileCoord> = map.visible_coords().into_iter().collect();
    assert_eq!(visible, expected);
}
