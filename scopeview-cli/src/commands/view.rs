//! View command - replay a zoom-out sequence against a headless surface.
//!
//! The image is shown at full resolution first, then the device pixel size
//! doubles on every step until the requested number of steps is done. Each
//! step prints the chosen zoom level and the tile bookkeeping so tile
//! selection can be checked without a GUI.

use std::path::PathBuf;
use std::sync::Arc;

use image::DynamicImage;
use scopeview::config::format_size;
use scopeview::raster::{Raster, Sample};
use scopeview::surface::RecordingSurface;
use scopeview::viewer::{UpdateOutcome, ViewRange, ViewerConfig, ZoomableMap};
use tracing::info;

use crate::commands::open_image;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for `scopeview view`.
pub struct ViewArgs {
    pub image: PathBuf,
    pub zoom_steps: u32,
    pub tile_size: Option<u32>,
    pub verbose: bool,
}

pub fn run(args: ViewArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(args.verbose)?;
    runner.log_startup("view");

    let mut config = runner.config().viewer.to_viewer_config();
    if let Some(tile_size) = args.tile_size {
        config = config.with_tile_size(tile_size);
    }

    let image = open_image(&args.image)?;
    println!("Loaded {} ({} x {})", args.image.display(), image.width(), image.height());

    if matches!(image, DynamicImage::ImageLuma16(_)) {
        let raster = Raster::from_image_luma16(&image)?;
        replay(raster, config, args.zoom_steps)
    } else {
        let raster = Raster::from_image(image)?;
        replay(raster, config, args.zoom_steps)
    }
}

fn replay<T: Sample>(raster: Raster<T>, config: ViewerConfig, steps: u32) -> Result<(), CliError> {
    let (width, height) = (raster.width() as f64, raster.height() as f64);
    let map = ZoomableMap::new(Arc::new(raster), RecordingSurface::new((1.0, 1.0)), config)?;
    let range = ViewRange::new(0.0, width, 0.0, height);

    println!("Max zoom: {}", map.max_zoom());
    println!();
    println!("  {:>4}  {:>10}  {:>4}  {:>7}  {:>5}  {:>6}", "step", "px size", "zoom", "visible", "shown", "hidden");
    println!("  {}", "-".repeat(45));

    for step in 0..=steps {
        let pixel_size = (1u64 << step.min(62)) as f64;
        map.with_surface_mut(|surface| surface.set_pixel_size((pixel_size, pixel_size)));

        match map.on_viewport_changed(range) {
            UpdateOutcome::Applied(update) => {
                info!(step, zoom = update.zoom, visible = update.visible, "Viewport applied");
                println!(
                    "  {:>4}  {:>10}  {:>4}  {:>7}  {:>5}  {:>6}",
                    step, pixel_size, update.zoom, update.visible, update.shown, update.hidden
                );
            }
            UpdateOutcome::Degenerate(reason) => {
                println!("  {:>4}  {:>10}  degenerate view: {}", step, pixel_size, reason);
            }
            UpdateOutcome::Skipped => {
                println!("  {:>4}  {:>10}  skipped", step, pixel_size);
            }
        }
    }

    let stats = map.cache_stats();
    println!();
    println!("Tile cache:");
    println!("  Entries:  {}", stats.entry_count);
    println!("  Size:     {} / {}", format_size(stats.size_bytes), format_size(stats.max_size_bytes));
    println!("  Hit rate: {:.1}%", stats.hit_rate() * 100.0);
    println!("Surface items: {}", map.with_surface(|surface| surface.item_count()));

    Ok(())
}
