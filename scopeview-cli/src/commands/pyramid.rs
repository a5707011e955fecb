//! Pyramid command - show the zoom levels of an image.

use std::path::Path;

use scopeview::config::format_size;
use scopeview::coord::PyramidGeometry;
use tracing::info;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Print one row per zoom level: tile grid, stride and approximate size.
pub fn run(image: &Path, tile_size: Option<u32>, verbose: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(verbose)?;
    runner.log_startup("pyramid");

    let tile_size = tile_size.unwrap_or(runner.config().viewer.tile_size);
    if tile_size == 0 {
        return Err(CliError::Config("tile size must be positive".to_string()));
    }

    let (width, height) = image::image_dimensions(image).map_err(|e| CliError::Image {
        path: image.to_path_buf(),
        message: e.to_string(),
    })?;
    let geometry = PyramidGeometry::new(width, height, tile_size);
    info!(width, height, tile_size, max_zoom = geometry.max_zoom(), "Pyramid geometry");

    println!("{}", image.display());
    println!("  Size:      {} x {} px", width, height);
    println!("  Tile size: {} px", tile_size);
    println!("  Levels:    {}", geometry.max_zoom() as u32 + 1);
    println!();
    println!("  {:>4}  {:>8}  {:>12}  {:>7}  {:>12}", "zoom", "stride", "tiles", "count", "tile bytes");
    println!("  {}", "-".repeat(51));

    for zoom in 0..=geometry.max_zoom() {
        let (cols, rows) = geometry.tiles_at_zoom(zoom);
        let count = cols as u64 * rows as u64;
        // Single-channel 8-bit estimate; wider samples scale linearly
        let tile_bytes = tile_size as u64 * tile_size as u64;
        println!(
            "  {:>4}  {:>8}  {:>12}  {:>7}  {:>12}",
            zoom,
            1u64 << zoom,
            format!("{} x {}", cols, rows),
            count,
            format_size(count * tile_bytes)
        );
    }

    Ok(())
}
