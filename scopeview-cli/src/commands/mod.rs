//! Subcommand implementations.

pub mod config;
pub mod pyramid;
pub mod scan;
pub mod view;

use std::path::Path;

use image::DynamicImage;

use crate::error::CliError;

/// Decode an image file.
pub fn open_image(path: &Path) -> Result<DynamicImage, CliError> {
    image::open(path).map_err(|e| CliError::Image {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
