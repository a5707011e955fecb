//! Error types for raster construction.

use thiserror::Error;

/// Errors that can occur when building a [`super::Raster`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RasterError {
    /// A dimension or the channel count is zero.
    #[error("Empty raster: {width}×{height} with {channels} channel(s)")]
    Empty { width: u32, height: u32, channels: u32 },

    /// Buffer length does not match the declared shape.
    #[error("Buffer holds {actual} samples, expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },
}
