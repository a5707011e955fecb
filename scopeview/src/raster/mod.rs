//! Source rasters for the pyramid viewer.
//!
//! A [`Raster`] is an immutable, row-major 2D buffer with an optional
//! channel axis. The viewer only ever reads from it: tiles are produced by
//! strided sampling, never by interpolation.
//!
//! # Example
//!
//! ```
//! use scopeview::raster::Raster;
//!
//! let raster = Raster::<u16>::from_fn(4, 3, 1, |x, y, _| (y * 10 + x) as u16);
//! assert_eq!(raster.get(2, 1, 0), Some(12));
//! ```

mod error;
mod sample;

pub use error::RasterError;
pub use sample::Sample;

use image::{ColorType, DynamicImage};

/// Immutable row-major raster of `width × height × channels` samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster<T: Sample> {
    width: u32,
    height: u32,
    channels: u32,
    data: Vec<T>,
}

impl<T: Sample> Raster<T> {
    /// Wrap an existing buffer.
    ///
    /// # Errors
    ///
    /// Returns `RasterError::Empty` for a zero dimension or zero channels and
    /// `RasterError::LengthMismatch` when `data` does not hold exactly
    /// `width · height · channels` samples.
    pub fn new(width: u32, height: u32, channels: u32, data: Vec<T>) -> Result<Self, RasterError> {
        if width == 0 || height == 0 || channels == 0 {
            return Err(RasterError::Empty {
                width,
                height,
                channels,
            });
        }
        let expected = width as usize * height as usize * channels as usize;
        if data.len() != expected {
            return Err(RasterError::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Build a raster by evaluating `f(x, y, channel)` for every sample.
    pub fn from_fn(width: u32, height: u32, channels: u32, mut f: impl FnMut(u32, u32, u32) -> T) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * channels as usize);
        for y in 0..height {
            for x in 0..width {
                for c in 0..channels {
                    data.push(f(x, y, c));
                }
            }
        }
        Self {
            width,
            height,
            channels,
            data,
        }
    }

    /// A raster of `width × height × channels` filled with `value`.
    pub fn filled(width: u32, height: u32, channels: u32, value: T) -> Self {
        Self {
            width,
            height,
            channels,
            data: vec![value; width as usize * height as usize * channels as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u32 {
        self.channels
    }

    /// `true` when the raster holds no samples.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Samples of the pixel at `(x, y)`, one per channel.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[T]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = self.offset(x, y);
        Some(&self.data[start..start + self.channels as usize])
    }

    /// Single sample lookup.
    #[inline]
    pub fn get(&self, x: u32, y: u32, channel: u32) -> Option<T> {
        if channel >= self.channels {
            return None;
        }
        self.pixel(x, y).map(|px| px[channel as usize])
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * self.channels as usize
    }

    /// Mutable access for building tile buffers in this crate.
    pub(crate) fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl Raster<u8> {
    /// Convert a decoded image into an 8-bit raster, keeping its channel count.
    ///
    /// Grayscale images become single-channel; everything else is expanded
    /// to RGB or RGBA.
    pub fn from_image(image: DynamicImage) -> Result<Self, RasterError> {
        let (width, height) = (image.width(), image.height());
        match image.color() {
            ColorType::L8 | ColorType::La8 | ColorType::L16 | ColorType::La16 => {
                Self::new(width, height, 1, image.into_luma8().into_raw())
            }
            color if color.has_alpha() => Self::new(width, height, 4, image.into_rgba8().into_raw()),
            _ => Self::new(width, height, 3, image.into_rgb8().into_raw()),
        }
    }
}

impl Raster<u16> {
    /// Convert a decoded image into a single-channel 16-bit raster.
    pub fn from_image_luma16(image: &DynamicImage) -> Result<Self, RasterError> {
        Self::new(image.width(), image.height(), 1, image.to_luma16().into_raw())
    }
}
