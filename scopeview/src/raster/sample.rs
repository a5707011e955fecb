//! Numeric sample types accepted by rasters and tiles.

use std::fmt::Debug;

/// A numeric pixel sample.
///
/// `Default` is the zero value used to pad partial edge tiles when no
/// explicit fill is configured. `to_f64` feeds histograms and level
/// windows.
pub trait Sample: Copy + Default + PartialEq + Debug + Send + Sync + 'static {
    fn to_f64(self) -> f64;

    /// Saturating conversion, used for configured fill values.
    fn from_f64(value: f64) -> Self;
}

macro_rules! impl_sample {
    ($($t:ty),*) => {
        $(
            impl Sample for $t {
                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }

                #[inline]
                fn from_f64(value: f64) -> Self {
                    value as $t
                }
            }
        )*
    };
}

impl_sample!(u8, u16, u32, i8, i16, i32, f32, f64);
