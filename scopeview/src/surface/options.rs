//! Color mapping and contrast options for image items.

use std::fmt;
use std::sync::Arc;

/// RGBA color lookup table applied to scalar samples.
///
/// Cloning shares the table.
#[derive(Clone, PartialEq)]
pub struct LookupTable(Arc<[[u8; 4]]>);

impl LookupTable {
    pub fn new(colors: Vec<[u8; 4]>) -> Self {
        Self(colors.into())
    }

    /// Linear black-to-white ramp with `entries` colors (at least 2).
    pub fn grayscale(entries: usize) -> Self {
        let entries = entries.max(2);
        let colors = (0..entries)
            .map(|i| {
                let v = (i * 255 / (entries - 1)) as u8;
                [v, v, v, 255]
            })
            .collect::<Vec<_>>();
        Self::new(colors)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn colors(&self) -> &[[u8; 4]] {
        &self.0
    }

    /// Whether two handles share the same table allocation.
    pub fn ptr_eq(&self, other: &LookupTable) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for LookupTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LookupTable({} entries)", self.0.len())
    }
}

/// Contrast window: samples at `low` map to the first LUT entry and at
/// `high` to the last.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Levels {
    pub low: f64,
    pub high: f64,
}

impl Levels {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Normalize `value` into `0.0..=1.0` within the window.
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.high - self.low;
        if span == 0.0 || !span.is_finite() {
            return 0.0;
        }
        ((value - self.low) / span).clamp(0.0, 1.0)
    }
}

/// Rendering keyword options passed when an image item is created.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderOptions {
    pub lut: Option<LookupTable>,
    pub levels: Option<Levels>,
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lut(mut self, lut: LookupTable) -> Self {
        self.lut = Some(lut);
        self
    }

    pub fn with_levels(mut self, levels: Levels) -> Self {
        self.levels = Some(levels);
        self
    }
}
