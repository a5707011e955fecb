//! Sample histograms for contrast / LUT widgets.

use serde::Serialize;

/// Equal-width histogram over `[min, max]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub min: f64,
    pub max: f64,
    pub counts: Vec<u64>,
}

impl Histogram {
    /// Bin `samples` into `bins` equal-width bins spanning their range.
    ///
    /// Non-finite samples are skipped. Returns `None` when there is nothing
    /// to bin or `bins` is zero.
    pub fn from_samples(samples: impl IntoIterator<Item = f64>, bins: usize) -> Option<Self> {
        if bins == 0 {
            return None;
        }
        let values: Vec<f64> = samples.into_iter().filter(|v| v.is_finite()).collect();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if values.is_empty() {
            return None;
        }

        let mut counts = vec![0u64; bins];
        let span = max - min;
        for v in values {
            let bin = if span > 0.0 {
                (((v - min) / span) * bins as f64) as usize
            } else {
                0
            };
            // max lands exactly on the upper edge
            counts[bin.min(bins - 1)] += 1;
        }
        Some(Self { min, max, counts })
    }

    /// Lower edge of each bin.
    pub fn bin_edges(&self) -> Vec<f64> {
        let width = (self.max - self.min) / self.counts.len() as f64;
        (0..self.counts.len())
            .map(|i| self.min + width * i as f64)
            .collect()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}
