//! Simulated stage and detector for dry runs.

use std::thread;
use std::time::Duration;

use crate::scan::{PixelCollector, ScanPlan, ScanResult, Stage};

/// Stage that only tracks its position.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SimulatedStage {
    pub h: f64,
    pub v: f64,
    /// Total path length travelled.
    pub travel: f64,
    pub slow_moves: usize,
}

impl Stage for SimulatedStage {
    fn move_start(&mut self, h: f64, v: f64) -> ScanResult<()> {
        self.travel += (h - self.h).hypot(v - self.v);
        self.h = h;
        self.v = v;
        Ok(())
    }

    fn move_slow(&mut self, h: f64, v: f64, _dh: f64, _dv: f64) -> ScanResult<()> {
        self.slow_moves += 1;
        self.move_start(h, v)
    }
}

/// Detector returning a Gaussian spot centered in the scan area.
///
/// Sleeps `dwell` per pixel to mimic an integration time.
#[derive(Debug, Clone)]
pub struct SimulatedCollector {
    dwell: Duration,
    positions: Vec<(f64, f64)>,
    center: (f64, f64),
    sigma: f64,
}

impl SimulatedCollector {
    pub fn new(dwell: Duration) -> Self {
        Self {
            dwell,
            positions: Vec::new(),
            center: (0.0, 0.0),
            sigma: 1.0,
        }
    }
}

impl PixelCollector for SimulatedCollector {
    fn pre_scan(&mut self, plan: &ScanPlan) -> ScanResult<()> {
        self.positions = plan
            .h_positions
            .iter()
            .copied()
            .zip(plan.v_positions.iter().copied())
            .collect();
        let [h0, h1, v0, v1] = plan.corners;
        self.center = ((h0 + h1) / 2.0, (v0 + v1) / 2.0);
        self.sigma = ((h1 - h0).abs().max((v1 - v0).abs()) / 4.0).max(f64::EPSILON);
        Ok(())
    }

    fn collect(&mut self, pixel: usize, _index: [usize; 3]) -> ScanResult<f64> {
        if !self.dwell.is_zero() {
            thread::sleep(self.dwell);
        }
        let (h, v) = self.positions.get(pixel).copied().unwrap_or(self.center);
        let r2 = (h - self.center.0).powi(2) + (v - self.center.1).powi(2);
        Ok((-r2 / (2.0 * self.sigma * self.sigma)).exp())
    }
}
