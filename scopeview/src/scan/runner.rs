//! Measurement loop: drive the stage through a plan and collect pixels.

use std::time::Instant;

use serde::Serialize;
use time::OffsetDateTime;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::scan::{ScanPlan, ScanResult};

/// Positioning hardware moved between pixels.
///
/// `dh`/`dv` are the displacement from the previous pixel, zero on the
/// first move. Implementations that move the same way regardless can rely
/// on the default `move_slow`/`move_fast`.
pub trait Stage {
    /// Move to the first pixel before acquisition starts.
    fn move_start(&mut self, h: f64, v: f64) -> ScanResult<()>;

    /// Move at the start of a line (typically the longer move).
    fn move_slow(&mut self, h: f64, v: f64, dh: f64, dv: f64) -> ScanResult<()> {
        let _ = (dh, dv);
        self.move_start(h, v)
    }

    /// Step to the next pixel within a line.
    fn move_fast(&mut self, h: f64, v: f64, dh: f64, dv: f64) -> ScanResult<()> {
        let _ = (dh, dv);
        self.move_start(h, v)
    }
}

/// Detector read at every pixel.
pub trait PixelCollector {
    /// Called once before the first move.
    fn pre_scan(&mut self, plan: &ScanPlan) -> ScanResult<()> {
        let _ = plan;
        Ok(())
    }

    /// Acquire pixel number `pixel` at image index `[k, j, i]`.
    fn collect(&mut self, pixel: usize, index: [usize; 3]) -> ScanResult<f64>;

    /// Called once after the loop ends, including on interruption.
    fn post_scan(&mut self) {}
}

/// Progress callback: `(pixels_done, total_pixels, percent)`.
pub type ScanProgressCallback = Box<dyn Fn(usize, usize, f64) + Send + Sync>;

/// Acquired image frames plus acquisition timestamps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanData {
    /// `(frames, Nv, Nh)`.
    pub shape: (usize, usize, usize),
    /// Row-major `frames · Nv · Nh` values; NaN where nothing was acquired.
    pub values: Vec<f64>,
    /// Unix time in seconds at which each pixel was acquired; NaN if not.
    pub pixel_time: Vec<f64>,
    /// Pixels acquired before the loop ended.
    pub completed: usize,
    pub interrupted: bool,
}

impl ScanData {
    fn new(shape: (usize, usize, usize)) -> Self {
        let len = shape.0 * shape.1 * shape.2;
        Self {
            shape,
            values: vec![f64::NAN; len],
            pixel_time: vec![f64::NAN; len],
            completed: 0,
            interrupted: false,
        }
    }

    fn offset(&self, [k, j, i]: [usize; 3]) -> usize {
        (k * self.shape.1 + j) * self.shape.2 + i
    }

    pub fn get(&self, index: [usize; 3]) -> Option<f64> {
        let (frames, nv, nh) = self.shape;
        if index[0] >= frames || index[1] >= nv || index[2] >= nh {
            return None;
        }
        Some(self.values[self.offset(index)])
    }

    /// Frame `k` as `Nv` rows of `Nh` values.
    pub fn frame(&self, k: usize) -> Option<&[f64]> {
        let len = self.shape.1 * self.shape.2;
        self.values.get(k * len..(k + 1) * len)
    }

    pub fn is_complete(&self) -> bool {
        !self.interrupted && self.completed == self.values.len()
    }
}

/// Runs a [`ScanPlan`] against a stage and a collector.
#[derive(Default)]
pub struct ScanRunner {
    progress: Option<ScanProgressCallback>,
}

impl ScanRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report progress after every pixel.
    pub fn with_progress(mut self, progress: ScanProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Visit every pixel of `plan` in order.
    ///
    /// The first pixel is preceded by `move_start`; each pixel then gets a
    /// slow or fast move followed by a collect. Cancellation is checked
    /// between pixels; an interrupted scan returns the partial data with
    /// `interrupted` set.
    ///
    /// # Errors
    ///
    /// Propagates the first stage or collector error.
    pub fn run<S, C>(
        &self,
        plan: &ScanPlan,
        stage: &mut S,
        collector: &mut C,
        cancel: &CancellationToken,
    ) -> ScanResult<ScanData>
    where
        S: Stage + ?Sized,
        C: PixelCollector + ?Sized,
    {
        let total = plan.num_pixels();
        let mut data = ScanData::new(plan.shape);
        let started = Instant::now();

        info!(
            scan_type = %plan.scan_type,
            pixels = total,
            frames = plan.shape.0,
            lines = plan.num_lines(),
            "Scan starting"
        );

        collector.pre_scan(plan)?;
        let result = self.run_pixels(plan, stage, collector, cancel, &mut data);
        collector.post_scan();

        match result {
            Ok(()) => {
                info!(
                    completed = data.completed,
                    total,
                    interrupted = data.interrupted,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Scan finished"
                );
                Ok(data)
            }
            Err(e) => {
                warn!(error = %e, completed = data.completed, "Scan failed");
                Err(e)
            }
        }
    }

    fn run_pixels<S, C>(
        &self,
        plan: &ScanPlan,
        stage: &mut S,
        collector: &mut C,
        cancel: &CancellationToken,
        data: &mut ScanData,
    ) -> ScanResult<()>
    where
        S: Stage + ?Sized,
        C: PixelCollector + ?Sized,
    {
        let total = plan.num_pixels();
        if total == 0 {
            return Ok(());
        }

        stage.move_start(plan.h_positions[0], plan.v_positions[0])?;

        for pixel in 0..total {
            if cancel.is_cancelled() {
                info!(pixel, total, "Scan interrupted");
                data.interrupted = true;
                break;
            }

            let (h, v) = (plan.h_positions[pixel], plan.v_positions[pixel]);
            let (dh, dv) = plan.delta(pixel);
            if plan.slow_move[pixel] {
                debug!(pixel, h, v, "Slow move");
                stage.move_slow(h, v, dh, dv)?;
            } else {
                stage.move_fast(h, v, dh, dv)?;
            }

            let index = plan.indices[pixel];
            let offset = data.offset(index);
            data.pixel_time[offset] = unix_seconds();
            data.values[offset] = collector.collect(pixel, index)?;
            data.completed = pixel + 1;

            if let Some(progress) = &self.progress {
                progress(pixel + 1, total, 100.0 * (pixel + 1) as f64 / total as f64);
            }
        }

        Ok(())
    }
}

fn unix_seconds() -> f64 {
    OffsetDateTime::now_utc().unix_timestamp_nanos() as f64 / 1e9
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::{LinearRange, ScanError, ScanType};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct RecordingStage {
        moves: Vec<(&'static str, f64, f64, f64, f64)>,
    }

    impl Stage for RecordingStage {
        fn move_start(&mut self, h: f64, v: f64) -> ScanResult<()> {
            self.moves.push(("start", h, v, 0.0, 0.0));
            Ok(())
        }

        fn move_slow(&mut self, h: f64, v: f64, dh: f64, dv: f64) -> ScanResult<()> {
            self.moves.push(("slow", h, v, dh, dv));
            Ok(())
        }

        fn move_fast(&mut self, h: f64, v: f64, dh: f64, dv: f64) -> ScanResult<()> {
            self.moves.push(("fast", h, v, dh, dv));
            Ok(())
        }
    }

    /// Returns the pixel number as the measured value.
    #[derive(Default)]
    struct IndexCollector {
        pre: bool,
        post: bool,
        fail_at: Option<usize>,
    }

    impl PixelCollector for IndexCollector {
        fn pre_scan(&mut self, _plan: &ScanPlan) -> ScanResult<()> {
            self.pre = true;
            Ok(())
        }

        fn collect(&mut self, pixel: usize, _index: [usize; 3]) -> ScanResult<f64> {
            if self.fail_at == Some(pixel) {
                return Err(ScanError::Acquisition {
                    pixel,
                    message: "detector saturated".into(),
                });
            }
            Ok(pixel as f64)
        }

        fn post_scan(&mut self) {
            self.post = true;
        }
    }

    fn plan(scan_type: ScanType) -> ScanPlan {
        let h = LinearRange::from_num(0.0, 2.0, 3).unwrap();
        let v = LinearRange::from_num(10.0, 11.0, 2).unwrap();
        ScanPlan::generate(scan_type, &h, &v)
    }

    #[test]
    fn test_full_scan_fills_image() {
        let plan = plan(ScanType::Serpentine);
        let mut stage = RecordingStage::default();
        let mut collector = IndexCollector::default();

        let data = ScanRunner::new()
            .run(&plan, &mut stage, &mut collector, &CancellationToken::new())
            .unwrap();

        assert!(data.is_complete());
        assert!(collector.pre && collector.post);
        // Second line runs right to left: pixel 3 lands at column 2
        assert_eq!(data.get([0, 1, 2]), Some(3.0));
        assert_eq!(data.frame(0).unwrap(), &[0.0, 1.0, 2.0, 5.0, 4.0, 3.0]);
        assert!(data.pixel_time.iter().all(|t| t.is_finite()));
    }

    #[test]
    fn test_moves_follow_slow_flags() {
        let plan = plan(ScanType::Raster);
        let mut stage = RecordingStage::default();
        ScanRunner::new()
            .run(&plan, &mut stage, &mut IndexCollector::default(), &CancellationToken::new())
            .unwrap();

        let kinds: Vec<&str> = stage.moves.iter().map(|m| m.0).collect();
        assert_eq!(kinds, vec!["start", "slow", "fast", "fast", "slow", "fast", "fast"]);
        // Line change: back to h=0 and up one line
        assert_eq!(stage.moves[4], ("slow", 0.0, 11.0, -2.0, 1.0));
    }

    #[test]
    fn test_cancellation_returns_partial_data() {
        let plan = plan(ScanType::TraceRetrace);
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        let runner = ScanRunner::new().with_progress(Box::new(move |done, _, _| {
            if done == 4 {
                trigger.cancel();
            }
        }));

        let data = runner
            .run(&plan, &mut RecordingStage::default(), &mut IndexCollector::default(), &cancel)
            .unwrap();
        assert!(data.interrupted);
        assert_eq!(data.completed, 4);
        assert!(!data.is_complete());
        assert!(data.get([0, 1, 0]).unwrap().is_nan());
    }

    #[test]
    fn test_progress_reaches_hundred_percent() {
        let plan = plan(ScanType::OrthoRaster);
        let calls = Arc::new(AtomicUsize::new(0));
        let last = Arc::new(parking_lot::Mutex::new(0.0));
        let (calls_cb, last_cb) = (Arc::clone(&calls), Arc::clone(&last));
        let runner = ScanRunner::new().with_progress(Box::new(move |_, _, percent| {
            calls_cb.fetch_add(1, Ordering::SeqCst);
            *last_cb.lock() = percent;
        }));

        runner
            .run(&plan, &mut RecordingStage::default(), &mut IndexCollector::default(), &CancellationToken::new())
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), plan.num_pixels());
        assert_eq!(*last.lock(), 100.0);
    }

    #[test]
    fn test_collector_error_aborts_scan() {
        let plan = plan(ScanType::Raster);
        let mut collector = IndexCollector {
            fail_at: Some(2),
            ..Default::default()
        };
        let result = ScanRunner::new().run(&plan, &mut RecordingStage::default(), &mut collector, &CancellationToken::new());
        assert!(matches!(result, Err(ScanError::Acquisition { pixel: 2, .. })));
        assert!(collector.post);
    }
}
