//! Tokio task that drives a viewer from a stream of viewport changes.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::raster::Sample;
use crate::surface::PlotSurface;
use crate::throttle::RateLimiter;
use crate::viewer::{UpdateOutcome, ViewRange, ZoomableMap};

/// Default viewport update rate.
pub const DEFAULT_RATE_LIMIT_HZ: f64 = 30.0;

/// Counters reported when the pump stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PumpStats {
    /// Ranges received from the channel.
    pub received: u64,
    /// Ranges handed to the viewer.
    pub delivered: u64,
    /// Ranges replaced by a newer one before delivery.
    pub coalesced: u64,
    pub applied: u64,
    pub skipped: u64,
    pub degenerate: u64,
}

impl PumpStats {
    fn record(&mut self, outcome: &UpdateOutcome) {
        self.delivered += 1;
        match outcome {
            UpdateOutcome::Applied(_) => self.applied += 1,
            UpdateOutcome::Skipped => self.skipped += 1,
            UpdateOutcome::Degenerate(_) => self.degenerate += 1,
        }
    }
}

/// Spawn a task that rate-limits viewport changes from `rx` into `viewer`.
///
/// The task stops when `cancel` fires or every sender is dropped. On
/// channel close the last pending range is still delivered so the viewer
/// ends on the final viewport.
///
/// Must be called from within a Tokio runtime.
pub fn spawn_viewport_pump<T, S>(
    viewer: Arc<ZoomableMap<T, S>>,
    mut rx: mpsc::Receiver<ViewRange>,
    rate_hz: f64,
    cancel: CancellationToken,
) -> JoinHandle<PumpStats>
where
    T: Sample,
    S: PlotSurface<T> + Send + 'static,
    S::Handle: Send,
{
    tokio::spawn(async move {
        let mut limiter = RateLimiter::new(rate_hz);
        let mut stats = PumpStats::default();

        info!(rate_hz, "Viewport pump started");

        loop {
            let deadline = limiter.next_deadline();

            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    debug!("Viewport pump cancelled");
                    break;
                }

                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    if let Some(range) = limiter.poll(Instant::now()) {
                        stats.record(&deliver(&viewer, range).await);
                    }
                }

                message = rx.recv() => {
                    let Some(range) = message else {
                        if let Some(range) = limiter.flush() {
                            stats.record(&deliver(&viewer, range).await);
                        }
                        break;
                    };
                    stats.received += 1;
                    if let Some(range) = limiter.offer(range, Instant::now()) {
                        stats.record(&deliver(&viewer, range).await);
                    }
                }
            }
        }

        stats.coalesced = limiter.coalesced();
        info!(
            received = stats.received,
            delivered = stats.delivered,
            coalesced = stats.coalesced,
            skipped = stats.skipped,
            "Viewport pump stopped"
        );
        stats
    })
}

/// Apply `range` on the blocking pool; tile sampling must not stall the
/// runtime's workers.
async fn deliver<T, S>(viewer: &Arc<ZoomableMap<T, S>>, range: ViewRange) -> UpdateOutcome
where
    T: Sample,
    S: PlotSurface<T> + Send + 'static,
    S::Handle: Send,
{
    let viewer = Arc::clone(viewer);
    match tokio::task::spawn_blocking(move || viewer.on_viewport_changed(range)).await {
        Ok(outcome) => outcome,
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(e) => {
            warn!(error = %e, "Viewport update task did not complete");
            UpdateOutcome::Skipped
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::TileCoord;
    use crate::raster::Raster;
    use crate::surface::RecordingSurface;
    use crate::tile::{StridedSampler, Tile, TileSampler};
    use crate::viewer::ViewerConfig;

    fn viewer() -> Arc<ZoomableMap<u8, RecordingSurface<u8>>> {
        let source = Arc::new(Raster::filled(1000, 1000, 1, 3));
        Arc::new(ZoomableMap::new(source, RecordingSurface::new((1.0, 1.0)), ViewerConfig::default()).unwrap())
    }

    #[tokio::test]
    async fn test_burst_is_coalesced_to_latest() {
        let viewer = viewer();
        let (tx, rx) = mpsc::channel(16);
        let handle = spawn_viewport_pump(Arc::clone(&viewer), rx, 1.0, CancellationToken::new());

        let base = ViewRange::new(0.0, 300.0, 0.0, 300.0);
        for step in 0..5 {
            tx.send(base.translated(f64::from(step) * 100.0, 0.0)).await.unwrap();
        }
        drop(tx);

        let stats = handle.await.unwrap();
        assert_eq!(stats.received, 5);
        assert_eq!(stats.delivered, 2);
        assert_eq!(stats.coalesced, 3);
        assert_eq!(stats.applied, 2);

        // Final range 400..700 covers columns 1..3 at zoom 0
        assert!(viewer.is_visible(TileCoord::new(0, 0, 2)));
        assert!(!viewer.is_visible(TileCoord::new(0, 0, 0)));
    }

    #[tokio::test]
    async fn test_pending_range_delivered_after_interval() {
        let viewer = viewer();
        let (tx, rx) = mpsc::channel(16);
        let handle = spawn_viewport_pump(Arc::clone(&viewer), rx, 100.0, CancellationToken::new());

        tx.send(ViewRange::new(0.0, 300.0, 0.0, 300.0)).await.unwrap();
        tx.send(ViewRange::new(600.0, 900.0, 600.0, 900.0)).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        assert!(viewer.is_visible(TileCoord::new(0, 3, 3)));
        drop(tx);
        let stats = handle.await.unwrap();
        assert_eq!(stats.delivered, 2);
    }

    /// Sleeps per tile to stand in for sampling a large source.
    struct SlowSampler(std::time::Duration);

    impl TileSampler<u8> for SlowSampler {
        fn sample(&self, source: &Raster<u8>, coord: TileCoord, tile_size: u32, fill: u8) -> Tile<u8> {
            std::thread::sleep(self.0);
            StridedSampler.sample(source, coord, tile_size, fill)
        }
    }

    #[tokio::test]
    async fn test_tile_sampling_does_not_block_runtime() {
        let source = Arc::new(Raster::filled(1000, 1000, 1, 3));
        let sampler = Arc::new(SlowSampler(std::time::Duration::from_millis(100)));
        let viewer = Arc::new(
            ZoomableMap::with_sampler(source, RecordingSurface::new((1.0, 1.0)), ViewerConfig::default(), sampler)
                .unwrap(),
        );
        let (tx, rx) = mpsc::channel(4);
        let handle = spawn_viewport_pump(Arc::clone(&viewer), rx, 0.0, CancellationToken::new());

        // Four new zoom-0 tiles: about 400 ms of sampling
        tx.send(ViewRange::new(0.0, 300.0, 0.0, 300.0)).await.unwrap();
        let started = std::time::Instant::now();
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        assert!(started.elapsed() < std::time::Duration::from_millis(200));

        drop(tx);
        let stats = handle.await.unwrap();
        assert_eq!(stats.applied, 1);
        assert_eq!(viewer.visible_coords().len(), 5);
    }

    #[tokio::test]
    async fn test_cancel_stops_pump() {
        let viewer = viewer();
        let (tx, rx) = mpsc::channel::<ViewRange>(4);
        let cancel = CancellationToken::new();
        let handle = spawn_viewport_pump(viewer, rx, DEFAULT_RATE_LIMIT_HZ, cancel.clone());

        cancel.cancel();
        let stats = handle.await.unwrap();
        assert_eq!(stats, PumpStats::default());
        drop(tx);
    }

    #[tokio::test]
    async fn test_degenerate_ranges_are_counted() {
        let viewer = viewer();
        let (tx, rx) = mpsc::channel(4);
        let handle = spawn_viewport_pump(viewer, rx, 0.0, CancellationToken::new());

        tx.send(ViewRange::new(5.0, 5.0, 5.0, 5.0)).await.unwrap();
        drop(tx);
        let stats = handle.await.unwrap();
        assert_eq!(stats.degenerate, 1);
        assert_eq!(stats.applied, 0);
    }
}
