//! Integration tests for scan planning and the measurement loop.
//!
//! Run with: `cargo test --test scan_integration`

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use scopeview::config::{ConfigFile, ConfigKey};
use scopeview::scan::{ScanPlan, ScanRunner, ScanType, SimulatedCollector, SimulatedStage};

/// Settings edited through `ConfigKey` round-trip into a runnable plan.
#[test]
fn test_config_to_plan() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.ini");

    let mut config = ConfigFile::default();
    ConfigKey::ScanType.set(&mut config, "trace_retrace").unwrap();
    ConfigKey::ScanH1.set(&mut config, "30").unwrap();
    ConfigKey::ScanDv.set(&mut config, "0.5").unwrap();
    ConfigKey::ScanV1.set(&mut config, "27").unwrap();
    config.save_to(&path).unwrap();

    let loaded = ConfigFile::load_from(&path).unwrap();
    let (h, v) = loaded.scan.ranges().unwrap();
    let plan = ScanPlan::generate(loaded.scan.scan_type, &h, &v);

    assert_eq!(plan.scan_type, ScanType::TraceRetrace);
    assert_eq!(plan.shape, (2, 5, 6));
    assert_eq!(plan.num_pixels(), 60);
    assert_eq!(plan.imshow_extent, [24.5, 30.5, 24.75, 27.25]);
}

/// Every scan type runs to completion on simulated hardware.
#[test]
fn test_all_scan_types_complete() {
    let config = ConfigFile::default();
    let (h, v) = config.scan.ranges().unwrap();

    for scan_type in ScanType::ALL {
        let plan = ScanPlan::generate(scan_type, &h, &v);
        let data = ScanRunner::new()
            .run(
                &plan,
                &mut SimulatedStage::default(),
                &mut SimulatedCollector::new(Duration::ZERO),
                &CancellationToken::new(),
            )
            .unwrap();
        assert!(data.is_complete(), "{}", scan_type);
        assert!(data.values.iter().all(|v| v.is_finite()), "{}", scan_type);
        // Every frame images the same spot
        for k in 1..plan.shape.0 {
            assert_eq!(data.frame(k), data.frame(0), "{} frame {}", scan_type, k);
        }
    }
}

/// Cancelling from another thread stops the loop between pixels.
#[test]
fn test_interrupt_from_another_thread() {
    let config = ConfigFile::default();
    let (h, v) = config.scan.ranges().unwrap();
    let plan = ScanPlan::generate(ScanType::Raster, &h, &v);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let progress = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let seen = Arc::clone(&progress);

    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        trigger.cancel();
    });

    let data = ScanRunner::new()
        .with_progress(Box::new(move |done, _, _| {
            seen.store(done, std::sync::atomic::Ordering::SeqCst);
        }))
        .run(
            &plan,
            &mut SimulatedStage::default(),
            &mut SimulatedCollector::new(Duration::from_millis(1)),
            &cancel,
        )
        .unwrap();
    canceller.join().unwrap();

    assert!(data.interrupted);
    assert!(data.completed < plan.num_pixels());
    assert_eq!(data.completed, progress.load(std::sync::atomic::Ordering::SeqCst));
}

/// Plans and acquired data serialize for downstream tools.
#[test]
fn test_plan_and_data_serialize_to_json() {
    let h = scopeview::scan::LinearRange::from_num(0.0, 1.0, 2).unwrap();
    let v = scopeview::scan::LinearRange::from_num(0.0, 1.0, 2).unwrap();
    let plan = ScanPlan::generate(ScanType::Serpentine, &h, &v);

    let value = serde_json::to_value(&plan).unwrap();
    assert_eq!(value["scan_type"], "serpentine");
    assert_eq!(value["h_positions"], serde_json::json!([0.0, 1.0, 1.0, 0.0]));
    assert_eq!(value["indices"][2], serde_json::json!([0, 1, 1]));

    let data = ScanRunner::new()
        .run(&plan, &mut SimulatedStage::default(), &mut SimulatedCollector::new(Duration::ZERO), &CancellationToken::new())
        .unwrap();
    let value = serde_json::to_value(&data).unwrap();
    assert_eq!(value["completed"], 4);
    assert_eq!(value["shape"], serde_json::json!([1, 2, 2]));
}
