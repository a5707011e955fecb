//! Cartesian scan patterns and the measurement loop.
//!
//! A scan visits an `Nh × Nv` grid of stage positions, possibly several
//! times (trace/retrace, orthogonal passes), writing one value per visit
//! into a `(frames, Nv, Nh)` image stack.
//!
//! ```text
//! LinearRange h, v ──► ScanPlan::generate(type) ──► ScanRunner::run
//!                        positions, slow moves,        │
//!                        [k, j, i] indices             ├─► Stage::move_*
//!                                                      └─► PixelCollector::collect
//! ```
//!
//! # Example
//!
//! ```
//! use scopeview::scan::{LinearRange, ScanPlan, ScanType};
//!
//! let h = LinearRange::from_step(25.0, 45.0, 1.0).unwrap();
//! let v = LinearRange::from_step(25.0, 45.0, 1.0).unwrap();
//! let plan = ScanPlan::generate(ScanType::Serpentine, &h, &v);
//! assert_eq!(plan.shape, (1, 21, 21));
//! ```

mod error;
mod pattern;
mod range;
mod runner;
mod simulated;

pub use error::{ScanError, ScanResult};
pub use pattern::{zigzag_3d, ScanPlan, ScanType};
pub use range::{LinearRange, MAX_AXIS_POINTS};
pub use runner::{PixelCollector, ScanData, ScanProgressCallback, ScanRunner, Stage};
pub use simulated::{SimulatedCollector, SimulatedStage};
