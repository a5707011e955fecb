//! Pan/zoom viewer over a lazily built image pyramid.
//!
//! # Overview
//!
//! [`ZoomableMap`] owns the source raster, a bounded tile cache and the set
//! of tiles currently attached to a [`crate::surface::PlotSurface`]. Each
//! viewport change is resolved to a single zoom level and a tile window:
//!
//! ```text
//! viewport ──► inverse transform ──► zoom factor ──► zoom = ⌊log2⌋ clamped
//!                                        │
//!                                        ▼
//!                          tile window at zoom ──► attach / detach diff
//! ```
//!
//! The coarsest level (one tile covering the whole image) is attached at
//! construction and never detached, so the image is always visible while
//! finer tiles are sampled.
//!
//! # Concurrency
//!
//! Viewport updates take a non-blocking guard. An update that finds the
//! guard held is dropped and reported as [`UpdateOutcome::Skipped`]; the
//! viewport always converges on the next change.

mod config;
mod error;
mod histogram;
mod map;
mod state;
mod viewport;

pub use config::{ViewerConfig, DEFAULT_BASE_PRIORITY, DEFAULT_TILE_SIZE};
pub use error::ViewerError;
pub use histogram::Histogram;
pub use map::{UpdateOutcome, ViewportUpdate, ZoomableMap};
pub use state::ViewState;
pub use viewport::{plan_viewport, zoom_for_factor, DegenerateReason, ViewRange, ViewportPlan};
