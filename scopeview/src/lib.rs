//! ScopeView - Tiled image viewing and scan planning for microscopy data
//!
//! This library provides a level-of-detail tile viewer for large rasters
//! and the scan-pattern engine that drives an XY-stage measurement loop.
//!
//! # Modules
//!
//! - [`viewer`] - Pan/zoom viewer that keeps the visible tile set in sync
//!   with the viewport
//! - [`coord`], [`tile`], [`cache`] - Pyramid index arithmetic, tile
//!   sampling and the bounded tile cache
//! - [`surface`] - The render surface contract and a headless recorder
//! - [`throttle`] - Rate limiting of viewport changes
//! - [`scan`] - Scan patterns and the measurement loop
//! - [`config`], [`logging`] - Configuration file and tracing setup

pub mod cache;
pub mod config;
pub mod coord;
pub mod logging;
pub mod raster;
pub mod scan;
pub mod surface;
pub mod throttle;
pub mod tile;
pub mod transform;
pub mod viewer;

/// Crate version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
