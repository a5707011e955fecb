//! Configuration file support.
//!
//! Settings live in an INI file at `<config dir>/scopeview/config.ini`:
//!
//! ```ini
//! [viewer]
//! tile_size = 256
//! z_value = 100
//! fill =
//! cache_size = 536870912
//! rate_limit_hz = 30
//!
//! [scan]
//! type = raster
//! h0 = 25
//! h1 = 45
//! dh = 1
//! v0 = 25
//! v1 = 45
//! dv = 1
//!
//! [logging]
//! level = info
//! directory =
//! ```
//!
//! Missing keys fall back to the defaults shown.

mod error;
mod file;
mod keys;
mod size;

pub use error::ConfigError;
pub use file::{config_dir, config_file_path, ConfigFile, LoggingSettings, ScanSettings, ViewerSettings};
pub use keys::ConfigKey;
pub use size::{format_size, parse_size};
