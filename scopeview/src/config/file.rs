//! The INI configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use ini::{Ini, Properties};
use tracing::debug;

use crate::cache::DEFAULT_CACHE_SIZE_BYTES;
use crate::config::{parse_size, ConfigError};
use crate::logging::LoggingConfig;
use crate::scan::{LinearRange, ScanResult, ScanType};
use crate::throttle::DEFAULT_RATE_LIMIT_HZ;
use crate::viewer::{ViewerConfig, DEFAULT_BASE_PRIORITY, DEFAULT_TILE_SIZE};

/// Directory holding the configuration file.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("scopeview")
}

/// Default location of `config.ini`.
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.ini")
}

/// `[viewer]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerSettings {
    pub tile_size: u32,
    /// Stacking priority of full-resolution tiles.
    pub z_value: i32,
    /// Edge padding value; `None` pads with zero.
    pub fill: Option<f64>,
    /// Tile cache budget in bytes.
    pub cache_size: u64,
    pub rate_limit_hz: f64,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            z_value: DEFAULT_BASE_PRIORITY,
            fill: None,
            cache_size: DEFAULT_CACHE_SIZE_BYTES,
            rate_limit_hz: DEFAULT_RATE_LIMIT_HZ,
        }
    }
}

impl ViewerSettings {
    pub fn to_viewer_config(&self) -> ViewerConfig {
        ViewerConfig {
            tile_size: self.tile_size,
            base_priority: self.z_value,
            fill: self.fill,
            cache_size_bytes: self.cache_size,
        }
    }
}

/// `[scan]` section. Positions are in µm.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanSettings {
    pub scan_type: ScanType,
    pub h0: f64,
    pub h1: f64,
    pub dh: f64,
    pub v0: f64,
    pub v1: f64,
    pub dv: f64,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            scan_type: ScanType::Raster,
            h0: 25.0,
            h1: 45.0,
            dh: 1.0,
            v0: 25.0,
            v1: 45.0,
            dv: 1.0,
        }
    }
}

impl ScanSettings {
    /// Horizontal and vertical axis ranges.
    pub fn ranges(&self) -> ScanResult<(LinearRange, LinearRange)> {
        Ok((
            LinearRange::from_step(self.h0, self.h1, self.dh)?,
            LinearRange::from_step(self.v0, self.v1, self.dv)?,
        ))
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,
    /// Directory for daily log files; stderr only when unset.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

impl LoggingSettings {
    pub fn to_logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.level.clone(),
            directory: self.directory.clone(),
            ..LoggingConfig::default()
        }
    }
}

/// Parsed configuration file. Missing keys take their defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub viewer: ViewerSettings,
    pub scan: ScanSettings,
    pub logging: LoggingSettings,
}

impl ConfigFile {
    /// Load from the default location, or defaults if the file is absent.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Load from `path`, or defaults if the file is absent.
    ///
    /// # Errors
    ///
    /// Fails on unreadable files, malformed INI and invalid values.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| match e {
            ini::Error::Io(source) => ConfigError::Io {
                path: path.to_path_buf(),
                source,
            },
            ini::Error::Parse(e) => ConfigError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            },
        })?;

        let config = Self::from_ini(&ini)?;
        debug!(path = %path.display(), "Config file loaded");
        Ok(config)
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Save to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_error = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        self.to_ini().write_to_file(path).map_err(io_error)?;
        debug!(path = %path.display(), "Config file saved");
        Ok(())
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(section) = ini.section(Some("viewer")) {
            let viewer = &mut config.viewer;
            read(section, "viewer", "tile_size", &mut viewer.tile_size, parse_tile_size)?;
            read(section, "viewer", "z_value", &mut viewer.z_value, parse_number)?;
            read(section, "viewer", "fill", &mut viewer.fill, parse_optional_number)?;
            read(section, "viewer", "cache_size", &mut viewer.cache_size, parse_byte_size)?;
            read(section, "viewer", "rate_limit_hz", &mut viewer.rate_limit_hz, parse_rate)?;
        }

        if let Some(section) = ini.section(Some("scan")) {
            let scan = &mut config.scan;
            read(section, "scan", "type", &mut scan.scan_type, parse_scan_type)?;
            read(section, "scan", "h0", &mut scan.h0, parse_number)?;
            read(section, "scan", "h1", &mut scan.h1, parse_number)?;
            read(section, "scan", "dh", &mut scan.dh, parse_step)?;
            read(section, "scan", "v0", &mut scan.v0, parse_number)?;
            read(section, "scan", "v1", &mut scan.v1, parse_number)?;
            read(section, "scan", "dv", &mut scan.dv, parse_step)?;
        }

        if let Some(section) = ini.section(Some("logging")) {
            let logging = &mut config.logging;
            read(section, "logging", "level", &mut logging.level, parse_level)?;
            read(section, "logging", "directory", &mut logging.directory, parse_directory)?;
        }

        Ok(config)
    }

    fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        let fill = self.viewer.fill.map(|f| f.to_string()).unwrap_or_default();
        ini.with_section(Some("viewer"))
            .set("tile_size", self.viewer.tile_size.to_string())
            .set("z_value", self.viewer.z_value.to_string())
            .set("fill", fill)
            .set("cache_size", self.viewer.cache_size.to_string())
            .set("rate_limit_hz", self.viewer.rate_limit_hz.to_string());
        ini.with_section(Some("scan"))
            .set("type", self.scan.scan_type.to_string())
            .set("h0", self.scan.h0.to_string())
            .set("h1", self.scan.h1.to_string())
            .set("dh", self.scan.dh.to_string())
            .set("v0", self.scan.v0.to_string())
            .set("v1", self.scan.v1.to_string())
            .set("dv", self.scan.dv.to_string());
        let directory = self
            .logging
            .directory
            .as_ref()
            .map(|d| d.display().to_string())
            .unwrap_or_default();
        ini.with_section(Some("logging"))
            .set("level", self.logging.level.clone())
            .set("directory", directory);
        ini
    }
}

/// Parse `section.key` into `target` if present.
fn read<T>(
    props: &Properties,
    section: &str,
    key: &str,
    target: &mut T,
    parse: fn(&str) -> Result<T, String>,
) -> Result<(), ConfigError> {
    if let Some(raw) = props.get(key) {
        *target = parse(raw.trim()).map_err(|reason| ConfigError::invalid(&format!("{}.{}", section, key), raw, reason))?;
    }
    Ok(())
}

pub(crate) fn parse_number<T: std::str::FromStr>(value: &str) -> Result<T, String> {
    value.parse().map_err(|_| "not a number".to_string())
}

pub(crate) fn parse_tile_size(value: &str) -> Result<u32, String> {
    match parse_number::<u32>(value)? {
        0 => Err("must be positive".to_string()),
        size => Ok(size),
    }
}

pub(crate) fn parse_optional_number(value: &str) -> Result<Option<f64>, String> {
    if value.is_empty() {
        return Ok(None);
    }
    let number: f64 = parse_number(value)?;
    if number.is_finite() {
        Ok(Some(number))
    } else {
        Err("must be finite".to_string())
    }
}

pub(crate) fn parse_byte_size(value: &str) -> Result<u64, String> {
    parse_size(value).ok_or_else(|| "expected a size such as 536870912 or 512MB".to_string())
}

pub(crate) fn parse_rate(value: &str) -> Result<f64, String> {
    let rate: f64 = parse_number(value)?;
    if rate.is_finite() && rate >= 0.0 {
        Ok(rate)
    } else {
        Err("must be zero (unlimited) or a positive rate".to_string())
    }
}

pub(crate) fn parse_step(value: &str) -> Result<f64, String> {
    let step: f64 = parse_number(value)?;
    if step.is_finite() && step > 0.0 {
        Ok(step)
    } else {
        Err("must be positive".to_string())
    }
}

pub(crate) fn parse_scan_type(value: &str) -> Result<ScanType, String> {
    value.parse().map_err(|e: crate::scan::ScanError| e.to_string())
}

pub(crate) fn parse_level(value: &str) -> Result<String, String> {
    if value.is_empty() {
        Err("must not be empty".to_string())
    } else {
        Ok(value.to_string())
    }
}

pub(crate) fn parse_directory(value: &str) -> Result<Option<PathBuf>, String> {
    if value.is_empty() {
        Ok(None)
    } else {
        Ok(Some(PathBuf::from(value)))
    }
}
