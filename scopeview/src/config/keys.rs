//! Individually addressable configuration settings.

use std::fmt;
use std::str::FromStr;

use crate::config::file::{
    parse_byte_size, parse_directory, parse_level, parse_number, parse_optional_number, parse_rate,
    parse_scan_type, parse_step, parse_tile_size,
};
use crate::config::{ConfigError, ConfigFile};

/// A `section.key` setting that can be read or written on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    ViewerTileSize,
    ViewerZValue,
    ViewerFill,
    ViewerCacheSize,
    ViewerRateLimitHz,
    ScanType,
    ScanH0,
    ScanH1,
    ScanDh,
    ScanV0,
    ScanV1,
    ScanDv,
    LoggingLevel,
    LoggingDirectory,
}

impl ConfigKey {
    /// Every key, grouped by section in file order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::ViewerTileSize,
            ConfigKey::ViewerZValue,
            ConfigKey::ViewerFill,
            ConfigKey::ViewerCacheSize,
            ConfigKey::ViewerRateLimitHz,
            ConfigKey::ScanType,
            ConfigKey::ScanH0,
            ConfigKey::ScanH1,
            ConfigKey::ScanDh,
            ConfigKey::ScanV0,
            ConfigKey::ScanV1,
            ConfigKey::ScanDv,
            ConfigKey::LoggingLevel,
            ConfigKey::LoggingDirectory,
        ]
    }

    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::ViewerTileSize
            | ConfigKey::ViewerZValue
            | ConfigKey::ViewerFill
            | ConfigKey::ViewerCacheSize
            | ConfigKey::ViewerRateLimitHz => "viewer",
            ConfigKey::ScanType
            | ConfigKey::ScanH0
            | ConfigKey::ScanH1
            | ConfigKey::ScanDh
            | ConfigKey::ScanV0
            | ConfigKey::ScanV1
            | ConfigKey::ScanDv => "scan",
            ConfigKey::LoggingLevel | ConfigKey::LoggingDirectory => "logging",
        }
    }

    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::ViewerTileSize => "tile_size",
            ConfigKey::ViewerZValue => "z_value",
            ConfigKey::ViewerFill => "fill",
            ConfigKey::ViewerCacheSize => "cache_size",
            ConfigKey::ViewerRateLimitHz => "rate_limit_hz",
            ConfigKey::ScanType => "type",
            ConfigKey::ScanH0 => "h0",
            ConfigKey::ScanH1 => "h1",
            ConfigKey::ScanDh => "dh",
            ConfigKey::ScanV0 => "v0",
            ConfigKey::ScanV1 => "v1",
            ConfigKey::ScanDv => "dv",
            ConfigKey::LoggingLevel => "level",
            ConfigKey::LoggingDirectory => "directory",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value as written to the file; empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        let viewer = &config.viewer;
        let scan = &config.scan;
        match self {
            ConfigKey::ViewerTileSize => viewer.tile_size.to_string(),
            ConfigKey::ViewerZValue => viewer.z_value.to_string(),
            ConfigKey::ViewerFill => viewer.fill.map(|f| f.to_string()).unwrap_or_default(),
            ConfigKey::ViewerCacheSize => viewer.cache_size.to_string(),
            ConfigKey::ViewerRateLimitHz => viewer.rate_limit_hz.to_string(),
            ConfigKey::ScanType => scan.scan_type.to_string(),
            ConfigKey::ScanH0 => scan.h0.to_string(),
            ConfigKey::ScanH1 => scan.h1.to_string(),
            ConfigKey::ScanDh => scan.dh.to_string(),
            ConfigKey::ScanV0 => scan.v0.to_string(),
            ConfigKey::ScanV1 => scan.v1.to_string(),
            ConfigKey::ScanDv => scan.dv.to_string(),
            ConfigKey::LoggingLevel => config.logging.level.clone(),
            ConfigKey::LoggingDirectory => config
                .logging
                .directory
                .as_ref()
                .map(|d| d.display().to_string())
                .unwrap_or_default(),
        }
    }

    /// Validate and store `value`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` and leaves `config` unchanged
    /// when `value` does not parse for this key.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        let invalid = |reason: String| ConfigError::invalid(&self.name(), value, reason);
        let viewer = &mut config.viewer;
        let scan = &mut config.scan;
        match self {
            ConfigKey::ViewerTileSize => viewer.tile_size = parse_tile_size(value).map_err(invalid)?,
            ConfigKey::ViewerZValue => viewer.z_value = parse_number(value).map_err(invalid)?,
            ConfigKey::ViewerFill => viewer.fill = parse_optional_number(value).map_err(invalid)?,
            ConfigKey::ViewerCacheSize => viewer.cache_size = parse_byte_size(value).map_err(invalid)?,
            ConfigKey::ViewerRateLimitHz => viewer.rate_limit_hz = parse_rate(value).map_err(invalid)?,
            ConfigKey::ScanType => scan.scan_type = parse_scan_type(value).map_err(invalid)?,
            ConfigKey::ScanH0 => scan.h0 = parse_number(value).map_err(invalid)?,
            ConfigKey::ScanH1 => scan.h1 = parse_number(value).map_err(invalid)?,
            ConfigKey::ScanDh => scan.dh = parse_step(value).map_err(invalid)?,
            ConfigKey::ScanV0 => scan.v0 = parse_number(value).map_err(invalid)?,
            ConfigKey::ScanV1 => scan.v1 = parse_number(value).map_err(invalid)?,
            ConfigKey::ScanDv => scan.dv = parse_step(value).map_err(invalid)?,
            ConfigKey::LoggingLevel => config.logging.level = parse_level(value).map_err(invalid)?,
            ConfigKey::LoggingDirectory => config.logging.directory = parse_directory(value).map_err(invalid)?,
        }
        Ok(())
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section(), self.key_name())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::ScanType;

    #[test]
    fn test_every_key_parses_from_its_name() {
        for key in ConfigKey::all() {
            assert_eq!(key.name().parse::<ConfigKey>().unwrap(), *key);
        }
        assert!(matches!("viewer.nope".parse::<ConfigKey>(), Err(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn test_get_reports_defaults() {
        let config = ConfigFile::default();
        assert_eq!(ConfigKey::ViewerTileSize.get(&config), "256");
        assert_eq!(ConfigKey::ViewerFill.get(&config), "");
        assert_eq!(ConfigKey::ScanType.get(&config), "raster");
        assert_eq!(ConfigKey::LoggingDirectory.get(&config), "");
    }

    #[test]
    fn test_set_then_get() {
        let mut config = ConfigFile::default();
        ConfigKey::ViewerCacheSize.set(&mut config, "1GB").unwrap();
        ConfigKey::ScanType.set(&mut config, "ortho_raster").unwrap();
        ConfigKey::ViewerFill.set(&mut config, "12.5").unwrap();

        assert_eq!(config.viewer.cache_size, 1 << 30);
        assert_eq!(config.scan.scan_type, ScanType::OrthoRaster);
        assert_eq!(ConfigKey::ViewerFill.get(&config), "12.5");

        ConfigKey::ViewerFill.set(&mut config, "").unwrap();
        assert_eq!(config.viewer.fill, None);
    }

    #[test]
    fn test_invalid_set_leaves_config_unchanged() {
        let mut config = ConfigFile::default();
        let err = ConfigKey::ScanDh.set(&mut config, "-2").unwrap_err();
        assert!(err.to_string().contains("scan.dh"));
        assert_eq!(config, ConfigFile::default());
    }
}
