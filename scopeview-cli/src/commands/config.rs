//! Configuration CLI commands.
//!
//! `config get`, `config set`, `config list` and `config path` read and
//! write `config.ini` one `section.key` at a time.

use clap::Subcommand;
use scopeview::config::{config_file_path, ConfigFile, ConfigKey};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Get a configuration value
    Get {
        /// Configuration key in format section.key (e.g., viewer.tile_size)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key in format section.key (e.g., scan.type)
        key: String,

        /// Value to set; an empty string clears optional settings
        value: String,
    },

    /// List all configuration settings
    List,

    /// Show the configuration file path
    Path,
}

pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Get { key } => run_get(&key),
        ConfigCommands::Set { key, value } => run_set(&key, &value),
        ConfigCommands::List => run_list(),
        ConfigCommands::Path => run_path(),
    }
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        CliError::Config(format!(
            "Unknown configuration key '{}'. Use 'scopeview config list' to see available keys.",
            key
        ))
    })
}

/// Value as shown to the user; unset optional values read `(not set)`.
fn display_value(key: ConfigKey, config: &ConfigFile) -> String {
    let value = key.get(config);
    if value.is_empty() {
        "(not set)".to_string()
    } else {
        value
    }
}

fn run_get(key: &str) -> Result<(), CliError> {
    let key = parse_key(key)?;
    println!("{}", display_value(key, &ConfigFile::load()?));
    Ok(())
}

/// Validate, store and report the change as `old -> new`.
fn run_set(key: &str, value: &str) -> Result<(), CliError> {
    let key = parse_key(key)?;
    let mut config = ConfigFile::load()?;
    let previous = display_value(key, &config);

    key.set(&mut config, value)?;
    config.save()?;

    println!("{}: {} -> {}", key, previous, display_value(key, &config));
    Ok(())
}

fn run_list() -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    println!("# {}", config_file_path().display());

    let keys = ConfigKey::all();
    let width = keys.iter().map(|k| k.key_name().len()).max().unwrap_or(0);
    let mut section = None;
    for key in keys {
        if section != Some(key.section()) {
            section = Some(key.section());
            println!();
            println!("[{}]", key.section());
        }
        println!("{:<width$} = {}", key.key_name(), display_value(*key, &config), width = width);
    }

    Ok(())
}

fn run_path() -> Result<(), CliError> {
    println!("{}", config_file_path().display());
    Ok(())
}
