//! ScopeView CLI - Command-line interface
//!
//! Inspect image pyramids, replay viewport sequences headlessly, plan and
//! simulate stage scans, and manage the configuration file.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use console::style;

use commands::config::ConfigCommands;
use commands::scan::ScanCommands;
use error::CliError;

/// Tiled pyramid viewer and scan-pattern tooling.
#[derive(Debug, Parser)]
#[command(name = "scopeview", version, about)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show the pyramid levels of an image
    Pyramid {
        /// Image file (PNG, TIFF, JPEG, ...)
        image: PathBuf,

        /// Tile edge length in pixels (default: config viewer.tile_size)
        #[arg(long)]
        tile_size: Option<u32>,
    },

    /// Replay a zoom-out sequence against a headless surface
    View {
        /// Image file (PNG, TIFF, JPEG, ...)
        image: PathBuf,

        /// Number of zoom-out steps, each doubling the device pixel size
        #[arg(long, default_value_t = 4)]
        zoom_steps: u32,

        /// Tile edge length in pixels (default: config viewer.tile_size)
        #[arg(long)]
        tile_size: Option<u32>,
    },

    /// Plan or simulate stage scans
    #[command(subcommand)]
    Scan(ScanCommands),

    /// View or modify configuration settings
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Pyramid { image, tile_size } => commands::pyramid::run(&image, tile_size, cli.verbose),
        Commands::View {
            image,
            zoom_steps,
            tile_size,
        } => commands::view::run(commands::view::ViewArgs {
            image,
            zoom_steps,
            tile_size,
            verbose: cli.verbose,
        }),
        Commands::Scan(command) => commands::scan::run(command, cli.verbose),
        Commands::Config(command) => commands::config::run(command),
    }
}
