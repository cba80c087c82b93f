//! CLI subcommand definitions and handlers.
//!
//! - `rfid-bridge run` - Bridge the reader into the database (default)
//! - `rfid-bridge ports` - List serial ports
//! - `rfid-bridge config show|init|path` - Inspect or create the settings file

mod config;
mod ports;
mod run;

pub use config::{ConfigAction, ConfigCommand};
pub use ports::PortsCommand;
pub use run::{shutdown_signal, RunCommand};

use crate::config::Settings;
use crate::error::CliResult;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// rfid-bridge - Feed RFID reader scans into a MySQL table.
///
/// Reads one line per scan from the reader's serial port and inserts the
/// member id and allow flag as a row. Every setting defaults to the
/// values the bridge was first deployed with.
#[derive(Parser, Debug)]
#[command(name = "rfid-bridge")]
#[command(author = "HueCodes <huecodes@proton.me>")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Bridge an RFID reader on a serial port into MySQL", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute (defaults to `run`)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to custom settings file
    #[arg(long, global = true, value_name = "PATH", env = "RFID_BRIDGE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the bridge loop
    #[command(alias = "r")]
    Run(RunCommand),

    /// List serial ports
    #[command(alias = "p")]
    Ports(PortsCommand),

    /// Inspect or initialise settings
    #[command(alias = "c")]
    Config(ConfigCommand),
}

impl Cli {
    /// Default log filter for the chosen verbosity.
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }
}

/// Load settings from an explicit file, or from the default location.
pub(crate) fn load_settings(path: Option<&Path>) -> CliResult<Settings> {
    let settings = match path {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    Ok(settings)
}
