//! Config subcommand implementation.
//!
//! Handles `rfid-bridge config` for inspecting and creating settings.

use crate::config::{Paths, Settings};
use crate::error::{CliError, CliResult};
use crate::output;
use clap::{Parser, Subcommand};
use std::path::Path;

/// Inspect or initialise settings.
#[derive(Parser, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Settings actions.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective settings as JSON
    Show,

    /// Write default settings to the settings file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Print the path of the settings file
    Path,
}

impl ConfigCommand {
    /// Execute the config command.
    pub fn execute(&self, config: Option<&Path>) -> CliResult<()> {
        match &self.action {
            ConfigAction::Show => {
                let settings = super::load_settings(config)?;
                if let Err(e) = settings.validate() {
                    output::print_warning(&e.to_string());
                }
                output::print_settings(&settings)?;
            }
            ConfigAction::Init { force } => {
                let path = match config {
                    Some(path) => path.to_path_buf(),
                    None => Paths::get()?.settings_file(),
                };
                if path.exists() && !force {
                    return Err(CliError::Other(format!(
                        "{} already exists (use --force to overwrite)",
                        path.display()
                    )));
                }
                Settings::default().save_to(&path)?;
                output::print_success(&format!("wrote default settings to {}", path.display()));
            }
            ConfigAction::Path => {
                let path = match config {
                    Some(path) => path.to_path_buf(),
                    None => Paths::get()?.settings_file(),
                };
                println!("{}", path.display());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_defaults_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let init = ConfigCommand {
            action: ConfigAction::Init { force: false },
        };

        init.execute(Some(&path)).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), Settings::default());

        let err = init.execute(Some(&path)).unwrap_err();
        assert!(matches!(err, CliError::Other(_)));
    }

    #[test]
    fn test_init_force_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{}").unwrap();

        ConfigCommand {
            action: ConfigAction::Init { force: true },
        }
        .execute(Some(&path))
        .unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("rfid_read"));
    }
}
