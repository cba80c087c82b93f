//! Run subcommand implementation.
//!
//! Handles `rfid-bridge run`: connects the database, opens the reader and
//! drives the bridge loop until Ctrl-C or SIGTERM.

use crate::bridge::{Bridge, BridgeStats};
use crate::config::Settings;
use crate::error::CliResult;
use crate::output;
use crate::serial::{FrameSource, SerialFrameSource};
use crate::storage::MySqlStore;
use clap::Parser;
use std::path::Path;
use tracing::warn;

/// Run the bridge loop.
#[derive(Parser, Debug, Default)]
pub struct RunCommand {
    /// Serial device (e.g. /dev/ttyACM0, COM7)
    #[arg(short = 'd', long)]
    pub device: Option<String>,

    /// Serial baud rate
    #[arg(short = 'b', long = "baud")]
    pub baud_rate: Option<u32>,

    /// Serial read timeout in milliseconds
    #[arg(long = "read-timeout")]
    pub read_timeout_ms: Option<u64>,

    /// Database host
    #[arg(long = "db-host")]
    pub db_host: Option<String>,

    /// Database port
    #[arg(long = "db-port")]
    pub db_port: Option<u16>,

    /// Database user
    #[arg(long = "db-user")]
    pub db_user: Option<String>,

    /// Database password
    #[arg(long = "db-password", env = "RFID_BRIDGE_DB_PASSWORD", hide_env_values = true)]
    pub db_password: Option<String>,

    /// Database (schema) name
    #[arg(long = "db-name")]
    pub db_name: Option<String>,

    /// Target table
    #[arg(long)]
    pub table: Option<String>,

    /// Require TLS to the database
    #[arg(long)]
    pub tls: bool,

    /// Sleep between iterations in milliseconds
    #[arg(short = 'i', long = "interval")]
    pub poll_interval_ms: Option<u64>,

    /// Attempts per insert on transient database faults
    #[arg(long = "attempts")]
    pub insert_attempts: Option<u32>,

    /// Do not try to reopen the serial device once it is lost
    #[arg(long)]
    pub no_reopen: bool,
}

impl RunCommand {
    /// Execute the run command.
    pub async fn execute(&self, config: Option<&Path>, quiet: bool) -> CliResult<BridgeStats> {
        let mut settings = super::load_settings(config)?;
        self.apply(&mut settings);
        settings.validate()?;

        if !quiet {
            output::print_bridge_header(&settings);
        }

        // A database that cannot be reached is fatal; a missing reader is not.
        let sink = MySqlStore::connect(&settings.database).await?;
        let source = SerialFrameSource::connect(settings.serial.clone());
        if !quiet && !source.is_connected() {
            output::print_warning(&format!(
                "could not open {}; continuing without a reader",
                settings.serial.device
            ));
        }

        let bridge = Bridge::new(Box::new(source), Box::new(sink), settings.bridge.clone());
        let stats = bridge.run(shutdown_signal()).await;

        if !quiet {
            output::print_stats(&stats);
        }

        Ok(stats)
    }

    /// Overlay command-line values onto loaded settings.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(ref device) = self.device {
            settings.serial.device = device.clone();
        }
        if let Some(baud) = self.baud_rate {
            settings.serial.baud_rate = baud;
        }
        if let Some(timeout) = self.read_timeout_ms {
            settings.serial.read_timeout_ms = timeout;
        }
        if let Some(ref host) = self.db_host {
            settings.database.host = host.clone();
        }
        if let Some(port) = self.db_port {
            settings.database.port = port;
        }
        if let Some(ref user) = self.db_user {
            settings.database.user = user.clone();
        }
        if let Some(ref password) = self.db_password {
            settings.database.password = password.clone();
        }
        if let Some(ref name) = self.db_name {
            settings.database.database = name.clone();
        }
        if let Some(ref table) = self.table {
            settings.database.table = table.clone();
        }
        if self.tls {
            settings.database.tls = true;
        }
        if let Some(interval) = self.poll_interval_ms {
            settings.bridge.poll_interval_ms = interval;
        }
        if let Some(attempts) = self.insert_attempts {
            settings.bridge.insert_attempts = attempts;
        }
        if self.no_reopen {
            settings.bridge.reopen_device = false;
        }
    }
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use crate::error::{CliError, StoreError};

    fn parse_run(args: &[&str]) -> RunCommand {
        let mut argv = vec!["rfid-bridge", "run"];
        argv.extend_from_slice(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Some(Commands::Run(cmd)) => cmd,
            other => panic!("expected run command, got {:?}", other),
        }
    }

    #[test]
    fn test_overrides_apply() {
        let cmd = parse_run(&[
            "--device",
            "/dev/ttyUSB0",
            "--baud",
            "115200",
            "--db-host",
            "db.local",
            "--table",
            "scans",
            "--interval",
            "500",
            "--no-reopen",
        ]);
        let mut settings = Settings::default();
        cmd.apply(&mut settings);

        assert_eq!(settings.serial.device, "/dev/ttyUSB0");
        assert_eq!(settings.serial.baud_rate, 115200);
        assert_eq!(settings.database.host, "db.local");
        assert_eq!(settings.database.table, "scans");
        assert_eq!(settings.bridge.poll_interval_ms, 500);
        assert!(!settings.bridge.reopen_device);
        assert_eq!(settings.database.user, "root");
    }

    #[test]
    fn test_no_overrides_keep_settings() {
        let mut settings = Settings::default();
        RunCommand::default().apply(&mut settings);
        assert_eq!(settings, Settings::default());
    }

    #[tokio::test]
    async fn test_unreachable_database_aborts_before_loop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut settings = Settings::default();
        settings.database.host = "127.0.0.1".to_string();
        settings.database.port = 1;
        settings.serial.device = "/dev/rfid-bridge-does-not-exist".to_string();
        settings.save_to(&path).unwrap();

        let err = RunCommand::default()
            .execute(Some(&path), true)
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Store(StoreError::Connect(_))));
    }

    #[tokio::test]
    async fn test_invalid_settings_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"bridge": {"poll_interval_ms": 0}}"#).unwrap();

        let err = RunCommand::default()
            .execute(Some(&path), true)
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }
}
