//! Application settings and paths.
//!
//! Manages XDG-compliant paths and the JSON settings file. Every default
//! matches the constants the bridge was originally deployed with, so a
//! missing settings file is a valid configuration.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

/// Global paths singleton.
static PATHS: OnceLock<Paths> = OnceLock::new();

/// Application directory paths following XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/rfid-bridge)
    pub config_dir: PathBuf,
}

impl Paths {
    /// Get the global paths instance, creating the directories on first use.
    pub fn get() -> ConfigResult<&'static Paths> {
        if let Some(paths) = PATHS.get() {
            return Ok(paths);
        }
        let paths = Self::new()?;
        Ok(PATHS.get_or_init(|| paths))
    }

    fn new() -> ConfigResult<Self> {
        let project = ProjectDirs::from("com", "rfid-bridge", "rfid-bridge")
            .ok_or(ConfigError::DirectoryNotFound)?;

        let paths = Self {
            config_dir: project.config_dir().to_path_buf(),
        };

        fs::create_dir_all(&paths.config_dir)?;

        Ok(paths)
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }
}

/// Serial device settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialSettings {
    /// Device path or name (e.g. `/dev/ttyACM0`, `COM7`).
    pub device: String,
    /// Line speed.
    pub baud_rate: u32,
    /// How long a single read may block before yielding an idle tick.
    pub read_timeout_ms: u64,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            device: default_device().to_string(),
            baud_rate: 9600,
            read_timeout_ms: 10_000,
        }
    }
}

impl SerialSettings {
    /// Read timeout as a `Duration`.
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

#[cfg(windows)]
fn default_device() -> &'static str {
    "COM7"
}

#[cfg(not(windows))]
fn default_device() -> &'static str {
    "/dev/ttyACM0"
}

/// Database connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Schema name.
    pub database: String,
    /// Target table. Must be a bare identifier.
    pub table: String,
    /// Negotiate TLS with the server. Off by default.
    pub tls: bool,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: String::new(),
            database: "rfid_read".to_string(),
            table: "rfid_data".to_string(),
            tls: false,
        }
    }
}

/// Loop behaviour settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeSettings {
    /// Sleep between iterations, in milliseconds.
    pub poll_interval_ms: u64,
    /// Total attempts for an insert that fails transiently.
    pub insert_attempts: u32,
    /// Try to reopen the serial device on each tick while it is unavailable.
    pub reopen_device: bool,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            insert_attempts: 3,
            reopen_device: true,
        }
    }
}

impl BridgeSettings {
    /// Poll interval as a `Duration`.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Application-wide settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub serial: SerialSettings,
    pub database: DatabaseSettings,
    pub bridge: BridgeSettings,
}

impl Settings {
    /// Load settings from the default location.
    pub fn load() -> ConfigResult<Self> {
        let file = Paths::get()?.settings_file();

        if !file.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&file)
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))
    }

    /// Save settings to the default location, returning the file written.
    pub fn save(&self) -> ConfigResult<PathBuf> {
        let file = Paths::get()?.settings_file();
        self.save_to(&file)?;
        Ok(file)
    }

    /// Save settings to a specific file.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| ConfigError::WriteFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Check that the settings describe something the bridge can run with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.serial.device.trim().is_empty() {
            return Err(invalid("serial.device", "cannot be empty"));
        }
        if self.serial.baud_rate == 0 {
            return Err(invalid("serial.baud_rate", "must be greater than 0"));
        }
        if self.bridge.poll_interval_ms == 0 {
            return Err(invalid("bridge.poll_interval_ms", "must be greater than 0"));
        }
        if self.bridge.insert_attempts == 0 {
            return Err(invalid("bridge.insert_attempts", "must be at least 1"));
        }
        if self.database.table.is_empty()
            || !self
                .database
                .table
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(invalid(
                "database.table",
                "can only contain ASCII letters, digits and underscores",
            ));
        }
        Ok(())
    }
}

fn invalid(key: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        reason: reason.to_string(),
    }
}
