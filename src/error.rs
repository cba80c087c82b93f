//! Error types for the RFID bridge.
//!
//! Uses `thiserror` for ergonomic error definitions. Each stage of the
//! bridge has its own error type so the loop can apply a different
//! policy to each class of failure.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while reading a frame from the serial device.
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("serial device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("serial read failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("frame is not valid UTF-8")]
    InvalidUtf8,

    #[error("malformed frame {line:?}: expected at least 2 tokens, got {tokens}")]
    Malformed { line: String, tokens: usize },

    #[error("frame exceeds {limit} bytes without a line ending")]
    Overlong { limit: usize },

    #[error("serial device closed")]
    Closed,
}

impl FrameError {
    /// Whether the fault lies with the device rather than the frame contents.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::DeviceUnavailable(_) | Self::Io(_) | Self::Closed)
    }
}

/// Result type alias for frame reads.
pub type FrameResult<T> = Result<T, FrameError>;

/// Errors produced while persisting a scan record.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("could not connect to database: {0}")]
    Connect(String),

    #[error("integrity conflict: {0}")]
    Conflict(String),

    #[error("transient database fault: {0}")]
    Transient(String),

    #[error("database rejected insert: {0}")]
    Rejected(String),
}

impl StoreError {
    /// Whether retrying the same insert may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        use sqlx::error::ErrorKind;

        match err {
            sqlx::Error::Database(db) => match db.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => Self::Conflict(db.message().to_string()),
                _ => Self::Rejected(db.message().to_string()),
            },
            sqlx::Error::Io(e) => Self::Transient(e.to_string()),
            sqlx::Error::Tls(e) => Self::Transient(e.to_string()),
            sqlx::Error::Protocol(msg) => Self::Transient(msg),
            e @ (sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::WorkerCrashed) => {
                Self::Transient(e.to_string())
            }
            other => Self::Rejected(other.to_string()),
        }
    }
}

/// Result type alias for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors related to configuration files and directories.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine configuration directory")]
    DirectoryNotFound,

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("failed to write {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    #[error("invalid settings format: {0}")]
    InvalidFormat(String),

    #[error("invalid setting `{key}`: {reason}")]
    InvalidValue { key: &'static str, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level error for CLI subcommands.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;
