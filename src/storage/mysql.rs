//! MySQL-backed scan sink.
//!
//! Holds a single connection for the life of the bridge. Every insert
//! runs in its own transaction and is committed before the next frame
//! is read.

use super::traits::ScanSink;
use crate::config::DatabaseSettings;
use crate::error::{StoreError, StoreResult};
use crate::types::ScanRecord;
use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlSslMode};
use sqlx::{Connection, MySqlConnection};
use tracing::{debug, info, warn};

/// Scan sink writing to a MySQL table.
pub struct MySqlStore {
    options: MySqlConnectOptions,
    conn: Option<MySqlConnection>,
    insert_sql: String,
    target: String,
}

impl MySqlStore {
    /// Connect to the configured database.
    ///
    /// Fails if the server cannot be reached; the bridge treats that as fatal.
    pub async fn connect(settings: &DatabaseSettings) -> StoreResult<Self> {
        let options = connect_options(settings);
        let target = format!(
            "{}@{}:{}/{}.{}",
            settings.user, settings.host, settings.port, settings.database, settings.table
        );

        let conn = MySqlConnection::connect_with(&options)
            .await
            .map_err(|e| StoreError::Connect(format!("{}: {}", target, e)))?;
        info!(db = %target, "connected to database");

        Ok(Self {
            options,
            conn: Some(conn),
            insert_sql: insert_statement(&settings.table),
            target,
        })
    }

    async fn connection(&mut self) -> StoreResult<&mut MySqlConnection> {
        if self.conn.is_none() {
            debug!(db = %self.target, "reconnecting to database");
            let conn = MySqlConnection::connect_with(&self.options)
                .await
                .map_err(|e| StoreError::Transient(e.to_string()))?;
            self.conn = Some(conn);
        }
        self.conn
            .as_mut()
            .ok_or_else(|| StoreError::Transient("connection unavailable".to_string()))
    }

    async fn insert_once(&mut self, record: &ScanRecord) -> StoreResult<()> {
        let sql = self.insert_sql.clone();
        let conn = self.connection().await?;

        let mut tx = conn.begin().await?;
        sqlx::query(&sql)
            .bind(record.member_id.as_str())
            .bind(record.allow.as_str())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl ScanSink for MySqlStore {
    fn describe(&self) -> String {
        self.target.clone()
    }

    async fn insert(&mut self, record: &ScanRecord) -> StoreResult<()> {
        let result = self.insert_once(record).await;
        if let Err(StoreError::Transient(reason)) = &result {
            // The connection is likely dead; the next attempt opens a new one.
            warn!(db = %self.target, reason = %reason, "dropping database connection");
            self.conn = None;
        }
        result
    }

    async fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            match conn.close().await {
                Ok(()) => info!(db = %self.target, "database connection closed"),
                Err(e) => warn!(db = %self.target, error = %e, "error closing database connection"),
            }
        }
    }
}

/// Build connection options from settings.
pub fn connect_options(settings: &DatabaseSettings) -> MySqlConnectOptions {
    let ssl_mode = if settings.tls {
        MySqlSslMode::Required
    } else {
        MySqlSslMode::Disabled
    };

    MySqlConnectOptions::new()
        .host(&settings.host)
        .port(settings.port)
        .username(&settings.user)
        .password(&settings.password)
        .database(&settings.database)
        .ssl_mode(ssl_mode)
}

/// The parameterised insert for `table`. The identifier column is left to
/// auto-increment.
///
/// `table` must already be validated as a bare identifier.
pub fn insert_statement(table: &str) -> String {
    format!(
        "INSERT INTO `{}` (ID, Member_ID, allow_members) VALUES (NULL, ?, ?)",
        table
    )
}
