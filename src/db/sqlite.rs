use crate::db::schema::SQLITE_INIT;
use crate::error::GuessError;
use crate::service::password::{HashingOptions, PasswordService};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use tracing::info;

pub(crate) type SqlitePool = Pool<Sqlite>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    pub max_connections: u32,
    pub hashing: HashingOptions,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            max_connections: 5,
            hashing: HashingOptions::default(),
        }
    }
}

/// Accounts, games and guesses backed by a single SQLite file.
///
/// Operations live in `accounts.rs` and `games.rs`; this file owns the
/// connection pool and the startup sequence.
#[derive(Clone)]
pub struct GuessStore {
    pub(crate) pool: SqlitePool,
    pub(crate) passwords: PasswordService,
}

impl GuessStore {
    /// Open (creating if missing) the store at `path`, then create the schema
    /// and sweep games left incomplete by a previous process.
    pub async fn open(path: impl AsRef<Path>, opts: StoreOptions) -> Result<Self, GuessError> {
        let path = path.as_ref();
        let passwords = PasswordService::new(opts.hashing)?;

        let connect_opts = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(opts.max_connections)
            .connect_with(connect_opts)
            .await
            .map_err(GuessError::StorageUnavailable)?;

        let store = Self { pool, passwords };
        store.ensure_schema().await?;
        let swept = store.sweep_incomplete().await?;
        info!(path = %path.display(), swept, "guess store ready");
        Ok(store)
    }

    /// Initialize the schema by executing the bundled DDL. Safe to repeat.
    pub async fn ensure_schema(&self) -> Result<(), GuessError> {
        // sqlx::query runs one statement at a time
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s)
                .execute(&self.pool)
                .await
                .map_err(GuessError::StorageUnavailable)?;
        }
        Ok(())
    }

    /// Delete every game never marked complete; their guesses go with them.
    pub(crate) async fn sweep_incomplete(&self) -> Result<u64, GuessError> {
        let done = sqlx::query("DELETE FROM game WHERE completed = 0")
            .execute(&self.pool)
            .await?;
        let swept = done.rows_affected();
        if swept > 0 {
            info!(swept, "removed incomplete games from a previous run");
        }
        Ok(swept)
    }

    /// Wait for in-flight queries and close every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

pub(crate) fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, sqlx::Error> {
    Ok(DateTime::parse_from_rfc3339(s)
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?
        .with_timezone(&Utc))
}
