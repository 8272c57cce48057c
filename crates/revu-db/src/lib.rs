//! # revu-db
//!
//! Durable progress for revu review sessions.
//!
//! Three redundant sinks sit behind the [`PersistenceSink`](sinks::PersistenceSink)
//! trait:
//!
//! - **relational**: a libSQL `progress_logs` table shared by all sessions;
//! - **document**: one JSON (or JSON Lines) file per (session, workflow);
//! - **tabular**: one CSV file per (session, workflow).
//!
//! [`ProgressStore`](store::ProgressStore) fans a snapshot out to every enabled
//! sink behind an idempotent-write guard. [`AnnotationStore`](annotations::AnnotationStore)
//! keeps submitted annotations and edited reports, and the [`results`] module
//! answers cross-session queries.
//!
//! Uses the `libsql` crate (C `SQLite` fork, v0.9.29) in local mode.

pub mod annotations;
pub mod error;
pub mod helpers;
mod migrations;
pub mod results;
pub mod retry;
pub mod sinks;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

use std::path::Path;

use error::PersistenceError;
use libsql::Builder;
use retry::RetryConfig;

/// Central handle for the relational log.
///
/// Wraps a libSQL database and one connection. Sinks and stores share it
/// through an `Arc`.
pub struct RevuDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
    retry: RetryConfig,
}

impl RevuDb {
    /// Open a local database at the given path (`":memory:"` for in-memory).
    ///
    /// Creates the parent directory when needed and runs migrations.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, PersistenceError> {
        Self::open_with(path, 5_000, RetryConfig::default()).await
    }

    /// Open with an explicit busy timeout and retry policy.
    ///
    /// # Errors
    ///
    /// Same as [`Self::open_local`].
    pub async fn open_with(
        path: &str,
        busy_timeout_ms: u64,
        retry: RetryConfig,
    ) -> Result<Self, PersistenceError> {
        if path != ":memory:"
            && let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // PRAGMA busy_timeout returns a row, so it goes through query().
        conn.query(&format!("PRAGMA busy_timeout = {busy_timeout_ms}"), ())
            .await
            .map_err(|e| PersistenceError::Migration(format!("PRAGMA busy_timeout: {e}")))?;

        let revu_db = Self { db, conn, retry };
        revu_db.run_migrations().await?;
        tracing::debug!(path, "Opened relational log");
        Ok(revu_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    #[must_use]
    pub const fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Execute a write statement, retrying on lock contention.
    ///
    /// `params` is a closure because libSQL consumes the parameter list on
    /// every attempt.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::LibSql` once retries are exhausted or on
    /// any non-contention error.
    pub async fn execute_with<P, F>(&self, sql: &str, params: F) -> Result<u64, PersistenceError>
    where
        F: Fn() -> P,
        P: libsql::params::IntoParams,
    {
        let rows = retry::with_retry(&self.retry, || self.conn.execute(sql, params())).await?;
        Ok(rows)
    }
}
