//! Database migration runner.
//!
//! Embeds the SQL migration files at compile time and executes them on
//! database open. All statements use `IF NOT EXISTS` for idempotent re-running.

use crate::RevuDb;
use crate::error::PersistenceError;

/// Initial schema: progress log, annotations, edited reports.
const MIGRATION_001: &str = include_str!("../migrations/001_initial.sql");

impl RevuDb {
    /// Run all embedded migrations in sequence.
    pub(crate) async fn run_migrations(&self) -> Result<(), PersistenceError> {
        self.conn
            .execute_batch(MIGRATION_001)
            .await
            .map_err(|e| PersistenceError::Migration(format!("001_initial: {e}")))?;
        Ok(())
    }
}
