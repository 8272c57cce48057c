//! `progress_logs` table sink.

use std::sync::Arc;

use async_trait::async_trait;
use revu_core::enums::{SinkKind, WorkflowKind};
use revu_core::snapshot::ProgressSnapshot;

use crate::RevuDb;
use crate::error::PersistenceError;
use crate::helpers::parse_json;
use crate::sinks::PersistenceSink;

/// Appends one row per snapshot to the shared `progress_logs` table.
///
/// Rows are ordered by the autoincrement id, so "latest" never depends on
/// clock resolution.
pub struct RelationalSink {
    db: Arc<RevuDb>,
}

impl RelationalSink {
    #[must_use]
    pub const fn new(db: Arc<RevuDb>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PersistenceSink for RelationalSink {
    fn kind(&self) -> SinkKind {
        SinkKind::Relational
    }

    async fn write(&self, snapshot: &ProgressSnapshot) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(snapshot)?;
        let key = snapshot.progress_key().to_string();
        let index = i64::try_from(snapshot.progress.current_index)
            .map_err(|e| PersistenceError::InvalidState(format!("current_index: {e}")))?;
        let saved_at = snapshot.saved_at.to_rfc3339();

        self.db
            .execute_with(
                "INSERT INTO progress_logs (session_id, category, progress_key, current_index, case_id, progress_json, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                || {
                    libsql::params![
                        snapshot.session_id.as_str(),
                        snapshot.workflow.as_str(),
                        key.as_str(),
                        index,
                        snapshot.case_id.as_deref(),
                        json.as_str(),
                        saved_at.as_str()
                    ]
                },
            )
            .await?;
        Ok(())
    }

    async fn read_latest(
        &self,
        session_id: &str,
        workflow: WorkflowKind,
    ) -> Result<Option<ProgressSnapshot>, PersistenceError> {
        let mut rows = self
            .db
            .conn()
            .query(
                "SELECT progress_json FROM progress_logs
                 WHERE session_id = ?1 AND category = ?2
                 ORDER BY id DESC LIMIT 1",
                libsql::params![session_id, workflow.as_str()],
            )
            .await?;

        match rows.next().await? {
            Some(row) => {
                let json = row.get::<String>(0)?;
                Ok(Some(parse_json(&json, "progress_json")?))
            }
            None => Ok(None),
        }
    }
}
