//! Persistence sinks.
//!
//! Every sink stores full [`ProgressSnapshot`]s scoped by (session, workflow)
//! and can return the most recent one. Writes are appends or atomic
//! replacements so a crash mid-write leaves the previous snapshot readable.

pub mod document;
pub mod relational;
pub mod tabular;

use async_trait::async_trait;
use revu_core::enums::{SinkKind, WorkflowKind};
use revu_core::ids::sanitize_for_path;
use revu_core::snapshot::ProgressSnapshot;

use crate::error::PersistenceError;

pub use document::DocumentSink;
pub use relational::RelationalSink;
pub use tabular::TabularSink;

/// A durable destination for progress snapshots.
#[async_trait]
pub trait PersistenceSink: Send + Sync {
    fn kind(&self) -> SinkKind;

    /// Durably record `snapshot`.
    async fn write(&self, snapshot: &ProgressSnapshot) -> Result<(), PersistenceError>;

    /// The most recently written snapshot for (session, workflow), if any.
    async fn read_latest(
        &self,
        session_id: &str,
        workflow: WorkflowKind,
    ) -> Result<Option<ProgressSnapshot>, PersistenceError>;
}

/// File stem shared by the file-backed sinks: `{workflow}_{session}`.
pub(crate) fn file_stem(session_id: &str, workflow: WorkflowKind) -> String {
    format!("{}_{}", workflow.as_str(), sanitize_for_path(session_id))
}
