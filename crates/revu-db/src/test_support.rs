//! Shared test utilities for revu-db unit tests.

pub(crate) mod helpers {
    use std::sync::Arc;

    use revu_core::entities::{CorrectionEntry, CorrectionReason, WorkflowProgress};
    use revu_core::enums::WorkflowKind;
    use revu_core::snapshot::ProgressSnapshot;

    use crate::RevuDb;

    /// In-memory relational log with migrations applied.
    pub async fn test_db() -> Arc<RevuDb> {
        Arc::new(RevuDb::open_local(":memory:").await.unwrap())
    }

    /// Snapshot positioned at `index`, on case `case{index}`.
    pub fn snapshot_at(session_id: &str, workflow: WorkflowKind, index: usize) -> ProgressSnapshot {
        let mut progress = WorkflowProgress::new(workflow);
        progress.current_index = index;
        ProgressSnapshot::new(session_id, Some(format!("case{index}")), progress, None)
    }

    pub fn liver_entry(case_id: &str) -> CorrectionEntry {
        CorrectionEntry {
            case_id: case_id.into(),
            organ: "LIVER".into(),
            reason: CorrectionReason::MissingFinding,
            detail: "no lesion noted".into(),
        }
    }
}
