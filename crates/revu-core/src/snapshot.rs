//! Progress snapshot envelope.
//!
//! Every save writes one `ProgressSnapshot` to each enabled sink. A snapshot
//! carries the full `WorkflowProgress` needed to resume, plus the record of
//! the case that the save completed (if any).
//!
//! The `v` field supports schema versioning: snapshots written without a `v`
//! field deserialize with `v == 1` via `#[serde(default)]`.

use std::fmt;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{CaseRecord, WorkflowProgress};
use crate::enums::WorkflowKind;

/// Default snapshot version for backward compatibility.
const fn default_snapshot_version() -> u32 {
    1
}

/// Point-in-time serialization of one (session, workflow) progress.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ProgressSnapshot {
    /// Schema version. Defaults to 1 when absent.
    #[serde(default = "default_snapshot_version")]
    pub v: u32,

    pub session_id: String,

    pub workflow: WorkflowKind,

    /// Case under review at save time; `None` once the workflow is complete.
    pub case_id: Option<String>,

    pub progress: WorkflowProgress,

    /// Record of the case finished by the action that triggered this save.
    #[serde(default)]
    pub completed: Option<CaseRecord>,

    pub saved_at: DateTime<Utc>,
}

impl ProgressSnapshot {
    #[must_use]
    pub fn new(
        session_id: impl Into<String>,
        case_id: Option<String>,
        progress: WorkflowProgress,
        completed: Option<CaseRecord>,
    ) -> Self {
        Self {
            v: 1,
            session_id: session_id.into(),
            workflow: progress.workflow,
            case_id,
            progress,
            completed,
            saved_at: Utc::now(),
        }
    }

    /// The field the duplicate-save guard compares.
    ///
    /// Comparison and review workflows use the case pointer; report editing
    /// uses the id of the case being edited.
    #[must_use]
    pub fn progress_key(&self) -> ProgressKey {
        match self.workflow {
            WorkflowKind::BlindComparison | WorkflowKind::StandardReview => {
                ProgressKey::CaseIndex(self.progress.current_index)
            }
            WorkflowKind::ReportEditing => ProgressKey::EditingCase(self.case_id.clone()),
        }
    }
}

/// Identity of a save for duplicate suppression.
///
/// Only this key is compared, not the full payload: two different correction
/// sets saved at the same key collapse into the first one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProgressKey {
    CaseIndex(usize),
    EditingCase(Option<String>),
}

impl fmt::Display for ProgressKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CaseIndex(index) => write!(f, "index:{index}"),
            Self::EditingCase(Some(case_id)) => write!(f, "case:{case_id}"),
            Self::EditingCase(None) => f.write_str("case:<complete>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::Phase;

    #[test]
    fn progress_key_uses_index_for_comparison() {
        let mut progress = WorkflowProgress::new(WorkflowKind::BlindComparison);
        progress.current_index = 3;
        let snap = ProgressSnapshot::new("r1", Some("c3".into()), progress, None);
        assert_eq!(snap.progress_key(), ProgressKey::CaseIndex(3));
        assert_eq!(snap.progress_key().to_string(), "index:3");
    }

    #[test]
    fn progress_key_uses_case_for_editing() {
        let progress = WorkflowProgress::new(WorkflowKind::ReportEditing);
        let snap = ProgressSnapshot::new("r1", Some("caseA".into()), progress.clone(), None);
        assert_eq!(
            snap.progress_key(),
            ProgressKey::EditingCase(Some("caseA".into()))
        );

        let done = ProgressSnapshot::new("r1", None, progress, None);
        assert_eq!(done.progress_key().to_string(), "case:<complete>");
    }

    #[test]
    fn snapshot_default_version() {
        let progress = WorkflowProgress::new(WorkflowKind::StandardReview);
        let mut json = serde_json::to_value(ProgressSnapshot::new("r1", None, progress, None)).unwrap();
        json.as_object_mut().unwrap().remove("v");
        let snap: ProgressSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(snap.v, 1);
        assert_eq!(snap.progress.phase, Phase::Reviewing);
    }
}
