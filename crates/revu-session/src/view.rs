//! Display payloads returned to the front end.

use revu_core::entities::{CaseRecord, CorrectionEntry};
use revu_core::enums::{EditMode, Judgement, Phase, Verdict, WorkflowKind};
use revu_db::store::SaveReport;
use serde::Serialize;

/// What the reviewer should see on entering a workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WorkflowView {
    Active(CaseView),
    /// Every case has been handled. A display state, not an error.
    Complete { workflow: WorkflowKind, total: usize },
    /// The case at the current position is missing from the catalog.
    CaseUnavailable {
        workflow: WorkflowKind,
        index: usize,
        case_id: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseView {
    pub session_id: String,
    pub workflow: WorkflowKind,
    pub case_id: String,
    /// Zero-based position of the case in the catalog.
    pub index: usize,
    pub total: usize,
    pub phase: Phase,
    pub display: CaseDisplay,
    pub slices: SliceView,
}

/// Workflow-specific content of a case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CaseDisplay {
    Blind {
        report_a: String,
        report_b: String,
        initial_judgement: Option<Judgement>,
        final_judgement: Option<Judgement>,
    },
    Review {
        report_a: String,
        report_b: String,
        corrections: Vec<CorrectionEntry>,
        verdict: Option<Verdict>,
        verdict_options: Vec<Verdict>,
        /// Report synthesized in the editing workflow, when one exists.
        corrected_report: Option<String>,
    },
    Edit {
        generated_report: String,
        mode: EditMode,
        buffer: String,
        corrections: Vec<CorrectionEntry>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SliceView {
    /// Images are hidden during the initial blind judgement.
    pub visible: bool,
    pub total: usize,
    pub index: Option<usize>,
    pub current: Option<String>,
    pub caption: Option<String>,
}

impl SliceView {
    pub(crate) const fn hidden(total: usize) -> Self {
        Self {
            visible: false,
            total,
            index: None,
            current: None,
            caption: None,
        }
    }
}

/// Result of [`ReviewEngine::submit`](crate::ReviewEngine::submit).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitOutcome {
    pub workflow: WorkflowKind,
    pub phase: Phase,
    pub current_index: usize,
    pub total: usize,
    /// The record of the case just finished, when the action advanced.
    pub record: Option<CaseRecord>,
    /// The automatic save that follows an advance.
    pub save: Option<SaveReport>,
    /// Non-fatal problems, e.g. an annotation that could not be stored.
    pub warnings: Vec<String>,
}

impl SubmitOutcome {
    #[must_use]
    pub const fn advanced(&self) -> bool {
        self.record.is_some()
    }
}

/// Position of one workflow, for status listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowStatus {
    pub workflow: WorkflowKind,
    pub current_index: usize,
    pub total: usize,
    pub phase: Phase,
    pub case_id: Option<String>,
    pub pending_corrections: usize,
}
