use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::CorrectionEntry;
use crate::enums::{EditMode, Identification, Judgement, Verdict, WorkflowKind};

/// Outcome of one finished case, carried by the snapshot written on advance.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CaseRecord {
    Comparison {
        case_id: String,
        /// `true` when the generated report was shown as Report A.
        assignment: bool,
        initial_judgement: Judgement,
        final_judgement: Judgement,
        recorded_at: DateTime<Utc>,
    },
    Review {
        case_id: String,
        assignment: bool,
        verdict: Verdict,
        corrections: Vec<CorrectionEntry>,
        recorded_at: DateTime<Utc>,
    },
    Edit {
        case_id: String,
        mode: EditMode,
        report: String,
        corrections: Vec<CorrectionEntry>,
        recorded_at: DateTime<Utc>,
    },
}

impl CaseRecord {
    #[must_use]
    pub fn case_id(&self) -> &str {
        match self {
            Self::Comparison { case_id, .. }
            | Self::Review { case_id, .. }
            | Self::Edit { case_id, .. } => case_id,
        }
    }

    #[must_use]
    pub const fn workflow(&self) -> WorkflowKind {
        match self {
            Self::Comparison { .. } => WorkflowKind::BlindComparison,
            Self::Review { .. } => WorkflowKind::StandardReview,
            Self::Edit { .. } => WorkflowKind::ReportEditing,
        }
    }

    /// Score a comparison record: did the final judgement pick the reference
    /// report? `None` for other record kinds.
    #[must_use]
    pub const fn identification(&self) -> Option<Identification> {
        match self {
            Self::Comparison {
                assignment,
                final_judgement,
                ..
            } => Some(match final_judgement {
                Judgement::NotSure => Identification::NotSure,
                // Generated-first means the reference is Report B.
                Judgement::A if !*assignment => Identification::Correct,
                Judgement::B if *assignment => Identification::Correct,
                Judgement::A | Judgement::B => Identification::Incorrect,
            }),
            _ => None,
        }
    }
}

/// Corrections and verdict submitted for a case in a standard review.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AnnotationRecord {
    pub session_id: String,
    pub workflow: WorkflowKind,
    pub case_id: String,
    pub verdict: Option<Verdict>,
    pub corrections: Vec<CorrectionEntry>,
    pub recorded_at: DateTime<Utc>,
}

/// The report a reviewer produced for a case in report editing.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct EditedReport {
    pub session_id: String,
    pub case_id: String,
    pub mode: EditMode,
    pub report: String,
    pub corrections: Vec<CorrectionEntry>,
    pub recorded_at: DateTime<Utc>,
}
