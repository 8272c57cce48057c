//! Reviewer actions accepted by [`ReviewEngine::submit`](crate::ReviewEngine::submit).

use revu_core::entities::CorrectionReason;
use revu_core::enums::{EditMode, Judgement, Verdict};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Blind comparison: first judgement, before the images are revealed.
    SubmitInitialJudgement(Judgement),
    /// Blind comparison: change the final judgement after the reveal.
    ReviseJudgement(Judgement),
    /// Blind comparison: record the case and move on.
    Finalize,
    /// Standard review, or report editing in structured mode.
    AddCorrection {
        organ: String,
        reason: CorrectionReason,
        detail: String,
    },
    /// Standard review: choose a verdict without submitting.
    SelectVerdict(Verdict),
    /// Standard review: record the verdict and the case's corrections.
    SubmitReview(Verdict),
    /// Report editing: switch between free-text and structured mode.
    SelectEditMode(EditMode),
    /// Report editing, free mode: replace the working buffer.
    EditText(String),
    /// Report editing, structured mode: rebuild the buffer from corrections.
    Assemble,
    /// Report editing: record the buffer as the edited report.
    SubmitEdit,
}

impl Action {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SubmitInitialJudgement(_) => "submit-initial-judgement",
            Self::ReviseJudgement(_) => "revise-judgement",
            Self::Finalize => "finalize",
            Self::AddCorrection { .. } => "add-correction",
            Self::SelectVerdict(_) => "select-verdict",
            Self::SubmitReview(_) => "submit-review",
            Self::SelectEditMode(_) => "select-edit-mode",
            Self::EditText(_) => "edit-text",
            Self::Assemble => "assemble",
            Self::SubmitEdit => "submit-edit",
        }
    }
}

/// Slice navigator moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceMove {
    Next,
    Prev,
    First,
    Last,
}
