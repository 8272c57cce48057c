//! Workflow kinds, phases, judgements, verdicts and sink kinds.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.
//! `Phase` provides `allowed_next_states()` to enforce valid transitions at the
//! application layer.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// WorkflowKind
// ---------------------------------------------------------------------------

/// One of the three independent review modes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowKind {
    /// Turing-style comparison: judge which report is the reference, then
    /// reconsider after the images are revealed.
    #[serde(alias = "blind-comparison", alias = "turing")]
    BlindComparison,
    /// Corrections plus a best-report verdict, images always visible.
    #[serde(alias = "standard-review", alias = "standard")]
    StandardReview,
    /// Free-text or structured editing of the generated report.
    #[serde(alias = "report-editing", alias = "edit")]
    ReportEditing,
}

impl WorkflowKind {
    pub const ALL: [Self; 3] = [
        Self::BlindComparison,
        Self::StandardReview,
        Self::ReportEditing,
    ];

    /// Phase a reviewer lands in when entering a fresh case.
    #[must_use]
    pub const fn initial_phase(self) -> Phase {
        match self {
            Self::BlindComparison => Phase::AwaitingInitialJudgement,
            Self::StandardReview => Phase::Reviewing,
            Self::ReportEditing => Phase::Editing,
        }
    }

    /// Whether the workflow shows both reports under a blinded A/B label.
    #[must_use]
    pub const fn is_blinded(self) -> bool {
        matches!(self, Self::BlindComparison | Self::StandardReview)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BlindComparison => "blind_comparison",
            Self::StandardReview => "standard_review",
            Self::ReportEditing => "report_editing",
        }
    }
}

impl fmt::Display for WorkflowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Sub-state of a workflow for the case currently under review.
///
/// ```text
/// BlindComparison:  awaiting_initial_judgement → awaiting_image_reveal_decision
///                   awaiting_image_reveal_decision → awaiting_initial_judgement (next case)
///                                                  → complete
/// StandardReview:   reviewing → reviewing (next case) | complete
/// ReportEditing:    editing → editing (next case) | complete
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    AwaitingInitialJudgement,
    AwaitingImageRevealDecision,
    Reviewing,
    Editing,
    Complete,
}

impl Phase {
    /// Valid next states from the current state.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::AwaitingInitialJudgement => &[Self::AwaitingImageRevealDecision],
            Self::AwaitingImageRevealDecision => &[Self::AwaitingInitialJudgement, Self::Complete],
            Self::Reviewing => &[Self::Reviewing, Self::Complete],
            Self::Editing => &[Self::Editing, Self::Complete],
            Self::Complete => &[],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    /// Whether image slices may be shown to the reviewer in this phase.
    #[must_use]
    pub const fn images_visible(self) -> bool {
        matches!(
            self,
            Self::AwaitingImageRevealDecision | Self::Reviewing | Self::Editing
        )
    }

    #[must_use]
    pub const fn is_complete(self) -> bool {
        matches!(self, Self::Complete)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AwaitingInitialJudgement => "awaiting_initial_judgement",
            Self::AwaitingImageRevealDecision => "awaiting_image_reveal_decision",
            Self::Reviewing => "reviewing",
            Self::Editing => "editing",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Judgement
// ---------------------------------------------------------------------------

/// Ternary answer to "which report is the reference?".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Judgement {
    A,
    B,
    #[serde(alias = "not-sure", alias = "unsure")]
    NotSure,
}

impl Judgement {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "a",
            Self::B => "b",
            Self::NotSure => "not_sure",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::A => "Report A",
            Self::B => "Report B",
            Self::NotSure => "Not sure",
        }
    }
}

impl fmt::Display for Judgement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

/// Best-report verdict submitted in a standard review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    A,
    B,
    /// Only offered when a synthesized report exists for the case.
    Corrected,
    Equivalent,
}

impl Verdict {
    /// Verdicts offered for a case, in display order.
    #[must_use]
    pub const fn options(corrected_available: bool) -> &'static [Self] {
        if corrected_available {
            &[Self::A, Self::B, Self::Corrected, Self::Equivalent]
        } else {
            &[Self::A, Self::B, Self::Equivalent]
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "a",
            Self::B => "b",
            Self::Corrected => "corrected",
            Self::Equivalent => "equivalent",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::A => "Report A is better",
            Self::B => "Report B is better",
            Self::Corrected => "Corrected Report is better",
            Self::Equivalent => "Equivalent",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EditMode
// ---------------------------------------------------------------------------

/// Report editing mode, selectable per case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EditMode {
    /// The working buffer is edited directly.
    #[default]
    Free,
    /// Corrections are added to the ledger and assembled into the buffer.
    #[serde(alias = "organ", alias = "organ_by_organ")]
    Structured,
}

impl EditMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Structured => "structured",
        }
    }
}

impl fmt::Display for EditMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SinkKind
// ---------------------------------------------------------------------------

/// Durable destinations a progress snapshot is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    /// Shared libSQL `progress_logs` table.
    Relational,
    /// Per-(session, category) JSON document.
    Document,
    /// Per-(session, category) CSV file.
    Tabular,
}

impl SinkKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Relational => "relational",
            Self::Document => "document",
            Self::Tabular => "tabular",
        }
    }
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a blind comparison's final judgement scored against the hidden
/// assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Identification {
    /// The reviewer picked the reference report.
    Correct,
    /// The reviewer picked the generated report.
    Incorrect,
    NotSure,
}

impl Identification {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Correct => "correct",
            Self::Incorrect => "incorrect",
            Self::NotSure => "not_sure",
        }
    }
}

impl fmt::Display for Identification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
