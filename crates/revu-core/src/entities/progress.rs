use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::assignment::Assignments;
use crate::enums::{EditMode, Judgement, Phase, Verdict, WorkflowKind};
use crate::errors::CoreError;
use crate::ledger::CorrectionLedger;

/// Per-case transient fields, specific to each workflow.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkflowState {
    BlindComparison {
        initial_judgement: Option<Judgement>,
        final_judgement: Option<Judgement>,
    },
    StandardReview {
        verdict: Option<Verdict>,
    },
    ReportEditing {
        mode: EditMode,
        buffer: String,
    },
}

impl WorkflowState {
    /// Blank per-case state for `kind`.
    #[must_use]
    pub const fn fresh(kind: WorkflowKind) -> Self {
        match kind {
            WorkflowKind::BlindComparison => Self::BlindComparison {
                initial_judgement: None,
                final_judgement: None,
            },
            WorkflowKind::StandardReview => Self::StandardReview { verdict: None },
            WorkflowKind::ReportEditing => Self::ReportEditing {
                mode: EditMode::Free,
                buffer: String::new(),
            },
        }
    }
}

/// A reviewer's position and sub-phase within one workflow.
///
/// Invariant: `current_index <= total` for the catalog it is used with, and
/// `current_index == total` exactly when `phase == Complete`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct WorkflowProgress {
    pub workflow: WorkflowKind,
    pub current_index: usize,
    pub phase: Phase,
    #[serde(default)]
    pub assignments: Assignments,
    #[serde(default)]
    pub ledger: CorrectionLedger,
    pub state: WorkflowState,
}

impl WorkflowProgress {
    /// Progress at the first case.
    #[must_use]
    pub const fn new(workflow: WorkflowKind) -> Self {
        Self {
            workflow,
            current_index: 0,
            phase: workflow.initial_phase(),
            assignments: Assignments::new(),
            ledger: CorrectionLedger::new(),
            state: WorkflowState::fresh(workflow),
        }
    }

    /// Progress for a catalog of `total` cases, already complete if empty.
    #[must_use]
    pub fn for_catalog(workflow: WorkflowKind, total: usize) -> Self {
        let mut progress = Self::new(workflow);
        progress.clamp_to(total);
        progress
    }

    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.phase.is_complete()
    }

    /// Move to `next`, enforcing the phase transition table.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` when the table forbids the move.
    pub fn transition(&mut self, next: Phase) -> Result<(), CoreError> {
        if !self.phase.can_transition_to(next) {
            return Err(CoreError::InvalidTransition {
                entity_type: self.workflow.to_string(),
                id: self.current_index.to_string(),
                from: self.phase.to_string(),
                to: next.to_string(),
            });
        }
        self.phase = next;
        Ok(())
    }

    /// Advance past the current case.
    ///
    /// Increments `current_index`, clears the per-case state and lands on the
    /// initial phase of the next case, or `Complete` after the last one.
    /// Returns the new index.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` if the workflow is already
    /// complete or the current phase cannot advance.
    pub fn advance(&mut self, total: usize) -> Result<usize, CoreError> {
        let next_index = self.current_index + 1;
        let next_phase = if next_index >= total {
            Phase::Complete
        } else {
            self.workflow.initial_phase()
        };
        self.transition(next_phase)?;
        self.current_index = next_index.min(total);
        self.state = WorkflowState::fresh(self.workflow);
        Ok(self.current_index)
    }

    /// Re-establish the index invariant against a catalog of `total` cases.
    ///
    /// A snapshot restored against a shorter catalog is clamped to "complete";
    /// a completed workflow whose catalog has grown reopens at its current
    /// index.
    pub fn clamp_to(&mut self, total: usize) {
        if self.current_index >= total {
            self.current_index = total;
            self.phase = Phase::Complete;
            self.state = WorkflowState::fresh(self.workflow);
        } else if self.phase.is_complete() {
            self.phase = self.workflow.initial_phase();
        }
    }
}
