//! Per-workflow state machines.
//!
//! Each module applies one [`Action`] to a [`WorkflowProgress`] for the case
//! under review and reports whether the case is finished. Advancing the
//! index, persisting and resetting the navigator are left to the engine so
//! the three workflows share one advance path.

pub mod blind;
pub mod editing;
pub mod standard;

use revu_core::entities::{AnnotationRecord, CaseRecord, EditedReport, WorkflowProgress};
use revu_core::enums::WorkflowKind;
use revu_core::navigator::SliceNavigator;

use crate::action::Action;
use crate::error::EngineError;

/// In-memory state of one workflow for one session.
#[derive(Debug, Clone)]
pub struct WorkflowRuntime {
    pub progress: WorkflowProgress,
    pub navigator: SliceNavigator,
    /// Case id restored from a snapshot that the catalog no longer lists.
    pub missing_case: Option<String>,
}

/// The case an action applies to.
pub(crate) struct CaseContext<'a> {
    pub session_id: &'a str,
    pub case_id: &'a str,
    pub generated_text: &'a str,
    /// Whether a synthesized report exists for the case.
    pub corrected_available: bool,
}

/// A record stored next to the progress snapshot when a case finishes.
#[derive(Debug, Clone)]
pub(crate) enum SideRecord {
    Annotation(AnnotationRecord),
    EditedReport(EditedReport),
}

pub(crate) enum Effect {
    Stay,
    Advance {
        record: CaseRecord,
        side: Option<SideRecord>,
    },
}

pub(crate) fn apply(
    progress: &mut WorkflowProgress,
    ctx: &CaseContext<'_>,
    action: Action,
) -> Result<Effect, EngineError> {
    if progress.is_complete() {
        return Err(invalid(progress, "workflow is complete"));
    }
    match progress.workflow {
        WorkflowKind::BlindComparison => blind::apply(progress, ctx, action),
        WorkflowKind::StandardReview => standard::apply(progress, ctx, action),
        WorkflowKind::ReportEditing => editing::apply(progress, ctx, action),
    }
}

pub(crate) fn invalid(progress: &WorkflowProgress, reason: impl Into<String>) -> EngineError {
    EngineError::InvalidAction {
        workflow: progress.workflow,
        phase: progress.phase,
        reason: reason.into(),
    }
}

pub(crate) fn unsupported(progress: &WorkflowProgress, action: &Action) -> EngineError {
    invalid(
        progress,
        format!("'{}' is not available in {}", action.name(), progress.workflow),
    )
}
