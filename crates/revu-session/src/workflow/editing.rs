//! Report editing, in free-text or structured mode.
//!
//! Free mode edits the working buffer directly; it starts as the generated
//! report. Structured mode collects corrections and `assemble` rewrites the
//! buffer from them, one `"<organ>: <reason> - <detail>"` line per entry.

use chrono::Utc;
use revu_core::entities::{
    CaseRecord, CorrectionEntry, EditedReport, WorkflowProgress, WorkflowState,
};
use revu_core::enums::EditMode;

use crate::action::Action;
use crate::error::EngineError;
use crate::workflow::{CaseContext, Effect, SideRecord, invalid, unsupported};

pub(crate) fn apply(
    progress: &mut WorkflowProgress,
    ctx: &CaseContext<'_>,
    action: Action,
) -> Result<Effect, EngineError> {
    let (mode, buffer) = match &progress.state {
        WorkflowState::ReportEditing { mode, buffer } => (*mode, buffer.clone()),
        _ => return Err(invalid(progress, "editing state missing")),
    };

    match action {
        Action::SelectEditMode(next) => {
            if next != mode {
                let buffer = match next {
                    EditMode::Free => ctx.generated_text.to_string(),
                    EditMode::Structured => progress.ledger.assemble(ctx.case_id),
                };
                progress.state = WorkflowState::ReportEditing { mode: next, buffer };
            }
            Ok(Effect::Stay)
        }
        Action::EditText(text) => {
            require_mode(progress, mode, EditMode::Free)?;
            progress.state = WorkflowState::ReportEditing { mode, buffer: text };
            Ok(Effect::Stay)
        }
        Action::AddCorrection {
            organ,
            reason,
            detail,
        } => {
            require_mode(progress, mode, EditMode::Structured)?;
            progress.ledger.add(CorrectionEntry {
                case_id: ctx.case_id.to_string(),
                organ,
                reason,
                detail,
            });
            Ok(Effect::Stay)
        }
        Action::Assemble => {
            require_mode(progress, mode, EditMode::Structured)?;
            progress.state = WorkflowState::ReportEditing {
                mode,
                buffer: progress.ledger.assemble(ctx.case_id),
            };
            Ok(Effect::Stay)
        }
        Action::SubmitEdit => {
            let corrections = progress.ledger.clear_for_case(ctx.case_id);
            let recorded_at = Utc::now();
            Ok(Effect::Advance {
                record: CaseRecord::Edit {
                    case_id: ctx.case_id.to_string(),
                    mode,
                    report: buffer.clone(),
                    corrections: corrections.clone(),
                    recorded_at,
                },
                side: Some(SideRecord::EditedReport(EditedReport {
                    session_id: ctx.session_id.to_string(),
                    case_id: ctx.case_id.to_string(),
                    mode,
                    report: buffer,
                    corrections,
                    recorded_at,
                })),
            })
        }
        other => Err(unsupported(progress, &other)),
    }
}

fn require_mode(
    progress: &WorkflowProgress,
    mode: EditMode,
    required: EditMode,
) -> Result<(), EngineError> {
    if mode == required {
        Ok(())
    } else {
        Err(invalid(
            progress,
            format!("only available in {required} mode (current mode: {mode})"),
        ))
    }
}

/// Seed a fresh case: free mode starts from the generated report.
pub(crate) fn seed_buffer(progress: &mut WorkflowProgress, generated_text: &str) {
    if let WorkflowState::ReportEditing {
        mode: EditMode::Free,
        buffer,
    } = &mut progress.state
        && buffer.is_empty()
    {
        *buffer = generated_text.to_string();
    }
}
