//! Standard review: corrections plus a best-report verdict.

use chrono::Utc;
use revu_core::entities::{
    AnnotationRecord, CaseRecord, CorrectionEntry, WorkflowProgress, WorkflowState,
};
use revu_core::enums::{Verdict, WorkflowKind};

use crate::action::Action;
use crate::error::EngineError;
use crate::workflow::{CaseContext, Effect, SideRecord, invalid, unsupported};

pub(crate) fn apply(
    progress: &mut WorkflowProgress,
    ctx: &CaseContext<'_>,
    action: Action,
) -> Result<Effect, EngineError> {
    match action {
        Action::AddCorrection {
            organ,
            reason,
            detail,
        } => {
            progress.ledger.add(CorrectionEntry {
                case_id: ctx.case_id.to_string(),
                organ,
                reason,
                detail,
            });
            Ok(Effect::Stay)
        }
        Action::SelectVerdict(verdict) => {
            check_verdict(progress, ctx, verdict)?;
            progress.state = WorkflowState::StandardReview {
                verdict: Some(verdict),
            };
            Ok(Effect::Stay)
        }
        Action::SubmitReview(verdict) => {
            check_verdict(progress, ctx, verdict)?;
            let assignment = progress
                .assignments
                .get(ctx.case_id)
                .ok_or_else(|| invalid(progress, "case has no A/B assignment"))?;
            let corrections = progress.ledger.clear_for_case(ctx.case_id);
            let recorded_at = Utc::now();

            Ok(Effect::Advance {
                record: CaseRecord::Review {
                    case_id: ctx.case_id.to_string(),
                    assignment,
                    verdict,
                    corrections: corrections.clone(),
                    recorded_at,
                },
                side: Some(SideRecord::Annotation(AnnotationRecord {
                    session_id: ctx.session_id.to_string(),
                    workflow: WorkflowKind::StandardReview,
                    case_id: ctx.case_id.to_string(),
                    verdict: Some(verdict),
                    corrections,
                    recorded_at,
                })),
            })
        }
        other => Err(unsupported(progress, &other)),
    }
}

fn check_verdict(
    progress: &WorkflowProgress,
    ctx: &CaseContext<'_>,
    verdict: Verdict,
) -> Result<(), EngineError> {
    if Verdict::options(ctx.corrected_available).contains(&verdict) {
        Ok(())
    } else {
        Err(invalid(
            progress,
            "'corrected' requires a synthesized report for this case",
        ))
    }
}
