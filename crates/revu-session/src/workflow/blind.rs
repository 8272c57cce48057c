//! Blind comparison.
//!
//! ```text
//! awaiting_initial_judgement --initial--> awaiting_image_reveal_decision
//! awaiting_image_reveal_decision --revise--> (same, final judgement replaced)
//! awaiting_image_reveal_decision --finalize--> next case | complete
//! ```

use chrono::Utc;
use revu_core::entities::{CaseRecord, WorkflowProgress, WorkflowState};
use revu_core::enums::{Judgement, Phase};

use crate::action::Action;
use crate::error::EngineError;
use crate::workflow::{CaseContext, Effect, invalid, unsupported};

pub(crate) fn apply(
    progress: &mut WorkflowProgress,
    ctx: &CaseContext<'_>,
    action: Action,
) -> Result<Effect, EngineError> {
    match action {
        Action::SubmitInitialJudgement(judgement) => {
            if progress.phase != Phase::AwaitingInitialJudgement {
                return Err(invalid(progress, "initial judgement already submitted"));
            }
            progress.transition(Phase::AwaitingImageRevealDecision)?;
            progress.state = WorkflowState::BlindComparison {
                initial_judgement: Some(judgement),
                final_judgement: Some(judgement),
            };
            Ok(Effect::Stay)
        }
        Action::ReviseJudgement(judgement) => {
            if progress.phase != Phase::AwaitingImageRevealDecision {
                return Err(invalid(progress, "submit an initial judgement first"));
            }
            if let WorkflowState::BlindComparison {
                final_judgement, ..
            } = &mut progress.state
            {
                *final_judgement = Some(judgement);
            }
            Ok(Effect::Stay)
        }
        Action::Finalize => {
            if progress.phase != Phase::AwaitingImageRevealDecision {
                return Err(invalid(progress, "submit an initial judgement first"));
            }
            let (initial, last) = judgements(progress)
                .ok_or_else(|| invalid(progress, "no initial judgement recorded"))?;
            let assignment = progress
                .assignments
                .get(ctx.case_id)
                .ok_or_else(|| invalid(progress, "case has no A/B assignment"))?;
            Ok(Effect::Advance {
                record: CaseRecord::Comparison {
                    case_id: ctx.case_id.to_string(),
                    assignment,
                    initial_judgement: initial,
                    final_judgement: last,
                    recorded_at: Utc::now(),
                },
                side: None,
            })
        }
        other => Err(unsupported(progress, &other)),
    }
}

/// `(initial, final)`; the final judgement defaults to the initial one.
fn judgements(progress: &WorkflowProgress) -> Option<(Judgement, Judgement)> {
    match &progress.state {
        WorkflowState::BlindComparison {
            initial_judgement: Some(initial),
            final_judgement,
        } => Some((*initial, final_judgement.unwrap_or(*initial))),
        _ => None,
    }
}
