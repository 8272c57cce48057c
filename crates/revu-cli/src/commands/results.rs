use revu_core::entities::{AnnotationRecord, EditedReport};
use revu_core::enums::WorkflowKind;
use revu_db::results::{ComparisonAccuracy, ComparisonOutcome, ProgressLogEntry, SessionSummary};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ResultsArgs;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct ResultsResponse {
    sessions: Vec<SessionSummary>,
    progress: Vec<ProgressLogEntry>,
    comparisons: Vec<ComparisonOutcome>,
    accuracy: Vec<ComparisonAccuracy>,
    annotations: Vec<AnnotationRecord>,
    edited_reports: Vec<EditedReport>,
}

/// Handle `revu results`.
pub async fn handle(args: &ResultsArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let workflow = args
        .workflow
        .as_deref()
        .map(|raw| parse_enum::<WorkflowKind>(raw, "workflow"))
        .transpose()?;
    let session = args.mine.then_some(ctx.session_id.as_str());

    let mut sessions = ctx.db.list_sessions().await?;
    let mut progress = ctx.db.progress_log(workflow).await?;
    let mut annotations = ctx.db.annotations(session).await?;
    let comparisons = if workflow.is_none_or(|kind| kind == WorkflowKind::BlindComparison) {
        ctx.db.comparison_outcomes(session).await?
    } else {
        Vec::new()
    };
    let accuracy = ComparisonAccuracy::summarize(&comparisons);
    let edited_reports = if workflow.is_none_or(|kind| kind == WorkflowKind::ReportEditing) {
        ctx.db.edited_reports(session).await?
    } else {
        Vec::new()
    };

    if let Some(session) = session {
        sessions.retain(|s| s.session_id == session);
        progress.retain(|entry| entry.session_id == session);
    }
    if let Some(kind) = workflow {
        annotations.retain(|record| record.workflow == kind);
    }

    output(
        &ResultsResponse {
            sessions,
            progress,
            comparisons,
            accuracy,
            annotations,
            edited_reports,
        },
        flags.format,
    )
}
