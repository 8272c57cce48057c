use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct StatusResponse {
    session_id: String,
    workflows: Vec<revu_session::WorkflowStatus>,
}

/// Handle `revu status`.
pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut engine = ctx.engine()?;
    let workflows = engine.status(&ctx.session_id).await;
    if flags.format == crate::cli::OutputFormat::Table {
        return output(&workflows, flags.format);
    }
    output(
        &StatusResponse {
            session_id: ctx.session_id.clone(),
            workflows,
        },
        flags.format,
    )
}
