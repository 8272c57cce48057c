use revu_db::store::SaveReport;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ResetArgs;
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct ResetResponse {
    session_id: String,
    saves: Vec<SaveReport>,
}

/// Handle `revu reset`.
pub async fn handle(args: &ResetArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    if !args.yes {
        anyhow::bail!(
            "reset restarts every workflow of session '{}' at the first case; re-run with --yes",
            ctx.session_id
        );
    }

    let mut engine = ctx.engine()?;
    let saves = engine.reset_all(&ctx.session_id).await;
    if saves.iter().any(|save| !save.is_durable()) {
        tracing::error!(session = %ctx.session_id, "Reset was not persisted by any sink for some workflows");
    }
    output(
        &ResetResponse {
            session_id: ctx.session_id.clone(),
            saves,
        },
        flags.format,
    )
}
