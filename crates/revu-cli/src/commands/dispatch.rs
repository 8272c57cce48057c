use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(
    command: Commands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Review(args) => commands::review::handle(&args, ctx, flags).await,
        Commands::Status => commands::status::handle(ctx, flags).await,
        Commands::Results(args) => commands::results::handle(&args, ctx, flags).await,
        Commands::Reset(args) => commands::reset::handle(&args, ctx, flags).await,
        Commands::Schema(args) => commands::schema::handle(&args, flags),
        Commands::Config => commands::config::handle(&ctx.config, flags),
    }
}
