use clap::{Args, Subcommand, ValueEnum};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Open the interactive review shell for one workflow.
    Review(ReviewArgs),
    /// Show the resumed position of every workflow.
    Status,
    /// Show saved progress, annotations and edited reports across sessions.
    Results(ResultsArgs),
    /// Restart every workflow of the session at its first case.
    Reset(ResetArgs),
    /// Print the JSON Schema of a persisted type.
    Schema(SchemaArgs),
    /// Print the effective configuration as TOML.
    Config,
}

#[derive(Clone, Debug, Args)]
pub struct ReviewArgs {
    /// Workflow: blind-comparison, standard-review, report-editing
    #[arg(short, long)]
    pub workflow: String,
}

#[derive(Clone, Debug, Args)]
pub struct ResultsArgs {
    /// Restrict to one workflow
    #[arg(short, long)]
    pub workflow: Option<String>,

    /// Only records of the selected session
    #[arg(long)]
    pub mine: bool,
}

#[derive(Clone, Debug, Args)]
pub struct ResetArgs {
    /// Confirm the reset
    #[arg(long)]
    pub yes: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum SchemaType {
    Snapshot,
    Record,
    Correction,
}

#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    /// Type to describe
    #[arg(value_enum)]
    pub type_name: SchemaType,
}
