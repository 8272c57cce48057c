use clap::Parser;

pub mod global;
pub mod root_commands;
pub mod shell;

pub use global::{ColorMode, GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `revu` binary.
#[derive(Debug, Parser)]
#[command(name = "revu", version, about = "revu - blinded review of generated reports")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Session (reviewer) id; defaults to `general.reviewer`, else a random id
    #[arg(short, long, global = true)]
    pub session: Option<String>,

    /// Output format: json, table, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Table colors: auto, always, never
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorMode,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project root path (defaults to auto-detect via .revu)
    #[arg(short, long, global = true)]
    pub project: Option<String>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            session: self.session.clone(),
            format: self.format,
            color: self.color,
            quiet: self.quiet,
            verbose: self.verbose,
            project: self.project.clone(),
        }
    }
}
