//! Terminal preferences settled once at startup.

use std::io::IsTerminal;
use std::sync::OnceLock;

use crate::cli::{ColorMode, GlobalFlags, OutputFormat};

/// Narrower `COLUMNS` values are ignored.
const MIN_TERM_WIDTH: usize = 40;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UiPrefs {
    pub table_color: bool,
    /// Print the `revu>` prompt before each shell line.
    pub prompt: bool,
    pub term_width: Option<usize>,
}

/// What the process is attached to.
#[derive(Clone, Copy, Debug)]
struct Terminal {
    stdout_tty: bool,
    stdin_tty: bool,
    no_color: bool,
    columns: Option<usize>,
}

impl Terminal {
    fn detect() -> Self {
        Self {
            stdout_tty: std::io::stdout().is_terminal(),
            stdin_tty: std::io::stdin().is_terminal(),
            no_color: std::env::var_os("NO_COLOR").is_some(),
            columns: std::env::var("COLUMNS")
                .ok()
                .and_then(|value| value.trim().parse().ok()),
        }
    }
}

impl UiPrefs {
    fn resolve(flags: &GlobalFlags, terminal: Terminal) -> Self {
        let tables = flags.format == OutputFormat::Table;
        let table_color = tables
            && match flags.color {
                ColorMode::Always => true,
                ColorMode::Never => false,
                ColorMode::Auto => terminal.stdout_tty && !flags.quiet && !terminal.no_color,
            };
        Self {
            table_color,
            // Piped scripts feed the shell without a prompt.
            prompt: terminal.stdin_tty && terminal.stdout_tty && !flags.quiet,
            term_width: terminal.columns.filter(|width| *width >= MIN_TERM_WIDTH),
        }
    }
}

static UI_PREFS: OnceLock<UiPrefs> = OnceLock::new();

pub fn init(flags: &GlobalFlags) {
    let prefs = UiPrefs::resolve(flags, Terminal::detect());
    if UI_PREFS.set(prefs).is_err() {
        tracing::debug!("UI preferences already initialized");
    }
}

/// Preferences from [`init`], or plain defaults before it ran.
#[must_use]
pub fn prefs() -> UiPrefs {
    UI_PREFS.get().copied().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(format: OutputFormat, color: ColorMode, quiet: bool) -> GlobalFlags {
        GlobalFlags {
            session: None,
            format,
            color,
            quiet,
            verbose: false,
            project: None,
        }
    }

    const TTY: Terminal = Terminal {
        stdout_tty: true,
        stdin_tty: true,
        no_color: false,
        columns: Some(120),
    };

    #[test]
    fn color_only_applies_to_tables() {
        let json = UiPrefs::resolve(&flags(OutputFormat::Json, ColorMode::Always, false), TTY);
        assert!(!json.table_color);
        let table = UiPrefs::resolve(&flags(OutputFormat::Table, ColorMode::Auto, false), TTY);
        assert!(table.table_color);
    }

    #[test]
    fn no_color_and_pipes_disable_auto_color() {
        let piped = Terminal {
            stdout_tty: false,
            ..TTY
        };
        let no_color = Terminal {
            no_color: true,
            ..TTY
        };
        let auto = flags(OutputFormat::Table, ColorMode::Auto, false);
        assert!(!UiPrefs::resolve(&auto, piped).table_color);
        assert!(!UiPrefs::resolve(&auto, no_color).table_color);
    }

    #[test]
    fn prompt_needs_an_interactive_terminal() {
        let scripted = Terminal {
            stdin_tty: false,
            ..TTY
        };
        let table = flags(OutputFormat::Table, ColorMode::Auto, false);
        assert!(UiPrefs::resolve(&table, TTY).prompt);
        assert!(!UiPrefs::resolve(&table, scripted).prompt);
        assert!(!UiPrefs::resolve(&flags(OutputFormat::Table, ColorMode::Auto, true), TTY).prompt);
    }

    #[test]
    fn narrow_columns_are_ignored() {
        let narrow = Terminal {
            columns: Some(20),
            ..TTY
        };
        let table = flags(OutputFormat::Table, ColorMode::Never, false);
        assert_eq!(UiPrefs::resolve(&table, narrow).term_width, None);
        assert_eq!(UiPrefs::resolve(&table, TTY).term_width, Some(120));
    }
}
