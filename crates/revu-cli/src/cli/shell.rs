//! Command grammar of the interactive review shell.

use clap::{Parser, Subcommand};

/// One line typed at the `revu>` prompt.
#[derive(Debug, Parser)]
#[command(
    name = "revu>",
    no_binary_name = true,
    disable_version_flag = true
)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: ShellCommand,
}

#[derive(Clone, Debug, Subcommand)]
pub enum ShellCommand {
    /// Show the current case
    Show,
    /// Blind comparison: initial judgement (a, b, not-sure)
    Initial { judgement: String },
    /// Blind comparison: revise the final judgement after the reveal
    Revise { judgement: String },
    /// Blind comparison: record the case and move on
    Finalize,
    /// Add a correction: correct <organ> <reason> [--other <text>] <detail>
    Correct {
        organ: String,
        /// measurement-error, misinterpretation, missing-finding, other
        reason: String,
        /// Free text for the `other` reason
        #[arg(long)]
        other: Option<String>,
        #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
        detail: Vec<String>,
    },
    /// List corrections logged for the current case
    Corrections,
    /// Report editing: switch between free and structured mode
    Mode { mode: String },
    /// Report editing, free mode: replace the working text
    Edit {
        #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
        text: Vec<String>,
    },
    /// Report editing, structured mode: rebuild the text from corrections
    Assemble,
    /// Standard review: choose a verdict (a, b, corrected, equivalent)
    Verdict { verdict: String },
    /// Submit the current case
    Submit,
    /// Next image slice
    Next,
    /// Previous image slice
    Prev,
    /// First image slice
    First,
    /// Last image slice
    Last,
    /// Save progress
    Save,
    /// Save progress and leave the shell
    #[command(alias = "exit")]
    Quit,
}

/// Split a shell line into words. Single and double quotes group words; a
/// backslash escapes the next character and `\n` is a newline.
pub fn split_words(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(ch) = chars.next() {
        match (quote, ch) {
            (_, '\\') => {
                let escaped = chars
                    .next()
                    .ok_or_else(|| "trailing backslash".to_string())?;
                current.push(if escaped == 'n' { '\n' } else { escaped });
                in_word = true;
            }
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(ch);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if let Some(q) = quote {
        return Err(format!("unterminated {q} quote"));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}
