//! `revu review`: the interactive review shell.
//!
//! Reads one command per line from stdin until `quit` or end of input, then
//! saves and suspends the workflow.

use std::io::Write;

use anyhow::Context;
use clap::Parser;
use revu_core::catalog::CaseCatalog;
use revu_core::entities::{CorrectionReason, WorkflowState};
use revu_core::enums::{Judgement, WorkflowKind};
use revu_session::{Action, CaseDisplay, ReviewEngine, SliceMove, WorkflowView};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::shell::{ShellCommand, ShellLine, split_words};
use crate::cli::root_commands::ReviewArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;
use crate::ui;

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Handle `revu review`.
pub async fn handle(args: &ReviewArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let kind = parse_enum::<WorkflowKind>(&args.workflow, "workflow")?;
    let mut shell = Shell {
        engine: ctx.engine()?,
        session: ctx.session_id.clone(),
        kind,
        format: flags.format,
    };
    tracing::info!(session = %shell.session, workflow = %kind, "Review shell started");
    shell.show().await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt()?;
        let Some(line) = lines.next_line().await.context("failed to read from stdin")? else {
            break;
        };
        match shell.run_line(&line).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(error) => eprintln!("revu: {error:#}"),
        }
    }

    let report = shell.engine.save_and_suspend(&shell.session, kind).await;
    output(&report, flags.format)
}

fn prompt() -> anyhow::Result<()> {
    if ui::prefs().prompt {
        print!("revu> ");
        std::io::stdout().flush()?;
    }
    Ok(())
}

struct Shell<C> {
    engine: ReviewEngine<C>,
    session: String,
    kind: WorkflowKind,
    format: OutputFormat,
}

impl<C: CaseCatalog> Shell<C> {
    async fn run_line(&mut self, line: &str) -> anyhow::Result<Flow> {
        let words = split_words(line).map_err(anyhow::Error::msg)?;
        if words.is_empty() {
            return Ok(Flow::Continue);
        }
        let command = match ShellLine::try_parse_from(words) {
            Ok(parsed) => parsed.command,
            Err(error) => {
                // Help and usage errors go to the terminal as clap renders them.
                error.print()?;
                return Ok(Flow::Continue);
            }
        };
        self.execute(command).await
    }

    async fn execute(&mut self, command: ShellCommand) -> anyhow::Result<Flow> {
        match command {
            ShellCommand::Show => self.show().await?,
            ShellCommand::Initial { judgement } => {
                let judgement = parse_enum::<Judgement>(&judgement, "judgement")?;
                self.submit(Action::SubmitInitialJudgement(judgement)).await?;
            }
            ShellCommand::Revise { judgement } => {
                let judgement = parse_enum::<Judgement>(&judgement, "judgement")?;
                self.submit(Action::ReviseJudgement(judgement)).await?;
            }
            ShellCommand::Finalize => self.submit(Action::Finalize).await?,
            ShellCommand::Correct {
                organ,
                reason,
                other,
                detail,
            } => {
                let reason = CorrectionReason::parse(&reason, other.as_deref())?;
                self.submit(Action::AddCorrection {
                    organ,
                    reason,
                    detail: detail.join(" "),
                })
                .await?;
            }
            ShellCommand::Corrections => self.corrections().await?,
            ShellCommand::Mode { mode } => {
                let mode = parse_enum(&mode, "mode")?;
                self.submit(Action::SelectEditMode(mode)).await?;
            }
            ShellCommand::Edit { text } => self.submit(Action::EditText(text.join(" "))).await?,
            ShellCommand::Assemble => self.submit(Action::Assemble).await?,
            ShellCommand::Verdict { verdict } => {
                let verdict = parse_enum(&verdict, "verdict")?;
                self.submit(Action::SelectVerdict(verdict)).await?;
            }
            ShellCommand::Submit => {
                let action = self.submit_action()?;
                self.submit(action).await?;
            }
            ShellCommand::Next => self.navigate(SliceMove::Next).await?,
            ShellCommand::Prev => self.navigate(SliceMove::Prev).await?,
            ShellCommand::First => self.navigate(SliceMove::First).await?,
            ShellCommand::Last => self.navigate(SliceMove::Last).await?,
            ShellCommand::Save => {
                let report = self.engine.save_and_suspend(&self.session, self.kind).await;
                output(&report, self.format)?;
            }
            ShellCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    async fn show(&mut self) -> anyhow::Result<()> {
        let view = self.engine.enter_workflow(&self.session, self.kind).await;
        output(&view, self.format)
    }

    async fn submit(&mut self, action: Action) -> anyhow::Result<()> {
        let outcome = self.engine.submit(&self.session, self.kind, action).await?;
        for warning in &outcome.warnings {
            tracing::warn!(session = %self.session, "{warning}");
        }
        if outcome.advanced() {
            output(&outcome, self.format)?;
        }
        self.show().await
    }

    /// `submit` finishes the case the way the workflow expects.
    fn submit_action(&self) -> anyhow::Result<Action> {
        match self.kind {
            WorkflowKind::BlindComparison => Ok(Action::Finalize),
            WorkflowKind::ReportEditing => Ok(Action::SubmitEdit),
            WorkflowKind::StandardReview => {
                let selected = self
                    .engine
                    .runtime(&self.session, self.kind)
                    .and_then(|runtime| match runtime.progress.state {
                        WorkflowState::StandardReview { verdict } => verdict,
                        _ => None,
                    });
                selected
                    .map(Action::SubmitReview)
                    .context("choose a verdict first: verdict <a|b|corrected|equivalent>")
            }
        }
    }

    async fn corrections(&mut self) -> anyhow::Result<()> {
        match self.engine.enter_workflow(&self.session, self.kind).await {
            WorkflowView::Active(view) => match view.display {
                CaseDisplay::Review { corrections, .. } | CaseDisplay::Edit { corrections, .. } => {
                    output(&corrections, self.format)
                }
                CaseDisplay::Blind { .. } => {
                    anyhow::bail!("blind comparison does not take corrections")
                }
            },
            other => output(&other, self.format),
        }
    }

    async fn navigate(&mut self, movement: SliceMove) -> anyhow::Result<()> {
        let slices = self
            .engine
            .navigate(&self.session, self.kind, movement)
            .await;
        if !slices.visible {
            tracing::info!("Images are hidden until the initial judgement is submitted");
        }
        output(&slices, self.format)
    }
}
