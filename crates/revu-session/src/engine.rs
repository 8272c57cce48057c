//! The review engine.
//!
//! Holds one [`WorkflowRuntime`] per (session, workflow), loaded lazily from
//! the progress store the first time it is touched. Every operation checks
//! the runtime out of the map, works on it and checks it back in, so an
//! action that fails leaves the runtime exactly as it was.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use revu_config::{GeneralConfig, RevuConfig};
use revu_core::assignment::{CoinSource, OsCoin};
use revu_core::catalog::CaseCatalog;
use revu_core::entities::{CaseRecord, WorkflowProgress, WorkflowState};
use revu_core::enums::{Verdict, WorkflowKind};
use revu_core::errors::CoreError;
use revu_core::navigator::SliceNavigator;
use revu_core::snapshot::ProgressSnapshot;
use revu_db::RevuDb;
use revu_db::annotations::AnnotationStore;
use revu_db::error::PersistenceError;
use revu_db::retry::RetryConfig;
use revu_db::store::{ProgressStore, SaveReport};
use tracing::{debug, info, warn};

use crate::action::{Action, SliceMove};
use crate::error::EngineError;
use crate::view::{
    CaseDisplay, CaseView, SliceView, SubmitOutcome, WorkflowStatus, WorkflowView,
};
use crate::workflow::{self, CaseContext, Effect, SideRecord, WorkflowRuntime, editing};

type SessionRuntimes = BTreeMap<WorkflowKind, WorkflowRuntime>;

pub struct ReviewEngine<C> {
    catalog: C,
    store: ProgressStore,
    annotations: AnnotationStore,
    coin: Box<dyn CoinSource>,
    general: GeneralConfig,
    sessions: HashMap<String, SessionRuntimes>,
}

impl<C: CaseCatalog> ReviewEngine<C> {
    /// Build an engine over explicit stores. A/B assignments use the OS RNG.
    #[must_use]
    pub fn new(
        catalog: C,
        store: ProgressStore,
        annotations: AnnotationStore,
        general: GeneralConfig,
    ) -> Self {
        Self {
            catalog,
            store,
            annotations,
            coin: Box::new(OsCoin),
            general,
            sessions: HashMap::new(),
        }
    }

    /// Replace the coin used for new A/B assignments.
    #[must_use]
    pub fn with_coin(mut self, coin: Box<dyn CoinSource>) -> Self {
        self.coin = coin;
        self
    }

    /// Open the relational log and the configured sinks.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Persistence` if the database cannot be opened or
    /// migrated.
    pub async fn open(catalog: C, config: &RevuConfig) -> Result<Self, EngineError> {
        let storage = &config.storage;
        let db = Arc::new(
            RevuDb::open_with(
                &storage.database_path(),
                storage.busy_timeout_ms,
                RetryConfig::with_attempts(storage.retry_attempts),
            )
            .await?,
        );
        let store = ProgressStore::from_config(storage, &db);
        let annotations = AnnotationStore::new(db, Some(storage.annotations_dir()));
        Ok(Self::new(catalog, store, annotations, config.general.clone()))
    }

    #[must_use]
    pub const fn catalog(&self) -> &C {
        &self.catalog
    }

    #[must_use]
    pub const fn store(&self) -> &ProgressStore {
        &self.store
    }

    #[must_use]
    pub const fn annotations(&self) -> &AnnotationStore {
        &self.annotations
    }

    /// The in-memory runtime, if the workflow has been loaded.
    #[must_use]
    pub fn runtime(&self, session_id: &str, kind: WorkflowKind) -> Option<&WorkflowRuntime> {
        self.sessions.get(session_id)?.get(&kind)
    }

    /// Load (or resume) the workflow and describe the case under review.
    pub async fn enter_workflow(&mut self, session_id: &str, kind: WorkflowKind) -> WorkflowView {
        let runtime = self.checkout(session_id, kind).await;
        let view = self.view_of(session_id, &runtime).await;
        self.checkin(session_id, runtime);
        view
    }

    /// Apply one reviewer action.
    ///
    /// An action that finishes the case writes its side record, advances to
    /// the next case and saves a snapshot. Persistence problems past that
    /// point are reported in [`SubmitOutcome::warnings`], never raised.
    ///
    /// # Errors
    ///
    /// - `EngineError::InvalidAction` when the phase or mode forbids the
    ///   action; progress is unchanged.
    /// - `EngineError::Core(NotFound)` when the current case is not in the
    ///   catalog.
    pub async fn submit(
        &mut self,
        session_id: &str,
        kind: WorkflowKind,
        action: Action,
    ) -> Result<SubmitOutcome, EngineError> {
        let mut runtime = self.checkout(session_id, kind).await;
        let result = self.submit_on(session_id, &mut runtime, action).await;
        self.checkin(session_id, runtime);
        result
    }

    /// Move through the current case's image slices.
    ///
    /// Ignored while images are hidden. Moves past either end are clamped.
    pub async fn navigate(
        &mut self,
        session_id: &str,
        kind: WorkflowKind,
        movement: SliceMove,
    ) -> SliceView {
        let mut runtime = self.checkout(session_id, kind).await;
        if runtime.progress.phase.images_visible() {
            match movement {
                SliceMove::Next => runtime.navigator.next(),
                SliceMove::Prev => runtime.navigator.prev(),
                SliceMove::First => runtime.navigator.first(),
                SliceMove::Last => runtime.navigator.last(),
            }
        }
        let view = self
            .current_case(&runtime)
            .map_or_else(|| SliceView::hidden(0), |case_id| self.slice_view(&runtime, &case_id));
        self.checkin(session_id, runtime);
        view
    }

    /// Persist the current position through the duplicate-save guard.
    ///
    /// The in-memory runtime stays authoritative for this engine; a new
    /// engine resumes from whatever the sinks hold.
    pub async fn save_and_suspend(&mut self, session_id: &str, kind: WorkflowKind) -> SaveReport {
        let runtime = self.checkout(session_id, kind).await;
        let snapshot = ProgressSnapshot::new(
            session_id,
            self.snapshot_case(&runtime),
            runtime.progress.clone(),
            None,
        );
        let report = self.store.save(&snapshot).await;

        if report.is_durable() {
            info!(
                session = session_id,
                workflow = %kind,
                index = runtime.progress.current_index,
                skipped = report.skipped,
                "Suspended workflow"
            );
        } else {
            warn!(session = session_id, workflow = %kind, "Progress not persisted; it is held in memory only");
        }
        self.checkin(session_id, runtime);
        report
    }

    /// Restart every workflow of the session at its first case.
    ///
    /// The fresh state is written past the guard so it survives a restart.
    /// Recorded annotations and edited reports are kept.
    pub async fn reset_all(&mut self, session_id: &str) -> Vec<SaveReport> {
        let total = self.catalog.len();
        let mut reports = Vec::with_capacity(WorkflowKind::ALL.len());

        for kind in WorkflowKind::ALL {
            let mut progress = WorkflowProgress::for_catalog(kind, total);
            self.prepare_case(&mut progress, true);
            let runtime = WorkflowRuntime {
                navigator: self.navigator_for(&progress),
                progress,
                missing_case: None,
            };
            let snapshot = ProgressSnapshot::new(
                session_id,
                self.snapshot_case(&runtime),
                runtime.progress.clone(),
                None,
            );
            reports.push(self.store.save_forced(&snapshot).await);
            self.checkin(session_id, runtime);
        }

        info!(session = session_id, "Reset all workflows");
        reports
    }

    /// Position of each workflow, loading any not yet in memory.
    pub async fn status(&mut self, session_id: &str) -> Vec<WorkflowStatus> {
        let total = self.catalog.len();
        let mut statuses = Vec::with_capacity(WorkflowKind::ALL.len());

        for kind in WorkflowKind::ALL {
            let runtime = self.checkout(session_id, kind).await;
            let case_id = self.snapshot_case(&runtime);
            let pending_corrections = case_id
                .as_deref()
                .map_or(0, |id| runtime.progress.ledger.count_for_case(id));
            statuses.push(WorkflowStatus {
                workflow: kind,
                current_index: runtime.progress.current_index,
                total,
                phase: runtime.progress.phase,
                case_id,
                pending_corrections,
            });
            self.checkin(session_id, runtime);
        }
        statuses
    }

    async fn submit_on(
        &mut self,
        session_id: &str,
        runtime: &mut WorkflowRuntime,
        action: Action,
    ) -> Result<SubmitOutcome, EngineError> {
        let total = self.catalog.len();
        if runtime.progress.is_complete() {
            return Err(workflow::invalid(&runtime.progress, "workflow is complete"));
        }
        let case_id = self.current_case(runtime).ok_or_else(|| CoreError::NotFound {
            entity_type: "case".into(),
            id: runtime
                .missing_case
                .clone()
                .unwrap_or_else(|| format!("#{}", runtime.progress.current_index)),
        })?;
        let action = self.canonicalize(&runtime.progress, action)?;

        let generated_text = self.catalog.load_generated_text(&case_id);
        let corrected_available = runtime.progress.workflow == WorkflowKind::StandardReview
            && self.corrected_report(session_id, &case_id).await.is_some();
        let ctx = CaseContext {
            session_id,
            case_id: &case_id,
            generated_text: &generated_text,
            corrected_available,
        };

        let action_name = action.name();
        let mut progress = runtime.progress.clone();
        let Effect::Advance { record, side } = workflow::apply(&mut progress, &ctx, action)? else {
            debug!(session = session_id, case = %case_id, action = action_name, "Applied action");
            runtime.progress = progress;
            return Ok(outcome(&runtime.progress, total, None, None, Vec::new()));
        };

        progress.advance(total)?;

        let mut warnings = Vec::new();
        if let Some(side) = side
            && let Err(e) = self.write_side(&side).await
        {
            warn!(session = session_id, case = %case_id, "Failed to store case record: {e}");
            warnings.push(format!("case record not stored: {e}"));
        }

        self.prepare_case(&mut progress, true);
        runtime.navigator = self.navigator_for(&progress);
        runtime.progress = progress;

        let snapshot = ProgressSnapshot::new(
            session_id,
            self.snapshot_case(runtime),
            runtime.progress.clone(),
            Some(record.clone()),
        );
        let save = self.store.save(&snapshot).await;
        warnings.extend(save.failures.iter().map(|f| format!("{f}")));
        if !save.is_durable() {
            warnings.push("progress is held in memory only".into());
        }

        info!(
            session = session_id,
            workflow = %runtime.progress.workflow,
            case = %case_id,
            index = runtime.progress.current_index,
            "Case recorded"
        );
        Ok(outcome(
            &runtime.progress,
            total,
            Some(record),
            Some(save),
            warnings,
        ))
    }

    async fn checkout(&mut self, session_id: &str, kind: WorkflowKind) -> WorkflowRuntime {
        if let Some(runtime) = self
            .sessions
            .get_mut(session_id)
            .and_then(|runtimes| runtimes.remove(&kind))
        {
            return runtime;
        }
        self.load_runtime(session_id, kind).await
    }

    fn checkin(&mut self, session_id: &str, runtime: WorkflowRuntime) {
        self.sessions
            .entry(session_id.to_string())
            .or_default()
            .insert(runtime.progress.workflow, runtime);
    }

    /// Resume from the newest snapshot any sink holds. Assignments only the
    /// older snapshots know about are merged in.
    async fn load_runtime(&mut self, session_id: &str, kind: WorkflowKind) -> WorkflowRuntime {
        let total = self.catalog.len();
        let mut snapshots = self
            .store
            .load_all(session_id, kind)
            .await
            .into_iter()
            .filter(|(sink, snapshot)| {
                let matches = snapshot.workflow == kind;
                if !matches {
                    warn!(%sink, session = session_id, %kind, found = %snapshot.workflow, "Ignoring snapshot for another workflow");
                }
                matches
            });

        let Some((source, snapshot)) = snapshots.next() else {
            let mut progress = WorkflowProgress::for_catalog(kind, total);
            self.prepare_case(&mut progress, true);
            debug!(session = session_id, workflow = %kind, "Starting fresh progress");
            return WorkflowRuntime {
                navigator: self.navigator_for(&progress),
                progress,
                missing_case: None,
            };
        };

        let saved_case = snapshot.case_id;
        let mut progress = snapshot.progress;
        for (sink, other) in snapshots {
            for conflict in progress.assignments.merge(&other.progress.assignments) {
                warn!(%sink, session = session_id, workflow = %kind, "Assignment conflict between sinks: {conflict}");
            }
        }
        progress.clamp_to(total);

        let missing_case = saved_case.filter(|id| !progress.is_complete() && !self.catalog.contains(id));
        if let Some(id) = &missing_case {
            warn!(session = session_id, workflow = %kind, case = %id, "Saved case is not in the catalog");
        } else {
            self.prepare_case(&mut progress, false);
        }

        info!(
            sink = %source,
            session = session_id,
            workflow = %kind,
            index = progress.current_index,
            phase = %progress.phase,
            "Resumed progress"
        );
        WorkflowRuntime {
            navigator: self.navigator_for(&progress),
            progress,
            missing_case,
        }
    }

    /// Draw the A/B assignment for the case under review, and seed the edit
    /// buffer of a freshly entered case.
    fn prepare_case(&mut self, progress: &mut WorkflowProgress, seed: bool) {
        let Some(case_id) = self.case_at(progress) else {
            return;
        };
        if progress.workflow.is_blinded() {
            progress
                .assignments
                .get_or_assign(&case_id, self.coin.as_mut());
        }
        if seed && progress.workflow == WorkflowKind::ReportEditing {
            editing::seed_buffer(progress, &self.catalog.load_generated_text(&case_id));
        }
    }

    fn case_at(&self, progress: &WorkflowProgress) -> Option<String> {
        if progress.is_complete() {
            return None;
        }
        self.catalog
            .list_cases()
            .get(progress.current_index)
            .cloned()
    }

    fn current_case(&self, runtime: &WorkflowRuntime) -> Option<String> {
        if runtime.missing_case.is_some() {
            return None;
        }
        self.case_at(&runtime.progress)
    }

    /// Case id recorded in snapshots; a missing case keeps its saved id.
    fn snapshot_case(&self, runtime: &WorkflowRuntime) -> Option<String> {
        runtime
            .missing_case
            .clone()
            .or_else(|| self.case_at(&runtime.progress))
    }

    fn navigator_for(&self, progress: &WorkflowProgress) -> SliceNavigator {
        let slices = self
            .case_at(progress)
            .map_or(0, |case_id| self.catalog.list_slices(&case_id).len());
        SliceNavigator::new(slices)
    }

    fn canonicalize(
        &self,
        progress: &WorkflowProgress,
        action: Action,
    ) -> Result<Action, EngineError> {
        match action {
            Action::AddCorrection {
                organ,
                reason,
                detail,
            } => {
                let canonical = self.general.canonical_organ(&organ).ok_or_else(|| {
                    workflow::invalid(progress, format!("unknown organ '{organ}'"))
                })?;
                Ok(Action::AddCorrection {
                    organ: canonical,
                    reason,
                    detail,
                })
            }
            other => Ok(other),
        }
    }

    async fn write_side(&self, side: &SideRecord) -> Result<(), PersistenceError> {
        match side {
            SideRecord::Annotation(record) => self.annotations.record_annotation(record).await,
            SideRecord::EditedReport(report) => {
                self.annotations.record_edited_report(report).await
            }
        }
    }

    /// The synthesized report for a case: the latest submitted edit, else
    /// the report-editing buffer when it is on this case and has been
    /// changed from the generated text.
    async fn corrected_report(&self, session_id: &str, case_id: &str) -> Option<String> {
        match self
            .annotations
            .latest_edited_report(session_id, case_id)
            .await
        {
            Ok(Some(report)) if !report.report.trim().is_empty() => return Some(report.report),
            Ok(_) => {}
            Err(e) => warn!(session = session_id, case = case_id, "Edited report lookup failed: {e}"),
        }

        let editing = self
            .sessions
            .get(session_id)?
            .get(&WorkflowKind::ReportEditing)?;
        if self.current_case(editing).as_deref() != Some(case_id) {
            return None;
        }
        match &editing.progress.state {
            WorkflowState::ReportEditing { buffer, .. }
                if !buffer.trim().is_empty()
                    && buffer.trim() != self.catalog.load_generated_text(case_id).trim() =>
            {
                Some(buffer.clone())
            }
            _ => None,
        }
    }

    async fn view_of(&self, session_id: &str, runtime: &WorkflowRuntime) -> WorkflowView {
        let progress = &runtime.progress;
        let total = self.catalog.len();
        if progress.is_complete() {
            return WorkflowView::Complete {
                workflow: progress.workflow,
                total,
            };
        }
        let Some(case_id) = self.current_case(runtime) else {
            return WorkflowView::CaseUnavailable {
                workflow: progress.workflow,
                index: progress.current_index,
                case_id: runtime.missing_case.clone(),
            };
        };

        let generated = self.catalog.load_generated_text(&case_id);
        let corrections = progress.ledger.for_case(&case_id).cloned().collect();
        let display = match &progress.state {
            WorkflowState::BlindComparison {
                initial_judgement,
                final_judgement,
            } => {
                let (report_a, report_b) = self.ordered_reports(progress, &case_id, generated);
                CaseDisplay::Blind {
                    report_a,
                    report_b,
                    initial_judgement: *initial_judgement,
                    final_judgement: *final_judgement,
                }
            }
            WorkflowState::StandardReview { verdict } => {
                let (report_a, report_b) = self.ordered_reports(progress, &case_id, generated);
                let corrected_report = self.corrected_report(session_id, &case_id).await;
                CaseDisplay::Review {
                    report_a,
                    report_b,
                    corrections,
                    verdict: *verdict,
                    verdict_options: Verdict::options(corrected_report.is_some()).to_vec(),
                    corrected_report,
                }
            }
            WorkflowState::ReportEditing { mode, buffer } => CaseDisplay::Edit {
                generated_report: generated,
                mode: *mode,
                buffer: buffer.clone(),
                corrections,
            },
        };

        WorkflowView::Active(CaseView {
            session_id: session_id.to_string(),
            workflow: progress.workflow,
            slices: self.slice_view(runtime, &case_id),
            case_id,
            index: progress.current_index,
            total,
            phase: progress.phase,
            display,
        })
    }

    /// `(report_a, report_b)`; A is the generated report when the case's
    /// assignment is `true`.
    fn ordered_reports(
        &self,
        progress: &WorkflowProgress,
        case_id: &str,
        generated: String,
    ) -> (String, String) {
        let reference = self.catalog.load_reference_text(case_id);
        if progress.assignments.get(case_id).unwrap_or(false) {
            (generated, reference)
        } else {
            (reference, generated)
        }
    }

    fn slice_view(&self, runtime: &WorkflowRuntime, case_id: &str) -> SliceView {
        let slices = self.catalog.list_slices(case_id);
        if !runtime.progress.phase.images_visible() {
            return SliceView::hidden(slices.len());
        }
        let mut navigator = runtime.navigator;
        if navigator.len() != slices.len() {
            navigator.reset(slices.len());
        }
        SliceView {
            visible: true,
            total: slices.len(),
            index: navigator.index(),
            current: navigator.current(&slices).cloned(),
            caption: navigator.caption(),
        }
    }
}

fn outcome(
    progress: &WorkflowProgress,
    total: usize,
    record: Option<CaseRecord>,
    save: Option<SaveReport>,
    warnings: Vec<String>,
) -> SubmitOutcome {
    SubmitOutcome {
        workflow: progress.workflow,
        phase: progress.phase,
        current_index: progress.current_index,
        total,
        record,
        save,
        warnings,
    }
}
