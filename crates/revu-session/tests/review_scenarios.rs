//! End-to-end review sessions over an in-memory catalog and real sinks.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use revu_catalog::InMemoryCatalog;
use revu_config::{DocumentMode, GeneralConfig, RevuConfig, StorageConfig};
use revu_core::assignment::ScriptedCoin;
use revu_core::entities::{CaseRecord, CorrectionReason, WorkflowState};
use revu_core::enums::{EditMode, Identification, Judgement, Phase, SinkKind, Verdict, WorkflowKind};
use revu_core::snapshot::ProgressSnapshot;
use revu_db::RevuDb;
use revu_db::annotations::AnnotationStore;
use revu_db::error::PersistenceError;
use revu_db::sinks::{DocumentSink, PersistenceSink, RelationalSink, TabularSink};
use revu_db::results::ComparisonAccuracy;
use revu_db::store::ProgressStore;
use revu_session::{
    Action, CaseDisplay, CaseView, EngineError, ReviewEngine, SliceMove, WorkflowView,
};
use tempfile::TempDir;

const BLIND: WorkflowKind = WorkflowKind::BlindComparison;
const REVIEW: WorkflowKind = WorkflowKind::StandardReview;
const EDIT: WorkflowKind = WorkflowKind::ReportEditing;

fn slices(case_id: &str, n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("{case_id}/slice_{i}.png")).collect()
}

fn catalog() -> InMemoryCatalog {
    InMemoryCatalog::new()
        .with_case("caseA", "reference A", "generated A", slices("caseA", 3))
        .with_case("caseB", "reference B", "generated B", Vec::new())
        .with_case("caseC", "reference C", "generated C", slices("caseC", 1))
}

fn config_in(dir: &TempDir) -> RevuConfig {
    RevuConfig {
        storage: StorageConfig {
            data_dir: dir.path().to_string_lossy().into_owned(),
            document_mode: DocumentMode::Append,
            ..StorageConfig::default()
        },
        ..RevuConfig::default()
    }
}

async fn engine_with(
    dir: &TempDir,
    catalog: InMemoryCatalog,
    coin: Vec<bool>,
) -> ReviewEngine<InMemoryCatalog> {
    ReviewEngine::open(catalog, &config_in(dir))
        .await
        .unwrap()
        .with_coin(Box::new(ScriptedCoin::new(coin)))
}

async fn engine(dir: &TempDir, coin: Vec<bool>) -> ReviewEngine<InMemoryCatalog> {
    engine_with(dir, catalog(), coin).await
}

async fn active(
    engine: &mut ReviewEngine<InMemoryCatalog>,
    session: &str,
    kind: WorkflowKind,
) -> CaseView {
    match engine.enter_workflow(session, kind).await {
        WorkflowView::Active(view) => view,
        other => panic!("expected an active case, got {other:?}"),
    }
}

fn correction(organ: &str, reason: CorrectionReason, detail: &str) -> Action {
    Action::AddCorrection {
        organ: organ.into(),
        reason,
        detail: detail.into(),
    }
}

fn completed_for(snapshots: &[ProgressSnapshot], case_id: &str) -> usize {
    snapshots
        .iter()
        .filter(|s| s.completed.as_ref().is_some_and(|r| r.case_id() == case_id))
        .count()
}

async fn relational_snapshots(dir: &TempDir, session: &str, kind: WorkflowKind) -> Vec<ProgressSnapshot> {
    let db = RevuDb::open_local(&config_in(dir).storage.database_path())
        .await
        .unwrap();
    let mut rows = db
        .conn()
        .query(
            "SELECT progress_json FROM progress_logs WHERE session_id = ?1 AND category = ?2 ORDER BY id",
            [session, kind.as_str()],
        )
        .await
        .unwrap();
    let mut snapshots = Vec::new();
    while let Some(row) = rows.next().await.unwrap() {
        snapshots.push(serde_json::from_str(&row.get::<String>(0).unwrap()).unwrap());
    }
    snapshots
}

fn document_snapshots(dir: &TempDir, session: &str, kind: WorkflowKind) -> Vec<ProgressSnapshot> {
    let sink = DocumentSink::new(config_in(dir).storage.documents_dir(), DocumentMode::Append);
    std::fs::read_to_string(sink.path_for(session, kind))
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn tabular_snapshots(dir: &TempDir, session: &str, kind: WorkflowKind) -> Vec<ProgressSnapshot> {
    let sink = TabularSink::new(config_in(dir).storage.tables_dir());
    let mut reader = csv::Reader::from_path(sink.path_for(session, kind)).unwrap();
    let column = reader
        .headers()
        .unwrap()
        .iter()
        .position(|h| h == "snapshot")
        .unwrap();
    reader
        .records()
        .map(|record| serde_json::from_str(&record.unwrap()[column]).unwrap())
        .collect()
}

#[tokio::test]
async fn blind_comparison_records_case_once_per_sink() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine(&dir, vec![true]).await;

    let view = active(&mut engine, "r1", BLIND).await;
    assert_eq!(view.case_id, "caseA");
    assert_eq!(view.phase, Phase::AwaitingInitialJudgement);
    assert!(!view.slices.visible);
    assert_eq!(view.slices.total, 3);
    let CaseDisplay::Blind { report_a, report_b, .. } = view.display else {
        panic!("expected blind display");
    };
    assert_eq!(report_a, "generated A");
    assert_eq!(report_b, "reference A");

    let outcome = engine
        .submit("r1", BLIND, Action::SubmitInitialJudgement(Judgement::A))
        .await
        .unwrap();
    assert_eq!(outcome.phase, Phase::AwaitingImageRevealDecision);
    assert!(!outcome.advanced());

    let view = active(&mut engine, "r1", BLIND).await;
    assert!(view.slices.visible);
    assert_eq!(view.slices.caption.as_deref(), Some("Slice 1 of 3"));

    let outcome = engine.submit("r1", BLIND, Action::Finalize).await.unwrap();
    assert_eq!(outcome.current_index, 1);
    assert!(outcome.warnings.is_empty());
    assert_eq!(
        outcome.save.as_ref().unwrap().written,
        vec![SinkKind::Relational, SinkKind::Document, SinkKind::Tabular]
    );
    assert!(matches!(
        outcome.record,
        Some(CaseRecord::Comparison {
            ref case_id,
            assignment: true,
            initial_judgement: Judgement::A,
            final_judgement: Judgement::A,
            ..
        }) if case_id == "caseA"
    ));

    assert_eq!(completed_for(&relational_snapshots(&dir, "r1", BLIND).await, "caseA"), 1);
    assert_eq!(completed_for(&document_snapshots(&dir, "r1", BLIND), "caseA"), 1);
    assert_eq!(completed_for(&tabular_snapshots(&dir, "r1", BLIND), "caseA"), 1);
}

#[tokio::test]
async fn revised_judgement_becomes_final() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine(&dir, vec![false]).await;

    engine
        .submit("r1", BLIND, Action::SubmitInitialJudgement(Judgement::NotSure))
        .await
        .unwrap();
    engine
        .submit("r1", BLIND, Action::ReviseJudgement(Judgement::B))
        .await
        .unwrap();
    let outcome = engine.submit("r1", BLIND, Action::Finalize).await.unwrap();

    assert!(matches!(
        outcome.record,
        Some(CaseRecord::Comparison {
            assignment: false,
            initial_judgement: Judgement::NotSure,
            final_judgement: Judgement::B,
            ..
        })
    ));
    let view = active(&mut engine, "r1", BLIND).await;
    assert_eq!(view.case_id, "caseB");
    assert_eq!(view.phase, Phase::AwaitingInitialJudgement);
}

#[tokio::test]
async fn standard_review_empties_ledger_and_advances() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine(&dir, vec![false]).await;

    for _ in 0..2 {
        engine
            .submit(
                "r1",
                REVIEW,
                correction("liver", CorrectionReason::MissingFinding, "no lesion noted"),
            )
            .await
            .unwrap();
    }
    let view = active(&mut engine, "r1", REVIEW).await;
    let CaseDisplay::Review {
        corrections,
        verdict_options,
        corrected_report,
        ..
    } = view.display
    else {
        panic!("expected review display");
    };
    assert_eq!(corrections.len(), 2);
    assert_eq!(corrections[0].organ, "LIVER");
    assert_eq!(verdict_options, vec![Verdict::A, Verdict::B, Verdict::Equivalent]);
    assert!(corrected_report.is_none());

    let outcome = engine
        .submit("r1", REVIEW, Action::SubmitReview(Verdict::Equivalent))
        .await
        .unwrap();
    assert_eq!(outcome.current_index, 1);
    let runtime = engine.runtime("r1", REVIEW).unwrap();
    assert!(runtime.progress.ledger.is_empty());

    let db = RevuDb::open_local(&config_in(&dir).storage.database_path())
        .await
        .unwrap();
    let annotations = db.annotations(Some("r1")).await.unwrap();
    assert_eq!(annotations.len(), 1);
    assert_eq!(annotations[0].case_id, "caseA");
    assert_eq!(annotations[0].verdict, Some(Verdict::Equivalent));
    assert_eq!(annotations[0].corrections.len(), 2);

    let mirrored = engine.annotations().case_document("caseA").unwrap();
    assert_eq!(mirrored.len(), 1);
}

#[tokio::test]
async fn structured_editing_assembles_buffer() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine(&dir, Vec::new()).await;

    let view = active(&mut engine, "r1", EDIT).await;
    let CaseDisplay::Edit { mode, buffer, .. } = view.display else {
        panic!("expected edit display");
    };
    assert_eq!(mode, EditMode::Free);
    assert_eq!(buffer, "generated A");

    engine
        .submit("r1", EDIT, Action::SelectEditMode(EditMode::Structured))
        .await
        .unwrap();
    engine
        .submit(
            "r1",
            EDIT,
            correction("LIVER", CorrectionReason::MissingFinding, "no lesion noted"),
        )
        .await
        .unwrap();
    engine
        .submit(
            "r1",
            EDIT,
            correction(
                "pancreas",
                CorrectionReason::parse("other", None).unwrap(),
                "custom text",
            ),
        )
        .await
        .unwrap();
    engine.submit("r1", EDIT, Action::Assemble).await.unwrap();

    let view = active(&mut engine, "r1", EDIT).await;
    let CaseDisplay::Edit { buffer, .. } = view.display else {
        panic!("expected edit display");
    };
    assert_eq!(
        buffer,
        "LIVER: Missing finding - no lesion noted\nPANCREAS: Other - custom text\n"
    );

    let outcome = engine.submit("r1", EDIT, Action::SubmitEdit).await.unwrap();
    assert!(outcome.advanced());
    let stored = engine
        .annotations()
        .latest_edited_report("r1", "caseA")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.report, buffer);
    assert_eq!(stored.mode, EditMode::Structured);

    // The next case starts over in free mode with its own generated text.
    let view = active(&mut engine, "r1", EDIT).await;
    assert_eq!(view.case_id, "caseB");
    assert!(matches!(
        view.display,
        CaseDisplay::Edit { mode: EditMode::Free, ref buffer, .. } if buffer == "generated B"
    ));
}

#[tokio::test]
async fn repeated_suspend_adds_no_rows() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine(&dir, vec![true]).await;

    engine
        .submit("r1", BLIND, Action::SubmitInitialJudgement(Judgement::B))
        .await
        .unwrap();
    let first = engine.save_and_suspend("r1", BLIND).await;
    assert!(!first.skipped);
    assert_eq!(first.written.len(), 3);

    let second = engine.save_and_suspend("r1", BLIND).await;
    assert!(second.skipped);
    assert!(second.written.is_empty());

    assert_eq!(relational_snapshots(&dir, "r1", BLIND).await.len(), 1);
    let tabular = TabularSink::new(config_in(&dir).storage.tables_dir());
    assert_eq!(tabular.row_count("r1", BLIND).unwrap(), 1);
}

#[tokio::test]
async fn resume_restores_phase_judgement_and_assignment() {
    let dir = TempDir::new().unwrap();
    {
        let mut engine = engine(&dir, vec![false]).await;
        engine
            .submit("r1", BLIND, Action::SubmitInitialJudgement(Judgement::B))
            .await
            .unwrap();
        engine.save_and_suspend("r1", BLIND).await;
    }

    // A coin that would flip the other way proves the assignment was restored.
    let mut engine = engine(&dir, vec![true]).await;
    let view = active(&mut engine, "r1", BLIND).await;
    assert_eq!(view.case_id, "caseA");
    assert_eq!(view.phase, Phase::AwaitingImageRevealDecision);
    let CaseDisplay::Blind {
        report_a,
        initial_judgement,
        ..
    } = view.display
    else {
        panic!("expected blind display");
    };
    assert_eq!(report_a, "reference A");
    assert_eq!(initial_judgement, Some(Judgement::B));
    assert_eq!(
        engine
            .runtime("r1", BLIND)
            .unwrap()
            .progress
            .assignments
            .get("caseA"),
        Some(false)
    );
}

#[tokio::test]
async fn assignment_drawn_on_advance_survives_restart() {
    let dir = TempDir::new().unwrap();
    {
        let mut engine = engine(&dir, vec![true, false]).await;
        engine
            .submit("r1", BLIND, Action::SubmitInitialJudgement(Judgement::A))
            .await
            .unwrap();
        engine.submit("r1", BLIND, Action::Finalize).await.unwrap();
    }

    let mut engine = engine(&dir, vec![true]).await;
    let view = active(&mut engine, "r1", BLIND).await;
    assert_eq!(view.case_id, "caseB");
    let assignments = &engine.runtime("r1", BLIND).unwrap().progress.assignments;
    assert_eq!(assignments.get("caseA"), Some(true));
    assert_eq!(assignments.get("caseB"), Some(false));
}

#[tokio::test]
async fn reset_survives_restart() {
    let dir = TempDir::new().unwrap();
    {
        let mut engine = engine(&dir, vec![true]).await;
        engine
            .submit("r1", BLIND, Action::SubmitInitialJudgement(Judgement::A))
            .await
            .unwrap();
        engine.submit("r1", BLIND, Action::Finalize).await.unwrap();
        engine
            .submit("r1", REVIEW, Action::SubmitReview(Verdict::A))
            .await
            .unwrap();

        let reports = engine.reset_all("r1").await;
        assert_eq!(reports.len(), 3);
        assert!(reports.iter().all(|r| !r.skipped && r.is_durable()));
    }

    let mut engine = engine(&dir, vec![true]).await;
    for kind in WorkflowKind::ALL {
        let view = active(&mut engine, "r1", kind).await;
        assert_eq!(view.index, 0, "{kind} should restart at the first case");
        assert_eq!(view.phase, kind.initial_phase());
    }
}

#[tokio::test]
async fn corrected_verdict_needs_an_edited_report() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine(&dir, vec![true]).await;

    let err = engine
        .submit("r1", REVIEW, Action::SelectVerdict(Verdict::Corrected))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAction { .. }));

    engine
        .submit("r1", EDIT, Action::EditText("LIVER: 2 cm cyst.".into()))
        .await
        .unwrap();
    engine.submit("r1", EDIT, Action::SubmitEdit).await.unwrap();

    let view = active(&mut engine, "r1", REVIEW).await;
    let CaseDisplay::Review {
        verdict_options,
        corrected_report,
        ..
    } = view.display
    else {
        panic!("expected review display");
    };
    assert!(verdict_options.contains(&Verdict::Corrected));
    assert_eq!(corrected_report.as_deref(), Some("LIVER: 2 cm cyst."));

    let outcome = engine
        .submit("r1", REVIEW, Action::SubmitReview(Verdict::Corrected))
        .await
        .unwrap();
    assert!(matches!(
        outcome.record,
        Some(CaseRecord::Review { verdict: Verdict::Corrected, .. })
    ));
}

#[tokio::test]
async fn in_progress_edit_unlocks_corrected() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine(&dir, Vec::new()).await;

    // The seeded buffer alone is not a correction.
    active(&mut engine, "r1", EDIT).await;
    let view = active(&mut engine, "r1", REVIEW).await;
    assert!(matches!(view.display, CaseDisplay::Review { corrected_report: None, .. }));

    engine
        .submit("r1", EDIT, Action::EditText("LIVER: steatosis.".into()))
        .await
        .unwrap();
    let view = active(&mut engine, "r1", REVIEW).await;
    assert!(matches!(
        view.display,
        CaseDisplay::Review { corrected_report: Some(ref text), .. } if text == "LIVER: steatosis."
    ));
}

#[tokio::test]
async fn invalid_actions_leave_state_unchanged() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine(&dir, vec![true]).await;
    active(&mut engine, "r1", BLIND).await;
    let before = engine.runtime("r1", BLIND).unwrap().progress.clone();

    for action in [
        Action::Finalize,
        Action::ReviseJudgement(Judgement::A),
        Action::SubmitReview(Verdict::A),
        Action::Assemble,
    ] {
        let err = engine.submit("r1", BLIND, action).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidAction { .. }), "{err}");
    }
    assert_eq!(engine.runtime("r1", BLIND).unwrap().progress, before);

    let err = engine
        .submit(
            "r1",
            REVIEW,
            correction("SPLEEN", CorrectionReason::Misinterpretation, "size"),
        )
        .await
        .unwrap_err();
    assert!(err.to_string().contains("unknown organ"));
    assert!(engine.runtime("r1", REVIEW).unwrap().progress.ledger.is_empty());
}

#[tokio::test]
async fn navigation_is_clamped_and_hidden_before_reveal() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine(&dir, vec![true]).await;

    let hidden = engine.navigate("r1", BLIND, SliceMove::Next).await;
    assert!(!hidden.visible);
    assert_eq!(hidden.total, 3);
    assert!(hidden.current.is_none());

    engine
        .submit("r1", BLIND, Action::SubmitInitialJudgement(Judgement::A))
        .await
        .unwrap();
    let first = engine.navigate("r1", BLIND, SliceMove::Prev).await;
    assert_eq!(first.index, Some(0));

    engine.navigate("r1", BLIND, SliceMove::Last).await;
    let last = engine.navigate("r1", BLIND, SliceMove::Next).await;
    assert_eq!(last.index, Some(2));
    assert_eq!(last.current.as_deref(), Some("caseA/slice_3.png"));
    assert_eq!(last.caption.as_deref(), Some("Slice 3 of 3"));

    // Review shows images straight away; caseB has none.
    engine
        .submit("r1", REVIEW, Action::SubmitReview(Verdict::B))
        .await
        .unwrap();
    let none = engine.navigate("r1", REVIEW, SliceMove::Next).await;
    assert!(none.visible);
    assert_eq!(none.index, None);
    assert_eq!(none.caption, None);
}

#[tokio::test]
async fn workflow_completes_after_last_case() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine(&dir, vec![true, false]).await;

    let mut last_index = 0;
    for _ in 0..3 {
        let outcome = engine
            .submit("r1", REVIEW, Action::SubmitReview(Verdict::A))
            .await
            .unwrap();
        assert!(outcome.current_index > last_index);
        last_index = outcome.current_index;
    }
    assert_eq!(last_index, 3);

    assert_eq!(
        engine.enter_workflow("r1", REVIEW).await,
        WorkflowView::Complete {
            workflow: REVIEW,
            total: 3
        }
    );
    assert!(
        engine
            .submit("r1", REVIEW, Action::SubmitReview(Verdict::A))
            .await
            .is_err()
    );

    let statuses = engine.status("r1").await;
    let review = statuses.iter().find(|s| s.workflow == REVIEW).unwrap();
    assert_eq!(review.phase, Phase::Complete);
    assert_eq!(review.case_id, None);
}

#[tokio::test]
async fn saved_case_missing_from_catalog_is_unavailable() {
    let dir = TempDir::new().unwrap();
    {
        let mut engine = engine(&dir, vec![true]).await;
        engine
            .submit("r1", REVIEW, Action::SubmitReview(Verdict::A))
            .await
            .unwrap();
    }

    let shrunk = InMemoryCatalog::new()
        .with_case("caseA", "reference A", "generated A", Vec::new())
        .with_case("caseC", "reference C", "generated C", Vec::new());
    let mut engine = engine_with(&dir, shrunk, vec![true]).await;

    assert_eq!(
        engine.enter_workflow("r1", REVIEW).await,
        WorkflowView::CaseUnavailable {
            workflow: REVIEW,
            index: 1,
            case_id: Some("caseB".into()),
        }
    );
    let err = engine
        .submit("r1", REVIEW, Action::SubmitReview(Verdict::A))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Core(_)));
}

#[tokio::test]
async fn failing_sink_does_not_block_the_others() {
    let dir = TempDir::new().unwrap();
    let blocked = dir.path().join("blocked");
    std::fs::write(&blocked, "not a directory").unwrap();

    let db = std::sync::Arc::new(RevuDb::open_local(":memory:").await.unwrap());
    let store = ProgressStore::new(vec![
        Box::new(DocumentSink::new(blocked, DocumentMode::Overwrite)),
        Box::new(TabularSink::new(dir.path().join("tables"))),
    ]);
    let mut engine = ReviewEngine::new(
        catalog(),
        store,
        AnnotationStore::new(db, None),
        GeneralConfig::default(),
    )
    .with_coin(Box::new(ScriptedCoin::new(vec![true])));

    let outcome = engine
        .submit("r1", REVIEW, Action::SubmitReview(Verdict::B))
        .await
        .unwrap();
    let save = outcome.save.unwrap();
    assert_eq!(save.written, vec![SinkKind::Tabular]);
    assert_eq!(save.failures.len(), 1);
    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(outcome.current_index, 1);

    assert!(matches!(
        engine.runtime("r1", REVIEW).unwrap().progress.state,
        WorkflowState::StandardReview { verdict: None }
    ));
}

/// Relational sink whose writes can be switched off, as under lock contention.
struct FlakySink {
    inner: RelationalSink,
    failing: Arc<AtomicBool>,
}

#[async_trait]
impl PersistenceSink for FlakySink {
    fn kind(&self) -> SinkKind {
        SinkKind::Relational
    }

    async fn write(&self, snapshot: &ProgressSnapshot) -> Result<(), PersistenceError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PersistenceError::InvalidState("locked".into()));
        }
        self.inner.write(snapshot).await
    }

    async fn read_latest(
        &self,
        session_id: &str,
        workflow: WorkflowKind,
    ) -> Result<Option<ProgressSnapshot>, PersistenceError> {
        self.inner.read_latest(session_id, workflow).await
    }
}

#[tokio::test]
async fn resume_uses_newest_snapshot_when_first_sink_missed_a_write() {
    let dir = TempDir::new().unwrap();
    let db = Arc::new(RevuDb::open_local(":memory:").await.unwrap());
    let failing = Arc::new(AtomicBool::new(false));
    let open = || {
        let store = ProgressStore::new(vec![
            Box::new(FlakySink {
                inner: RelationalSink::new(Arc::clone(&db)),
                failing: Arc::clone(&failing),
            }),
            Box::new(TabularSink::new(dir.path().join("tables"))),
        ]);
        ReviewEngine::new(
            catalog(),
            store,
            AnnotationStore::new(Arc::clone(&db), None),
            GeneralConfig::default(),
        )
        .with_coin(Box::new(ScriptedCoin::new(vec![true])))
    };

    let mut first = open();
    first
        .submit("r1", REVIEW, Action::SubmitReview(Verdict::A))
        .await
        .unwrap();
    failing.store(true, Ordering::SeqCst);
    let outcome = first
        .submit("r1", REVIEW, Action::SubmitReview(Verdict::B))
        .await
        .unwrap();
    assert_eq!(outcome.current_index, 2);
    assert_eq!(outcome.save.unwrap().written, vec![SinkKind::Tabular]);
    failing.store(false, Ordering::SeqCst);

    let mut resumed = open();
    assert_eq!(active(&mut resumed, "r1", REVIEW).await.index, 2);

    // The guard compares against the same newest snapshot.
    let report = resumed.save_and_suspend("r1", REVIEW).await;
    assert!(report.skipped);
}

#[tokio::test]
async fn lookalike_session_ids_do_not_share_progress() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine(&dir, vec![true]).await;
    engine
        .submit("dr smith", BLIND, Action::SubmitInitialJudgement(Judgement::A))
        .await
        .unwrap();
    engine.submit("dr smith", BLIND, Action::Finalize).await.unwrap();
    engine.save_and_suspend("dr smith", BLIND).await;

    let mut fresh = engine_with(&dir, catalog(), vec![false]).await;
    let view = active(&mut fresh, "dr_smith", BLIND).await;
    assert_eq!(view.index, 0);
    assert_eq!(view.phase, Phase::AwaitingInitialJudgement);
    assert_eq!(active(&mut fresh, "dr smith", BLIND).await.index, 1);
}

#[tokio::test]
async fn blind_judgements_are_scored_in_results() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine(&dir, vec![true, false, true]).await;
    // caseA: generated is A, so picking A misses the reference.
    // caseB: generated is B, so picking A finds it.
    for judgement in [Judgement::A, Judgement::A, Judgement::NotSure] {
        engine
            .submit("r1", BLIND, Action::SubmitInitialJudgement(judgement))
            .await
            .unwrap();
        engine.submit("r1", BLIND, Action::Finalize).await.unwrap();
    }

    let db = RevuDb::open_local(&config_in(&dir).storage.database_path())
        .await
        .unwrap();
    let outcomes = db.comparison_outcomes(Some("r1")).await.unwrap();
    let scored: Vec<(&str, Identification)> = outcomes
        .iter()
        .map(|o| (o.case_id.as_str(), o.identification))
        .collect();
    assert_eq!(
        scored,
        vec![
            ("caseA", Identification::Incorrect),
            ("caseB", Identification::Correct),
            ("caseC", Identification::NotSure),
        ]
    );

    let summary = ComparisonAccuracy::summarize(&outcomes);
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].cases, 3);
    assert_eq!(summary[0].accuracy, Some(0.5));
}
