//! Cross-session queries over the relational log.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use revu_core::entities::{AnnotationRecord, CaseRecord, EditedReport};
use revu_core::enums::{Identification, Judgement, WorkflowKind};
use revu_core::snapshot::ProgressSnapshot;
use serde::Serialize;

use crate::RevuDb;
use crate::error::PersistenceError;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum, parse_json};

/// A session that has saved progress at least once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub saves: u64,
    pub last_saved_at: DateTime<Utc>,
}

/// One accepted save in the progress log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressLogEntry {
    pub id: i64,
    pub session_id: String,
    pub workflow: WorkflowKind,
    pub progress_key: String,
    pub current_index: u64,
    pub case_id: Option<String>,
    pub saved_at: DateTime<Utc>,
}

/// A finished blind comparison and how it scored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonOutcome {
    pub session_id: String,
    pub case_id: String,
    /// `true` when the generated report was shown as Report A.
    pub assignment: bool,
    pub initial_judgement: Judgement,
    pub final_judgement: Judgement,
    pub identification: Identification,
    pub recorded_at: DateTime<Utc>,
}

impl ComparisonOutcome {
    fn from_record(session_id: &str, record: CaseRecord) -> Option<Self> {
        let identification = record.identification()?;
        let CaseRecord::Comparison {
            case_id,
            assignment,
            initial_judgement,
            final_judgement,
            recorded_at,
        } = record
        else {
            return None;
        };
        Some(Self {
            session_id: session_id.to_string(),
            case_id,
            assignment,
            initial_judgement,
            final_judgement,
            identification,
            recorded_at,
        })
    }
}

/// Per-session score in the blind comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonAccuracy {
    pub session_id: String,
    pub cases: u32,
    pub correct: u32,
    pub incorrect: u32,
    pub not_sure: u32,
    /// `correct / (correct + incorrect)`; `None` until a case was decided.
    pub accuracy: Option<f64>,
}

impl ComparisonAccuracy {
    /// One summary per session, ordered by session id.
    #[must_use]
    pub fn summarize(outcomes: &[ComparisonOutcome]) -> Vec<Self> {
        let mut by_session: BTreeMap<&str, Self> = BTreeMap::new();
        for outcome in outcomes {
            let entry = by_session
                .entry(outcome.session_id.as_str())
                .or_insert_with(|| Self {
                    session_id: outcome.session_id.clone(),
                    cases: 0,
                    correct: 0,
                    incorrect: 0,
                    not_sure: 0,
                    accuracy: None,
                });
            entry.cases += 1;
            match outcome.identification {
                Identification::Correct => entry.correct += 1,
                Identification::Incorrect => entry.incorrect += 1,
                Identification::NotSure => entry.not_sure += 1,
            }
        }
        by_session
            .into_values()
            .map(|mut summary| {
                let decided = summary.correct + summary.incorrect;
                summary.accuracy =
                    (decided > 0).then(|| f64::from(summary.correct) / f64::from(decided));
                summary
            })
            .collect()
    }
}

fn row_to_log_entry(row: &libsql::Row) -> Result<ProgressLogEntry, PersistenceError> {
    Ok(ProgressLogEntry {
        id: row.get::<i64>(0)?,
        session_id: row.get::<String>(1)?,
        workflow: parse_enum(&row.get::<String>(2)?)?,
        progress_key: row.get::<String>(3)?,
        current_index: u64::try_from(row.get::<i64>(4)?)
            .map_err(|e| PersistenceError::InvalidState(format!("current_index: {e}")))?,
        case_id: get_opt_string(row, 5)?,
        saved_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

pub(crate) fn row_to_edited_report(row: &libsql::Row) -> Result<EditedReport, PersistenceError> {
    Ok(EditedReport {
        session_id: row.get::<String>(0)?,
        case_id: row.get::<String>(1)?,
        mode: parse_enum(&row.get::<String>(2)?)?,
        report: row.get::<String>(3)?,
        corrections: parse_json(&row.get::<String>(4)?, "corrections_json")?,
        recorded_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

impl RevuDb {
    /// Distinct sessions in the progress log, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` if the query or row parsing fails.
    pub async fn list_sessions(&self) -> Result<Vec<SessionSummary>, PersistenceError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT session_id, COUNT(*), MAX(timestamp)
                 FROM progress_logs
                 GROUP BY session_id
                 ORDER BY session_id",
                (),
            )
            .await?;

        let mut sessions = Vec::new();
        while let Some(row) = rows.next().await? {
            sessions.push(SessionSummary {
                session_id: row.get::<String>(0)?,
                saves: u64::try_from(row.get::<i64>(1)?).unwrap_or_default(),
                last_saved_at: parse_datetime(&row.get::<String>(2)?)?,
            });
        }
        Ok(sessions)
    }

    /// Progress log for one workflow (or all), across sessions, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` if the query or row parsing fails.
    pub async fn progress_log(
        &self,
        workflow: Option<WorkflowKind>,
    ) -> Result<Vec<ProgressLogEntry>, PersistenceError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT id, session_id, category, progress_key, current_index, case_id, timestamp
                 FROM progress_logs
                 WHERE (?1 IS NULL OR category = ?1)
                 ORDER BY id ASC",
                libsql::params![workflow.map(WorkflowKind::as_str)],
            )
            .await?;

        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(row_to_log_entry(&row)?);
        }
        Ok(entries)
    }

    /// Annotation records, optionally for one session, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` if the query or row parsing fails.
    pub async fn annotations(
        &self,
        session_id: Option<&str>,
    ) -> Result<Vec<AnnotationRecord>, PersistenceError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT annotations_json FROM annotations
                 WHERE (?1 IS NULL OR session_id = ?1)
                 ORDER BY id ASC",
                libsql::params![session_id],
            )
            .await?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(parse_json(&row.get::<String>(0)?, "annotations_json")?);
        }
        Ok(records)
    }

    /// Finished blind comparisons, optionally for one session, oldest first.
    ///
    /// Read from the completed records carried by logged snapshots. A case
    /// judged again after a reset keeps only its latest outcome.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` if the query or snapshot parsing fails.
    pub async fn comparison_outcomes(
        &self,
        session_id: Option<&str>,
    ) -> Result<Vec<ComparisonOutcome>, PersistenceError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT session_id, progress_json FROM progress_logs
                 WHERE category = ?1 AND (?2 IS NULL OR session_id = ?2)
                 ORDER BY id ASC",
                libsql::params![WorkflowKind::BlindComparison.as_str(), session_id],
            )
            .await?;

        let mut outcomes: Vec<ComparisonOutcome> = Vec::new();
        while let Some(row) = rows.next().await? {
            let session = row.get::<String>(0)?;
            let snapshot: ProgressSnapshot = parse_json(&row.get::<String>(1)?, "progress_json")?;
            let Some(outcome) = snapshot
                .completed
                .and_then(|record| ComparisonOutcome::from_record(&session, record))
            else {
                continue;
            };
            outcomes.retain(|o| !(o.session_id == outcome.session_id && o.case_id == outcome.case_id));
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    /// Edited reports, optionally for one session, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` if the query or row parsing fails.
    pub async fn edited_reports(
        &self,
        session_id: Option<&str>,
    ) -> Result<Vec<EditedReport>, PersistenceError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT session_id, case_id, mode, report_text, corrections_json, timestamp
                 FROM edited_reports
                 WHERE (?1 IS NULL OR session_id = ?1)
                 ORDER BY id ASC",
                libsql::params![session_id],
            )
            .await?;

        let mut reports = Vec::new();
        while let Some(row) = rows.next().await? {
            reports.push(row_to_edited_report(&row)?);
        }
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::{PersistenceSink, RelationalSink};
    use crate::test_support::helpers::{snapshot_at, test_db};
    use std::sync::Arc;

    #[tokio::test]
    async fn sessions_and_log_across_categories() {
        let db = test_db().await;
        let sink = RelationalSink::new(Arc::clone(&db));
        sink.write(&snapshot_at("r2", WorkflowKind::BlindComparison, 0))
            .await
            .unwrap();
        sink.write(&snapshot_at("r1", WorkflowKind::BlindComparison, 0))
            .await
            .unwrap();
        sink.write(&snapshot_at("r1", WorkflowKind::StandardReview, 3))
            .await
            .unwrap();

        let sessions = db.list_sessions().await.unwrap();
        let ids: Vec<&str> = sessions.iter().map(|s| s.session_id.as_str()).collect();
        assert_eq!(ids, vec!["r1", "r2"]);
        assert_eq!(sessions[0].saves, 2);

        let blind = db
            .progress_log(Some(WorkflowKind::BlindComparison))
            .await
            .unwrap();
        assert_eq!(blind.len(), 2);
        assert_eq!(blind[0].session_id, "r2");
        assert_eq!(blind[0].progress_key, "index:0");

        let all = db.progress_log(None).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[2].workflow, WorkflowKind::StandardReview);
        assert_eq!(all[2].current_index, 3);
    }

    fn finished(session: &str, case_id: &str, assignment: bool, judgement: Judgement) -> ProgressSnapshot {
        let mut snapshot = snapshot_at(session, WorkflowKind::BlindComparison, 1);
        snapshot.completed = Some(CaseRecord::Comparison {
            case_id: case_id.into(),
            assignment,
            initial_judgement: Judgement::NotSure,
            final_judgement: judgement,
            recorded_at: Utc::now(),
        });
        snapshot
    }

    #[tokio::test]
    async fn comparison_outcomes_are_scored_per_session() {
        let db = test_db().await;
        let sink = RelationalSink::new(Arc::clone(&db));
        for snapshot in [
            snapshot_at("r1", WorkflowKind::BlindComparison, 0),
            finished("r1", "caseA", true, Judgement::B),
            finished("r1", "caseB", false, Judgement::B),
            finished("r1", "caseC", true, Judgement::NotSure),
            finished("r2", "caseA", false, Judgement::A),
        ] {
            sink.write(&snapshot).await.unwrap();
        }

        let outcomes = db.comparison_outcomes(None).await.unwrap();
        let scored: Vec<(&str, &str, Identification)> = outcomes
            .iter()
            .map(|o| (o.session_id.as_str(), o.case_id.as_str(), o.identification))
            .collect();
        assert_eq!(
            scored,
            vec![
                ("r1", "caseA", Identification::Correct),
                ("r1", "caseB", Identification::Incorrect),
                ("r1", "caseC", Identification::NotSure),
                ("r2", "caseA", Identification::Correct),
            ]
        );

        let summary = ComparisonAccuracy::summarize(&outcomes);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].session_id, "r1");
        assert_eq!(
            (summary[0].cases, summary[0].correct, summary[0].incorrect, summary[0].not_sure),
            (3, 1, 1, 1)
        );
        assert_eq!(summary[0].accuracy, Some(0.5));
        assert_eq!(summary[1].accuracy, Some(1.0));

        assert_eq!(db.comparison_outcomes(Some("r2")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rejudged_case_keeps_latest_outcome() {
        let db = test_db().await;
        let sink = RelationalSink::new(Arc::clone(&db));
        sink.write(&finished("r1", "caseA", true, Judgement::A)).await.unwrap();
        sink.write(&finished("r1", "caseA", true, Judgement::B)).await.unwrap();

        let outcomes = db.comparison_outcomes(Some("r1")).await.unwrap();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].identification, Identification::Correct);
    }

    #[test]
    fn undecided_session_has_no_accuracy() {
        let outcome = ComparisonOutcome {
            session_id: "r1".into(),
            case_id: "caseA".into(),
            assignment: true,
            initial_judgement: Judgement::NotSure,
            final_judgement: Judgement::NotSure,
            identification: Identification::NotSure,
            recorded_at: Utc::now(),
        };
        let summary = ComparisonAccuracy::summarize(&[outcome]);
        assert_eq!(summary[0].not_sure, 1);
        assert_eq!(summary[0].accuracy, None);
    }

    #[tokio::test]
    async fn empty_log_queries() {
        let db = test_db().await;
        assert!(db.list_sessions().await.unwrap().is_empty());
        assert!(db.annotations(None).await.unwrap().is_empty());
        assert!(db.edited_reports(Some("r1")).await.unwrap().is_empty());
        assert!(db.comparison_outcomes(None).await.unwrap().is_empty());
    }
}
