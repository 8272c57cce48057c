//! Submitted annotations and edited reports.
//!
//! Both go to the relational log. Annotations are also mirrored into a
//! per-case JSON document (`{case}_annotations.json`, a JSON array) so a case
//! can be inspected without the database.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use revu_core::entities::{AnnotationRecord, EditedReport};
use revu_core::ids::sanitize_for_path;
use tracing::{debug, warn};

use crate::RevuDb;
use crate::error::PersistenceError;
use crate::helpers::parse_json;

pub struct AnnotationStore {
    db: Arc<RevuDb>,
    documents_dir: Option<PathBuf>,
}

impl AnnotationStore {
    /// `documents_dir` of `None` disables the per-case JSON mirror.
    #[must_use]
    pub const fn new(db: Arc<RevuDb>, documents_dir: Option<PathBuf>) -> Self {
        Self { db, documents_dir }
    }

    #[must_use]
    pub fn document_path(&self, case_id: &str) -> Option<PathBuf> {
        self.documents_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}_annotations.json", sanitize_for_path(case_id))))
    }

    /// Store a review annotation.
    ///
    /// The relational row is authoritative: its failure is returned. A
    /// failure to update the per-case document is logged only.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` if serialization or the insert fails.
    pub async fn record_annotation(&self, record: &AnnotationRecord) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(record)?;
        let verdict = record.verdict.map(|v| v.as_str());
        let recorded_at = record.recorded_at.to_rfc3339();

        self.db
            .execute_with(
                "INSERT INTO annotations (session_id, category, case_id, verdict, annotations_json, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                || {
                    libsql::params![
                        record.session_id.as_str(),
                        record.workflow.as_str(),
                        record.case_id.as_str(),
                        verdict,
                        json.as_str(),
                        recorded_at.as_str()
                    ]
                },
            )
            .await?;

        if let Some(path) = self.document_path(&record.case_id)
            && let Err(e) = append_to_document(&path, record)
        {
            warn!(path = %path.display(), "Failed to update annotation document: {e}");
        }

        debug!(session = %record.session_id, case = %record.case_id, "Recorded annotation");
        Ok(())
    }

    /// Store a report submitted from the editing workflow.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` if serialization or the insert fails.
    pub async fn record_edited_report(&self, report: &EditedReport) -> Result<(), PersistenceError> {
        let corrections = serde_json::to_string(&report.corrections)?;
        let recorded_at = report.recorded_at.to_rfc3339();

        self.db
            .execute_with(
                "INSERT INTO edited_reports (session_id, case_id, mode, report_text, corrections_json, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                || {
                    libsql::params![
                        report.session_id.as_str(),
                        report.case_id.as_str(),
                        report.mode.as_str(),
                        report.report.as_str(),
                        corrections.as_str(),
                        recorded_at.as_str()
                    ]
                },
            )
            .await?;

        debug!(session = %report.session_id, case = %report.case_id, "Recorded edited report");
        Ok(())
    }

    /// The most recent edited report for (session, case).
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` if the query or row parsing fails.
    pub async fn latest_edited_report(
        &self,
        session_id: &str,
        case_id: &str,
    ) -> Result<Option<EditedReport>, PersistenceError> {
        let mut rows = self
            .db
            .conn()
            .query(
                "SELECT session_id, case_id, mode, report_text, corrections_json, timestamp
                 FROM edited_reports
                 WHERE session_id = ?1 AND case_id = ?2
                 ORDER BY id DESC LIMIT 1",
                libsql::params![session_id, case_id],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(crate::results::row_to_edited_report(&row)?)),
            None => Ok(None),
        }
    }

    /// Annotations mirrored into the per-case document, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` if the document exists but cannot be read.
    pub fn case_document(&self, case_id: &str) -> Result<Vec<AnnotationRecord>, PersistenceError> {
        match self.document_path(case_id) {
            Some(path) => read_document(&path),
            None => Ok(Vec::new()),
        }
    }
}

fn read_document(path: &Path) -> Result<Vec<AnnotationRecord>, PersistenceError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let text = std::fs::read_to_string(path)?;
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    parse_json(&text, "annotations document")
}

/// Read-modify-write of the JSON array, replaced atomically.
fn append_to_document(path: &Path, record: &AnnotationRecord) -> Result<(), PersistenceError> {
    let dir = path
        .parent()
        .ok_or_else(|| PersistenceError::InvalidState(format!("no parent: {}", path.display())))?;
    std::fs::create_dir_all(dir)?;

    let mut records = read_document(path)?;
    records.push(record.clone());

    let tmp = tempfile::NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(tmp.as_file(), &records)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| PersistenceError::Io(e.error))?;
    Ok(())
}
