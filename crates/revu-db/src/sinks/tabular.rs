//! Per-(session, workflow) CSV sink.
//!
//! `{workflow}_{session}_progress.csv` gets a header row on first write and
//! one appended row per snapshot afterwards. The full snapshot travels in the
//! last column as JSON; the other columns are for people opening the file in
//! a spreadsheet.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use revu_core::enums::{SinkKind, WorkflowKind};
use revu_core::snapshot::ProgressSnapshot;
use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;
use crate::helpers::parse_json;
use crate::sinks::{PersistenceSink, file_stem};

#[derive(Debug, Serialize, Deserialize)]
struct ProgressRow {
    saved_at: String,
    session_id: String,
    workflow: String,
    progress_key: String,
    current_index: usize,
    case_id: String,
    phase: String,
    snapshot: String,
}

impl ProgressRow {
    fn from_snapshot(snapshot: &ProgressSnapshot) -> Result<Self, PersistenceError> {
        Ok(Self {
            saved_at: snapshot.saved_at.to_rfc3339(),
            session_id: snapshot.session_id.clone(),
            workflow: snapshot.workflow.as_str().to_string(),
            progress_key: snapshot.progress_key().to_string(),
            current_index: snapshot.progress.current_index,
            case_id: snapshot.case_id.clone().unwrap_or_default(),
            phase: snapshot.progress.phase.as_str().to_string(),
            snapshot: serde_json::to_string(snapshot)?,
        })
    }
}

pub struct TabularSink {
    dir: PathBuf,
}

impl TabularSink {
    #[must_use]
    pub const fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn path_for(&self, session_id: &str, workflow: WorkflowKind) -> PathBuf {
        self.dir
            .join(format!("{}_progress.csv", file_stem(session_id, workflow)))
    }

    /// Number of data rows (header excluded) for (session, workflow).
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::Csv` if the file exists but cannot be parsed.
    pub fn row_count(&self, session_id: &str, workflow: WorkflowKind) -> Result<usize, PersistenceError> {
        let path = self.path_for(session_id, workflow);
        if !path.exists() {
            return Ok(0);
        }
        let mut reader = csv::Reader::from_path(&path)?;
        let mut count = 0;
        for record in reader.records() {
            record?;
            count += 1;
        }
        Ok(count)
    }
}

#[async_trait]
impl PersistenceSink for TabularSink {
    fn kind(&self) -> SinkKind {
        SinkKind::Tabular
    }

    async fn write(&self, snapshot: &ProgressSnapshot) -> Result<(), PersistenceError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(&snapshot.session_id, snapshot.workflow);
        let needs_header = std::fs::metadata(&path).map_or(true, |m| m.len() == 0);

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(ProgressRow::from_snapshot(snapshot)?)?;
        writer.flush()?;
        Ok(())
    }

    async fn read_latest(
        &self,
        session_id: &str,
        workflow: WorkflowKind,
    ) -> Result<Option<ProgressSnapshot>, PersistenceError> {
        let path = self.path_for(session_id, workflow);
        if !path.exists() {
            return Ok(None);
        }

        let mut reader = csv::Reader::from_path(&path)?;
        let mut latest: Option<ProgressRow> = None;
        for row in reader.deserialize() {
            let row: ProgressRow = row?;
            if row.session_id == session_id && row.workflow == workflow.as_str() {
                latest = Some(row);
            }
        }

        latest
            .map(|row| parse_json(&row.snapshot, "snapshot"))
            .transpose()
    }
}
