//! Per-(session, workflow) JSON document sink.
//!
//! Overwrite mode keeps one `{workflow}_{session}.json` holding the latest
//! snapshot, replaced through a temp file in the same directory and an atomic
//! rename. Append mode adds one line per snapshot to
//! `{workflow}_{session}.jsonl`.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use revu_config::DocumentMode;
use revu_core::enums::{SinkKind, WorkflowKind};
use revu_core::snapshot::ProgressSnapshot;

use crate::error::PersistenceError;
use crate::sinks::{PersistenceSink, file_stem};

pub struct DocumentSink {
    dir: PathBuf,
    mode: DocumentMode,
}

impl DocumentSink {
    /// The directory is created lazily on first write.
    #[must_use]
    pub const fn new(dir: PathBuf, mode: DocumentMode) -> Self {
        Self { dir, mode }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub const fn mode(&self) -> DocumentMode {
        self.mode
    }

    /// Path of the document for (session, workflow) in the current mode.
    #[must_use]
    pub fn path_for(&self, session_id: &str, workflow: WorkflowKind) -> PathBuf {
        let ext = match self.mode {
            DocumentMode::Overwrite => "json",
            DocumentMode::Append => "jsonl",
        };
        self.dir
            .join(format!("{}.{ext}", file_stem(session_id, workflow)))
    }

    fn write_blocking(&self, snapshot: &ProgressSnapshot) -> Result<(), PersistenceError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(&snapshot.session_id, snapshot.workflow);

        match self.mode {
            DocumentMode::Overwrite => {
                let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
                serde_json::to_writer_pretty(&mut tmp, snapshot)?;
                tmp.write_all(b"\n")?;
                tmp.as_file().sync_all()?;
                tmp.persist(&path).map_err(|e| PersistenceError::Io(e.error))?;
            }
            DocumentMode::Append => {
                serde_jsonlines::append_json_lines(&path, [snapshot])?;
            }
        }
        Ok(())
    }

    fn read_blocking(
        &self,
        session_id: &str,
        workflow: WorkflowKind,
    ) -> Result<Option<ProgressSnapshot>, PersistenceError> {
        let path = self.path_for(session_id, workflow);
        if !path.exists() {
            return Ok(None);
        }

        match self.mode {
            DocumentMode::Overwrite => {
                let text = std::fs::read_to_string(&path)?;
                let snapshot: ProgressSnapshot = serde_json::from_str(&text)?;
                Ok(belongs_to(&snapshot, session_id, workflow).then_some(snapshot))
            }
            DocumentMode::Append => {
                let mut latest: Option<ProgressSnapshot> = None;
                for line in serde_jsonlines::json_lines(&path)? {
                    let snapshot: ProgressSnapshot = line?;
                    if belongs_to(&snapshot, session_id, workflow) {
                        latest = Some(snapshot);
                    }
                }
                Ok(latest)
            }
        }
    }
}

fn belongs_to(snapshot: &ProgressSnapshot, session_id: &str, workflow: WorkflowKind) -> bool {
    let owned = snapshot.session_id == session_id && snapshot.workflow == workflow;
    if !owned {
        tracing::warn!(
            expected = session_id,
            found = %snapshot.session_id,
            %workflow,
            "Ignoring document snapshot written for another session"
        );
    }
    owned
}

#[async_trait]
impl PersistenceSink for DocumentSink {
    fn kind(&self) -> SinkKind {
        SinkKind::Document
    }

    async fn write(&self, snapshot: &ProgressSnapshot) -> Result<(), PersistenceError> {
        self.write_blocking(snapshot)
    }

    async fn read_latest(
        &self,
        session_id: &str,
        workflow: WorkflowKind,
    ) -> Result<Option<ProgressSnapshot>, PersistenceError> {
        self.read_blocking(session_id, workflow)
    }
}
