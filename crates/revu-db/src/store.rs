//! Fan-out progress store with the idempotent-write guard.
//!
//! Sinks are held in priority order. A save first asks every sink for its
//! latest snapshot of (session, workflow) and takes the newest; if its
//! progress key equals the new snapshot's key the write is skipped everywhere. Otherwise every sink is
//! written, best effort: a failing sink is logged and reported, the others
//! still run, and nothing is rolled back.

use std::fmt;
use std::sync::Arc;

use revu_config::StorageConfig;
use revu_core::enums::{SinkKind, WorkflowKind};
use revu_core::snapshot::ProgressSnapshot;
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::RevuDb;
use crate::error::PersistenceError;
use crate::sinks::{DocumentSink, PersistenceSink, RelationalSink, TabularSink};

/// A sink that rejected a write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SinkFailure {
    pub sink: SinkKind,
    pub message: String,
}

impl fmt::Display for SinkFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.sink, self.message)
    }
}

/// Outcome of one save.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SaveReport {
    /// The guard matched the latest persisted key; nothing was written.
    pub skipped: bool,
    pub written: Vec<SinkKind>,
    pub failures: Vec<SinkFailure>,
}

impl SaveReport {
    const fn skipped() -> Self {
        Self {
            skipped: true,
            written: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// At least one sink holds the snapshot (or it was already persisted).
    #[must_use]
    pub fn is_durable(&self) -> bool {
        self.skipped || !self.written.is_empty()
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

pub struct ProgressStore {
    sinks: Vec<Box<dyn PersistenceSink>>,
}

impl ProgressStore {
    /// Sinks are consulted for reads in the given order.
    #[must_use]
    pub fn new(sinks: Vec<Box<dyn PersistenceSink>>) -> Self {
        Self { sinks }
    }

    /// Build the enabled sinks from configuration, in configured order.
    ///
    /// The relational sink shares `db`.
    #[must_use]
    pub fn from_config(config: &StorageConfig, db: &Arc<RevuDb>) -> Self {
        let sinks = config
            .sinks
            .iter()
            .map(|kind| -> Box<dyn PersistenceSink> {
                match kind {
                    SinkKind::Relational => Box::new(RelationalSink::new(Arc::clone(db))),
                    SinkKind::Document => Box::new(DocumentSink::new(
                        config.documents_dir(),
                        config.document_mode,
                    )),
                    SinkKind::Tabular => Box::new(TabularSink::new(config.tables_dir())),
                }
            })
            .collect();
        Self::new(sinks)
    }

    #[must_use]
    pub fn sink_kinds(&self) -> Vec<SinkKind> {
        self.sinks.iter().map(|s| s.kind()).collect()
    }

    /// Persist `snapshot` unless the latest persisted snapshot for its
    /// (session, workflow) already has the same progress key.
    ///
    /// Sink failures never make this fail; they are reported in
    /// [`SaveReport::failures`].
    pub async fn save(&self, snapshot: &ProgressSnapshot) -> SaveReport {
        if let Some(latest) = self
            .load_latest(&snapshot.session_id, snapshot.workflow)
            .await
            && latest.progress_key() == snapshot.progress_key()
        {
            debug!(
                session = %snapshot.session_id,
                workflow = %snapshot.workflow,
                key = %snapshot.progress_key(),
                "Progress unchanged, skipping save"
            );
            return SaveReport::skipped();
        }
        self.write_all(snapshot).await
    }

    /// Persist `snapshot` to every sink without consulting the guard.
    pub async fn save_forced(&self, snapshot: &ProgressSnapshot) -> SaveReport {
        self.write_all(snapshot).await
    }

    async fn write_all(&self, snapshot: &ProgressSnapshot) -> SaveReport {
        let mut report = SaveReport::default();
        for sink in &self.sinks {
            match sink.write(snapshot).await {
                Ok(()) => report.written.push(sink.kind()),
                Err(e) => {
                    warn!(
                        sink = %sink.kind(),
                        session = %snapshot.session_id,
                        workflow = %snapshot.workflow,
                        "Sink write failed: {e}"
                    );
                    report.failures.push(SinkFailure {
                        sink: sink.kind(),
                        message: e.to_string(),
                    });
                }
            }
        }

        if report.written.is_empty() && !self.sinks.is_empty() {
            error!(
                session = %snapshot.session_id,
                workflow = %snapshot.workflow,
                "Every persistence sink failed; progress is held in memory only"
            );
        } else {
            debug!(
                session = %snapshot.session_id,
                workflow = %snapshot.workflow,
                key = %snapshot.progress_key(),
                written = report.written.len(),
                "Saved progress"
            );
        }
        report
    }

    /// The newest snapshot for (session, workflow) across every sink.
    ///
    /// A sink that missed a write holds an older snapshot than the others, so
    /// the one with the latest `saved_at` wins (then the higher case index,
    /// then sink priority). Sinks whose read fails are logged and skipped.
    pub async fn load_latest(
        &self,
        session_id: &str,
        workflow: WorkflowKind,
    ) -> Option<ProgressSnapshot> {
        let (sink, snapshot) = self.load_all(session_id, workflow).await.into_iter().next()?;
        debug!(%sink, session = session_id, %workflow, "Loaded progress");
        Some(snapshot)
    }

    /// The latest snapshot from every sink that has one, newest first.
    pub async fn load_all(
        &self,
        session_id: &str,
        workflow: WorkflowKind,
    ) -> Vec<(SinkKind, ProgressSnapshot)> {
        let mut found = Vec::new();
        for sink in &self.sinks {
            match sink.read_latest(session_id, workflow).await {
                Ok(Some(snapshot)) => found.push((sink.kind(), snapshot)),
                Ok(None) => {}
                Err(e) => {
                    warn!(sink = %sink.kind(), session = session_id, %workflow, "Sink read failed: {e}");
                }
            }
        }
        newest_first(&mut found);
        found
    }

    /// Like [`Self::load_latest`] but reports the first read error when no
    /// sink produced a snapshot.
    ///
    /// # Errors
    ///
    /// Returns the first sink read error if every sink either failed or was
    /// empty and at least one failed.
    pub async fn try_load_latest(
        &self,
        session_id: &str,
        workflow: WorkflowKind,
    ) -> Result<Option<ProgressSnapshot>, PersistenceError> {
        let mut first_error = None;
        let mut found = Vec::new();
        for sink in &self.sinks {
            match sink.read_latest(session_id, workflow).await {
                Ok(Some(snapshot)) => found.push((sink.kind(), snapshot)),
                Ok(None) => {}
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }
        newest_first(&mut found);
        match (found.into_iter().next(), first_error) {
            (Some((_, snapshot)), _) => Ok(Some(snapshot)),
            (None, Some(e)) => Err(e),
            (None, None) => Ok(None),
        }
    }
}

/// Stable sort, so sink priority decides between identical snapshots.
fn newest_first(found: &mut [(SinkKind, ProgressSnapshot)]) {
    found.sort_by(|(_, a), (_, b)| {
        b.saved_at
            .cmp(&a.saved_at)
            .then_with(|| b.progress.current_index.cmp(&a.progress.current_index))
    });
}
