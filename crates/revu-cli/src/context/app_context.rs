use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use revu_catalog::FsCatalog;
use revu_config::RevuConfig;
use revu_core::catalog::CaseCatalog;
use revu_db::RevuDb;
use revu_db::annotations::AnnotationStore;
use revu_db::retry::RetryConfig;
use revu_db::store::ProgressStore;
use revu_session::ReviewEngine;

use crate::cli::GlobalFlags;
use crate::commands::shared::session::resolve_session_id;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub config: RevuConfig,
    pub db: Arc<RevuDb>,
    pub project_root: PathBuf,
    pub session_id: String,
}

impl AppContext {
    /// Open the relational log and settle the session id.
    pub async fn init(
        project_root: PathBuf,
        config: RevuConfig,
        flags: &GlobalFlags,
    ) -> anyhow::Result<Self> {
        let storage = &config.storage;
        let db_path = storage.database_path();
        let db = RevuDb::open_with(
            &db_path,
            storage.busy_timeout_ms,
            RetryConfig::with_attempts(storage.retry_attempts),
        )
        .await
        .with_context(|| format!("failed to open progress database at {db_path}"))?;

        let session_id = resolve_session_id(flags.session.as_deref(), &config.general);
        tracing::debug!(session = %session_id, root = %project_root.display(), "Context ready");

        Ok(Self {
            config,
            db: Arc::new(db),
            project_root,
            session_id,
        })
    }

    /// Build a review engine over the case directory.
    ///
    /// The engine shares this context's database handle.
    pub fn engine(&self) -> anyhow::Result<ReviewEngine<FsCatalog>> {
        let catalog = FsCatalog::open(&self.config.catalog).with_context(|| {
            format!(
                "failed to open case catalog under {}",
                self.project_root.join(&self.config.catalog.base_dir).display()
            )
        })?;
        if catalog.is_empty() {
            tracing::warn!(base_dir = %self.config.catalog.base_dir, "Case catalog is empty");
        }

        let storage = &self.config.storage;
        let store = ProgressStore::from_config(storage, &self.db);
        let annotations =
            AnnotationStore::new(Arc::clone(&self.db), Some(storage.annotations_dir()));
        Ok(ReviewEngine::new(
            catalog,
            store,
            annotations,
            self.config.general.clone(),
        ))
    }
}
