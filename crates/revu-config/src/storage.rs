//! Persistence sink configuration.

use std::path::PathBuf;

use revu_core::enums::SinkKind;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How the per-(session, category) document sink writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentMode {
    /// Keep only the latest snapshot; replaced atomically via temp file + rename.
    #[default]
    Overwrite,
    /// Append every snapshot as one JSON line.
    Append,
}

fn default_data_dir() -> String {
    "db".to_string()
}

fn default_database_file() -> String {
    "progress.db".to_string()
}

fn default_sinks() -> Vec<SinkKind> {
    vec![SinkKind::Relational, SinkKind::Document, SinkKind::Tabular]
}

const fn default_busy_timeout_ms() -> u64 {
    5_000
}

const fn default_retry_attempts() -> u32 {
    4
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Root directory for the database and the per-session files.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// libSQL database file name inside `data_dir`. `":memory:"` keeps the
    /// relational log in memory.
    #[serde(default = "default_database_file")]
    pub database_file: String,

    #[serde(default)]
    pub document_mode: DocumentMode,

    /// Enabled sinks, in read priority order.
    #[serde(default = "default_sinks")]
    pub sinks: Vec<SinkKind>,

    /// SQLite busy timeout applied to the relational log.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Attempts (including the first) for inserts that hit lock contention.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            database_file: default_database_file(),
            document_mode: DocumentMode::default(),
            sinks: default_sinks(),
            busy_timeout_ms: default_busy_timeout_ms(),
            retry_attempts: default_retry_attempts(),
        }
    }
}

impl StorageConfig {
    /// Path handed to libSQL.
    #[must_use]
    pub fn database_path(&self) -> String {
        if self.database_file == ":memory:" {
            return self.database_file.clone();
        }
        PathBuf::from(&self.data_dir)
            .join(&self.database_file)
            .to_string_lossy()
            .into_owned()
    }

    /// Directory of the per-session progress documents.
    #[must_use]
    pub fn documents_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("progress")
    }

    /// Directory of the per-session CSV logs.
    #[must_use]
    pub fn tables_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("tables")
    }

    /// Directory of the per-case annotation documents.
    #[must_use]
    pub fn annotations_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("evaluations")
    }

    #[must_use]
    pub fn is_enabled(&self, sink: SinkKind) -> bool {
        self.sinks.contains(&sink)
    }

    /// Check that at least one sink is enabled and none is listed twice.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` describing the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sinks.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "storage.sinks".into(),
                reason: "at least one sink must be enabled".into(),
            });
        }
        for (i, sink) in self.sinks.iter().enumerate() {
            if self.sinks[..i].contains(sink) {
                return Err(ConfigError::InvalidValue {
                    field: "storage.sinks".into(),
                    reason: format!("sink '{sink}' listed more than once"),
                });
            }
        }
        if self.retry_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "storage.retry_attempts".into(),
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}
