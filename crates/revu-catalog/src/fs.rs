//! Filesystem-backed case catalog.
//!
//! Layout:
//!
//! ```text
//! <base_dir>/
//!   case_001/
//!     text.txt      reference report
//!     pred.txt      generated report
//!     001.png       image slices, sorted by file name
//!     002.png
//!   case_002/
//!     ...
//! ```
//!
//! The case list is scanned once at construction and never changes for the
//! lifetime of the catalog, so case indexes stay stable across a run.

use std::path::{Path, PathBuf};

use revu_config::CatalogConfig;
use revu_core::catalog::CaseCatalog;
use tracing::{debug, warn};

use crate::error::CatalogError;

#[derive(Debug, Clone)]
pub struct FsCatalog {
    base: PathBuf,
    config: CatalogConfig,
    cases: Vec<String>,
}

impl FsCatalog {
    /// Scan `config.base_dir` for case directories.
    ///
    /// Hidden directories (leading `.`) are skipped. Case ids are directory
    /// names, sorted lexicographically.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::MissingBaseDir` when the base directory does not
    /// exist and `CatalogError::Io` when it cannot be listed.
    pub fn open(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let base = PathBuf::from(&config.base_dir);
        if !base.is_dir() {
            return Err(CatalogError::MissingBaseDir(base));
        }

        let entries = std::fs::read_dir(&base).map_err(|source| CatalogError::Io {
            path: base.clone(),
            source,
        })?;

        let mut cases = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| CatalogError::Io {
                path: base.clone(),
                source,
            })?;
            if !entry.path().is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            cases.push(name);
        }
        cases.sort();

        debug!(base = %base.display(), cases = cases.len(), "Scanned case catalog");

        Ok(Self {
            base,
            config: config.clone(),
            cases,
        })
    }

    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    fn case_dir(&self, case_id: &str) -> Option<PathBuf> {
        self.cases
            .iter()
            .any(|c| c == case_id)
            .then(|| self.base.join(case_id))
    }

    fn read_text(&self, case_id: &str, file_name: &str) -> String {
        let Some(dir) = self.case_dir(case_id) else {
            return String::new();
        };
        let path = dir.join(file_name);
        match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Report file missing, using empty text");
                String::new()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read report file");
                String::new()
            }
        }
    }
}

impl CaseCatalog for FsCatalog {
    fn list_cases(&self) -> Vec<String> {
        self.cases.clone()
    }

    fn load_reference_text(&self, case_id: &str) -> String {
        self.read_text(case_id, &self.config.reference_file)
    }

    fn load_generated_text(&self, case_id: &str) -> String {
        self.read_text(case_id, &self.config.generated_file)
    }

    fn list_slices(&self, case_id: &str) -> Vec<String> {
        let Some(dir) = self.case_dir(case_id) else {
            return Vec::new();
        };
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Failed to list image slices");
                return Vec::new();
            }
        };

        let mut slices: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| self.config.is_image(n))
            })
            .collect();
        slices.sort();

        slices
            .into_iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect()
    }

    fn contains(&self, case_id: &str) -> bool {
        self.cases.iter().any(|c| c == case_id)
    }

    fn len(&self) -> usize {
        self.cases.len()
    }
}
