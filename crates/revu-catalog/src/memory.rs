//! In-memory case catalog.

use revu_core::catalog::CaseCatalog;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct CaseEntry {
    id: String,
    reference: String,
    generated: String,
    slices: Vec<String>,
}

/// Catalog assembled in code. Cases keep insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    cases: Vec<CaseEntry>,
}

impl InMemoryCatalog {
    #[must_use]
    pub const fn new() -> Self {
        Self { cases: Vec::new() }
    }

    /// Add a case. A second case with the same id replaces the first in place.
    #[must_use]
    pub fn with_case(
        mut self,
        id: impl Into<String>,
        reference: impl Into<String>,
        generated: impl Into<String>,
        slices: Vec<String>,
    ) -> Self {
        let entry = CaseEntry {
            id: id.into(),
            reference: reference.into(),
            generated: generated.into(),
            slices,
        };
        if let Some(existing) = self.cases.iter_mut().find(|c| c.id == entry.id) {
            *existing = entry;
        } else {
            self.cases.push(entry);
        }
        self
    }

    fn find(&self, case_id: &str) -> Option<&CaseEntry> {
        self.cases.iter().find(|c| c.id == case_id)
    }
}

impl CaseCatalog for InMemoryCatalog {
    fn list_cases(&self) -> Vec<String> {
        self.cases.iter().map(|c| c.id.clone()).collect()
    }

    fn load_reference_text(&self, case_id: &str) -> String {
        self.find(case_id)
            .map(|c| c.reference.clone())
            .unwrap_or_default()
    }

    fn load_generated_text(&self, case_id: &str) -> String {
        self.find(case_id)
            .map(|c| c.generated.clone())
            .unwrap_or_default()
    }

    fn list_slices(&self, case_id: &str) -> Vec<String> {
        self.find(case_id)
            .map(|c| c.slices.clone())
            .unwrap_or_default()
    }
}
