//! The case catalog seam.
//!
//! The session engine only needs a stable ordered list of case ids and, per
//! case, the two report texts and the ordered slice handles. Implementations
//! live in `revu-catalog`.

/// Read-only source of review cases.
///
/// Every lookup returns an empty value for an unknown case rather than
/// failing.
pub trait CaseCatalog: Send + Sync {
    /// Case ids in review order. Must be stable for the lifetime of a run.
    fn list_cases(&self) -> Vec<String>;

    fn load_reference_text(&self, case_id: &str) -> String;

    fn load_generated_text(&self, case_id: &str) -> String;

    /// Ordered image-slice handles (e.g. file paths).
    fn list_slices(&self, case_id: &str) -> Vec<String>;

    fn contains(&self, case_id: &str) -> bool {
        self.list_cases().iter().any(|c| c == case_id)
    }

    fn len(&self) -> usize {
        self.list_cases().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
