//! Correction ledger.
//!
//! An ordered multiset of `CorrectionEntry` values. Entries are appended
//! without deduplication and cleared per case when a case is submitted.
//! Every workflow owns its own ledger, so corrections made while editing never
//! leak into a standard review of the same case.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::CorrectionEntry;

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(transparent)]
pub struct CorrectionLedger {
    entries: Vec<CorrectionEntry>,
}

impl CorrectionLedger {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append an entry. Never deduplicates.
    pub fn add(&mut self, entry: CorrectionEntry) {
        self.entries.push(entry);
    }

    /// Entries for `case_id`, in insertion order.
    pub fn for_case<'a>(&'a self, case_id: &'a str) -> impl Iterator<Item = &'a CorrectionEntry> {
        self.entries.iter().filter(move |e| e.case_id == case_id)
    }

    /// Number of entries recorded for `case_id`.
    #[must_use]
    pub fn count_for_case(&self, case_id: &str) -> usize {
        self.for_case(case_id).count()
    }

    /// Remove every entry for `case_id` and return them in insertion order.
    ///
    /// The relative order of the remaining entries is preserved.
    pub fn clear_for_case(&mut self, case_id: &str) -> Vec<CorrectionEntry> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|e| e.case_id == case_id);
        self.entries = kept;
        removed
    }

    /// Concatenate the case's entries into a synthesized report.
    ///
    /// One line per entry, `"<organ>: <reason> - <detail>\n"`, in insertion
    /// order. Pure: repeated calls without an intervening `add`/`clear` return
    /// identical output.
    #[must_use]
    pub fn assemble(&self, case_id: &str) -> String {
        self.for_case(case_id).fold(String::new(), |mut out, entry| {
            out.push_str(&entry.line());
            out.push('\n');
            out
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::CorrectionReason;
    use pretty_assertions::assert_eq;

    fn entry(case_id: &str, organ: &str, reason: CorrectionReason, detail: &str) -> CorrectionEntry {
        CorrectionEntry {
            case_id: case_id.into(),
            organ: organ.into(),
            reason,
            detail: detail.into(),
        }
    }

    #[test]
    fn add_does_not_dedup() {
        let mut ledger = CorrectionLedger::new();
        let e = entry("caseB", "LIVER", CorrectionReason::MissingFinding, "no lesion noted");
        ledger.add(e.clone());
        ledger.add(e);
        assert_eq!(ledger.count_for_case("caseB"), 2);
    }

    #[test]
    fn assemble_preserves_insertion_order() {
        let mut ledger = CorrectionLedger::new();
        ledger.add(entry("c1", "LIVER", CorrectionReason::MissingFinding, "no lesion noted"));
        ledger.add(entry("c2", "SPLEEN", CorrectionReason::Misinterpretation, "other case"));
        ledger.add(entry("c1", "PANCREAS", CorrectionReason::Other(None), "custom text"));

        assert_eq!(
            ledger.assemble("c1"),
            "LIVER: Missing finding - no lesion noted\nPANCREAS: Other - custom text\n"
        );
    }

    #[test]
    fn assemble_is_deterministic() {
        let mut ledger = CorrectionLedger::new();
        ledger.add(entry("c1", "LIVER", CorrectionReason::MeasurementError, "12 mm, not 21 mm"));
        let first = ledger.assemble("c1");
        let second = ledger.assemble("c1");
        assert_eq!(first, second);
    }

    #[test]
    fn assemble_empty_case() {
        let ledger = CorrectionLedger::new();
        assert_eq!(ledger.assemble("nothing"), "");
    }

    #[test]
    fn clear_for_case_keeps_other_cases_in_order() {
        let mut ledger = CorrectionLedger::new();
        ledger.add(entry("a", "LIVER", CorrectionReason::MissingFinding, "1"));
        ledger.add(entry("b", "LIVER", CorrectionReason::MissingFinding, "2"));
        ledger.add(entry("a", "LIVER", CorrectionReason::MissingFinding, "3"));
        ledger.add(entry("c", "LIVER", CorrectionReason::MissingFinding, "4"));

        let removed = ledger.clear_for_case("a");
        assert_eq!(
            removed.iter().map(|e| e.detail.as_str()).collect::<Vec<_>>(),
            vec!["1", "3"]
        );
        let remaining: Vec<_> = ledger
            .for_case("b")
            .chain(ledger.for_case("c"))
            .map(|e| e.detail.as_str())
            .collect();
        assert_eq!(remaining, vec!["2", "4"]);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn serializes_as_plain_array() {
        let mut ledger = CorrectionLedger::new();
        ledger.add(entry("a", "LIVER", CorrectionReason::MissingFinding, "x"));
        let json = serde_json::to_value(&ledger).unwrap();
        assert!(json.is_array());
    }
}
