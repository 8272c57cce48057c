use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::CoreError;

/// Why a reviewer disagrees with a finding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionReason {
    MeasurementError,
    Misinterpretation,
    MissingFinding,
    /// Free-text reason. An empty or absent text renders as `Other`.
    Other(Option<String>),
}

impl CorrectionReason {
    /// Parse a reason code as typed by a reviewer.
    ///
    /// Accepts `measurement-error`, `misinterpretation`, `missing-finding`
    /// (underscores, spaces and case are ignored) and `other`, which takes the
    /// optional free text.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` for an unknown code.
    pub fn parse(code: &str, other_text: Option<&str>) -> Result<Self, CoreError> {
        let normalized: String = code
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "measurementerror" | "measurement" => Ok(Self::MeasurementError),
            "misinterpretation" => Ok(Self::Misinterpretation),
            "missingfinding" | "missing" => Ok(Self::MissingFinding),
            "other" => Ok(Self::Other(
                other_text
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string),
            )),
            _ => Err(CoreError::Validation(format!(
                "unknown correction reason '{code}' (expected measurement-error, misinterpretation, missing-finding, other)"
            ))),
        }
    }

    /// Human-readable label used when assembling a report.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::MeasurementError => "Measurement error",
            Self::Misinterpretation => "Misinterpretation",
            Self::MissingFinding => "Missing finding",
            Self::Other(Some(text)) if !text.is_empty() => text.as_str(),
            Self::Other(_) => "Other",
        }
    }
}

impl fmt::Display for CorrectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One structured correction against a case.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CorrectionEntry {
    pub case_id: String,
    /// Organ or category label, e.g. `LIVER`.
    pub organ: String,
    pub reason: CorrectionReason,
    pub detail: String,
}

impl CorrectionEntry {
    /// The assembled form: `"<organ>: <reason> - <detail>"`.
    #[must_use]
    pub fn line(&self) -> String {
        format!("{}: {} - {}", self.organ, self.reason, self.detail)
    }
}
