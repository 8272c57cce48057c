//! General application configuration.

use serde::{Deserialize, Serialize};

fn default_organs() -> Vec<String> {
    [
        "LIVER",
        "PORTAL VEIN",
        "INTRAHEPATIC IVC",
        "INTRAHEPATIC BILE DUCTS",
        "COMMON BILE DUCT",
        "GALLBLADDER",
        "PANCREAS",
        "RIGHT KIDNEY",
        "OTHER FINDINGS",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Session id used when `--session` is not given. Empty means a random
    /// id is generated per run.
    #[serde(default)]
    pub reviewer: String,

    /// Organ labels accepted for corrections. Empty disables the check.
    #[serde(default = "default_organs")]
    pub organs: Vec<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            reviewer: String::new(),
            organs: default_organs(),
        }
    }
}

impl GeneralConfig {
    /// Canonical (configured) spelling of `organ`, matched case-insensitively.
    ///
    /// Returns `organ` unchanged when the organ list is empty.
    #[must_use]
    pub fn canonical_organ(&self, organ: &str) -> Option<String> {
        let organ = organ.trim();
        if self.organs.is_empty() {
            return Some(organ.to_string());
        }
        self.organs
            .iter()
            .find(|known| known.eq_ignore_ascii_case(organ))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = GeneralConfig::default();
        assert!(config.reviewer.is_empty());
        assert_eq!(config.organs.len(), 9);
        assert_eq!(config.organs[0], "LIVER");
    }

    #[test]
    fn canonical_organ_matches_case_insensitively() {
        let config = GeneralConfig::default();
        assert_eq!(config.canonical_organ("liver").as_deref(), Some("LIVER"));
        assert_eq!(
            config.canonical_organ(" common bile duct ").as_deref(),
            Some("COMMON BILE DUCT")
        );
        assert!(config.canonical_organ("spleen").is_none());
    }

    #[test]
    fn empty_organ_list_accepts_anything() {
        let config = GeneralConfig {
            organs: Vec::new(),
            ..GeneralConfig::default()
        };
        assert_eq!(config.canonical_organ("spleen").as_deref(), Some("spleen"));
    }
}
