//! Blind A/B assignment.
//!
//! Each workflow keeps an append-only map from case id to a boolean that
//! decides which report is labeled "Report A". `true` means the generated
//! report is shown first. Once drawn, an assignment never changes for the
//! life of the session: a flipped order on a revisit would reveal which
//! report is which.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Source of uniformly random booleans.
pub trait CoinSource: Send {
    fn flip(&mut self) -> bool;
}

/// Coin backed by the operating system's random source.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsCoin;

impl CoinSource for OsCoin {
    fn flip(&mut self) -> bool {
        let mut byte = [0u8; 1];
        match getrandom::fill(&mut byte) {
            Ok(()) => byte[0] & 1 == 1,
            Err(error) => {
                tracing::warn!(%error, "OS random source unavailable; falling back to clock bit");
                chrono::Utc::now().timestamp_subsec_nanos() & 1 == 1
            }
        }
    }
}

/// Coin that replays a fixed sequence, cycling when exhausted.
///
/// Used by tests and demos that need a reproducible A/B layout.
#[derive(Debug, Clone)]
pub struct ScriptedCoin {
    script: Vec<bool>,
    pos: usize,
}

impl ScriptedCoin {
    #[must_use]
    pub fn new(script: Vec<bool>) -> Self {
        Self { script, pos: 0 }
    }

    /// Number of flips performed so far.
    #[must_use]
    pub const fn flips(&self) -> usize {
        self.pos
    }
}

impl CoinSource for ScriptedCoin {
    fn flip(&mut self) -> bool {
        if self.script.is_empty() {
            self.pos += 1;
            return true;
        }
        let value = self.script[self.pos % self.script.len()];
        self.pos += 1;
        value
    }
}

/// Memoize-once map of case id to "generated report is Report A".
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(transparent)]
pub struct Assignments {
    by_case: BTreeMap<String, bool>,
}

impl Assignments {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            by_case: BTreeMap::new(),
        }
    }

    /// Return the existing assignment for `case_id`, or draw, store and
    /// return a new one. The second and later calls have no side effect.
    pub fn get_or_assign(&mut self, case_id: &str, coin: &mut dyn CoinSource) -> bool {
        if let Some(existing) = self.by_case.get(case_id) {
            return *existing;
        }
        let drawn = coin.flip();
        self.by_case.insert(case_id.to_string(), drawn);
        drawn
    }

    #[must_use]
    pub fn get(&self, case_id: &str) -> Option<bool> {
        self.by_case.get(case_id).copied()
    }

    /// Record a known assignment (e.g. one restored from a snapshot).
    ///
    /// Recording the same value again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::StaleAssignment` if `case_id` already holds a
    /// different value. The original value is kept.
    pub fn record(&mut self, case_id: &str, value: bool) -> Result<(), CoreError> {
        match self.by_case.get(case_id) {
            Some(existing) if *existing == value => Ok(()),
            Some(existing) => Err(CoreError::StaleAssignment {
                case_id: case_id.to_string(),
                existing: *existing,
                attempted: value,
            }),
            None => {
                self.by_case.insert(case_id.to_string(), value);
                Ok(())
            }
        }
    }

    /// Merge another map into this one, keeping existing values on conflict.
    ///
    /// Returns the conflicts that were rejected.
    pub fn merge(&mut self, other: &Self) -> Vec<CoreError> {
        other
            .iter()
            .filter_map(|(case_id, value)| self.record(case_id, value).err())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.by_case.iter().map(|(k, v)| (k.as_str(), *v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_case.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_case.is_empty()
    }
}
