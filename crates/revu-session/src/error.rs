//! Engine error types.

use revu_core::enums::{Phase, WorkflowKind};
use revu_core::errors::CoreError;
use revu_db::error::PersistenceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The action is not allowed in the current phase or mode. State is
    /// left unchanged.
    #[error("{workflow} ({phase}): {reason}")]
    InvalidAction {
        workflow: WorkflowKind,
        phase: Phase,
        reason: String,
    },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}
