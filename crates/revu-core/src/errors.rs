//! Cross-cutting error types for revu.
//!
//! Domain-specific errors (`PersistenceError`, `EngineError`, ...) are defined
//! in their respective crates. Everything converges into `anyhow` in `revu-cli`.

use thiserror::Error;

/// Errors that can be raised by any revu crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// A phase transition was attempted that is not allowed.
    #[error("Invalid state transition: {entity_type} {id} from {from} to {to}")]
    InvalidTransition {
        entity_type: String,
        id: String,
        from: String,
        to: String,
    },

    /// An existing A/B assignment would have been overwritten.
    #[error(
        "Refusing to overwrite assignment for case {case_id}: existing={existing}, attempted={attempted}"
    )]
    StaleAssignment {
        case_id: String,
        existing: bool,
        attempted: bool,
    },

    /// Data failed validation (unknown organ, bad enum value, ...).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
