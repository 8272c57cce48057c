//! # revu-session
//!
//! The review engine for revu. One [`ReviewEngine`] drives three workflows
//! over a case catalog:
//!
//! - **blind comparison**: judge two reports shown as A and B, then reveal the
//!   image slices and optionally revise;
//! - **standard review**: log organ-level corrections and pick the better
//!   report (or the synthesized one);
//! - **report editing**: rewrite the generated report as free text or from
//!   structured corrections.
//!
//! Progress is resumable per (session, workflow) through
//! [`revu_db::store::ProgressStore`].

pub mod action;
pub mod engine;
pub mod error;
pub mod view;
pub mod workflow;

pub use action::{Action, SliceMove};
pub use engine::ReviewEngine;
pub use error::EngineError;
pub use view::{CaseDisplay, CaseView, SliceView, SubmitOutcome, WorkflowStatus, WorkflowView};
pub use workflow::WorkflowRuntime;
