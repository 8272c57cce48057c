//! # revu-core
//!
//! Core types, phase state machines, and error types for revu.
//!
//! This crate provides the foundational types shared across all revu crates:
//! - Workflow, phase, judgement and verdict enums with transition rules
//! - The per-(session, workflow) `WorkflowProgress` value
//! - The correction ledger and the memoize-once blind assignment map
//! - The slice navigator cursor
//! - The `ProgressSnapshot` envelope written to every persistence sink
//! - The `CaseCatalog` trait consumed by the session engine
//! - Cross-cutting error types

pub mod assignment;
pub mod catalog;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod ledger;
pub mod navigator;
pub mod snapshot;
