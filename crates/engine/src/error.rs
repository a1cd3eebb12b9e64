//! Engine error types.
//!
//! The engine's editing and movement operations report no-ops through their
//! return values (`bool`/`Option`), matching the contract that callers check
//! results rather than catch faults. The errors below cover the two genuine
//! precondition/capacity failures the engine can hit; in both cases prior
//! state is left untouched.

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    /// The style table already holds its maximum of 255 entries.
    #[error("style table is full (255 entries)")]
    StyleTableFull,

    /// `commit_undo_point` was called without a matching
    /// `prepare_undo_point`.
    #[error("no undo point prepared")]
    NoPreparedUndo,
}
