// realism-gate-iteration/src/error.rs
// ============================================================================
// Module: Iteration Errors
// Description: Errors raised by the Iteration Controller and its lineage
//              ledger.
// Purpose: Distinguish ledger I/O failure from an invalid state
//          transition.
// Dependencies: thiserror
// ============================================================================

//! Errors raised by the Iteration Controller and its lineage ledger.

use thiserror::Error;

/// Errors raised while advancing the iteration state machine or persisting
/// its ledger.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// The lineage ledger could not be opened, migrated, or queried.
    #[error("lineage ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// Errors raised by the SQLite-backed lineage ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The underlying `SQLite` connection returned an error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A stored `IterationState` row failed to deserialize.
    #[error("corrupt iteration state for issue {issue_id}: {source}")]
    Corrupt {
        /// Issue whose row failed to deserialize.
        issue_id: String,
        /// Underlying deserialization error.
        source: serde_json::Error,
    },
    /// No ledger row exists for the requested issue.
    #[error("no iteration state recorded for issue {0}")]
    NotFound(String),
}
