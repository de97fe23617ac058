// realism-gate-iteration/src/lib.rs
// ============================================================================
// Module: Iteration Controller Root
// Description: Re-exports the `Controller`, `IterationStore`,
//              `SqliteIterationStore`, and vote-pack settlement.
// Purpose: Translate one run's `Verdict` into a terminal outcome or a
//          prioritized repair issue, with durable lineage.
// Dependencies: realism_gate_core, realism_gate_decision, rusqlite,
//               crate::{controller, error, ledger}
// ============================================================================

//! The Iteration Controller (§3, §4.5): a pure state machine translating
//! one run's `Verdict` into either a terminal outcome or a prioritized
//! repair issue, plus the `SQLite`-backed lineage ledger that persists
//! `IterationState` across process restarts.
//!
//! This crate depends on `realism-gate-core` for the shared `IterationState`
//! and `Verdict` types and on `realism-gate-decision` only for
//! `aggregate_vote_pack`; it never re-invokes rendering or the Critics
//! Stack itself — whichever caller drives the pipeline (the CLI) owns that.

mod controller;
mod error;
mod ledger;

pub use controller::settle_vote_pack;
pub use controller::Controller;
pub use controller::ControllerOutcome;
pub use controller::RepairIssue;
pub use error::ControllerError;
pub use error::LedgerError;
pub use ledger::IterationStore;
pub use ledger::SqliteIterationStore;
