// realism-gate-decision/src/lib.rs
// ============================================================================
// Module: Gate Decision Root
// Description: Re-exports `decide()`, `aggregate_vote_pack()`, and the
//              playbook lookup.
// Purpose: Turn one run's `CriticReport` into an authoritative `Verdict`.
// Dependencies: realism_gate_core, ret_logic, crate::{error, pipeline,
//               playbook}
// ============================================================================

//! The Gate Decision (§3, §4.4): turns one run's [`CriticReport`] into an
//! authoritative [`Verdict`] via a fixed, deterministic five-step pipeline,
//! and aggregates the vote pack's three independent verdicts on a tie.
//!
//! This crate depends only on `realism-gate-core` and `ret-logic`; it never
//! re-invokes rendering or the Critics Stack itself. Whichever caller already
//! holds render and critic access (the Iteration Controller, or the CLI
//! driver) is responsible for actually running the vote pack's three extra
//! evaluations when [`DecisionOutcome::requires_vote_pack`] is set, and for
//! feeding their outcomes to [`aggregate_vote_pack`].

mod error;
mod pipeline;
mod playbook;

pub use error::DecisionError;
pub use pipeline::aggregate_vote_pack;
pub use pipeline::decide;
pub use pipeline::DecisionOutcome;
