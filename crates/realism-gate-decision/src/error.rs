// realism-gate-decision/src/error.rs
// ============================================================================
// Module: Decision Errors
// Description: Errors raised while turning a `CriticReport` into a
//              `Verdict`.
// Purpose: Keep `decide()` fallible only on malformed input, never on
//          score arithmetic.
// Dependencies: thiserror
// ============================================================================

//! Errors raised while turning a `CriticReport` into a `Verdict` (§4.4).

use thiserror::Error;

/// Errors raised by the Gate Decision pipeline.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecisionError {
    /// A critic named in `decision.weights` has no matching result in the
    /// `CriticReport` being scored. Load-time config validation should make
    /// this unreachable in practice, since weight keys are the four fixed
    /// critic names.
    #[error("no critic result for weighted critic: {0}")]
    MissingWeightedCritic(String),
}
