// ret-logic/src/lib.rs
// ============================================================================
// Module: Tri-State Logic Root
// Description: Public API surface for the tri-state logic subsystem.
// Purpose: Re-export tri-state truth values, logic tables, and group
//          semantics for callers that need majority/ensemble aggregation
//          over evidence that may be incomplete.
// Dependencies: crate::tristate
// ============================================================================

//! ## Overview
//! A small, domain-agnostic tri-state logic library: `True`/`False`/`Unknown`
//! values, two logic tables (strong Kleene and Bochvar), and a
//! `require_group` majority-with-threshold rule for "at least N of M" group
//! evaluation where some inputs may be unresolved.

pub mod tristate;

pub use tristate::BochvarLogic;
pub use tristate::GroupCounts;
pub use tristate::KleeneLogic;
pub use tristate::LogicMode;
pub use tristate::NoopTrace;
pub use tristate::RequirementTrace;
pub use tristate::TriLogic;
pub use tristate::TriState;
