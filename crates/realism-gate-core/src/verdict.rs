// realism-gate-core/src/verdict.rs
// ============================================================================
// Module: Verdict Document
// Description: The sole pass/fail/escalate signal, its overall and
//              per-critic scores, partitioned failures, and next-actions.
// Purpose: Give the enclosing work-graph one authoritative outcome record
//          per evaluation.
// Dependencies: bigdecimal, serde, std::collections::BTreeMap
// ============================================================================

//! The `Verdict` document (§3, §4.4, §6): the sole pass/fail/escalate
//! signal consumed by the enclosing work-graph.

use std::collections::BTreeMap;

use bigdecimal::BigDecimal;
use serde::Deserialize;
use serde::Serialize;

use crate::critic::PartitionedFailures;
use crate::identifiers::GateConfigId;
use crate::identifiers::RunId;

/// Schema version carried by every `Verdict` document.
pub const VERDICT_SCHEMA_VERSION: &str = "1.0";

/// The Gate Decision's authoritative outcome for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictOutcome {
    /// No hard failure; every subscore floor and the overall threshold are
    /// met.
    Pass,
    /// A repair loop is eligible.
    Fail,
    /// Terminal; routed to human review.
    Escalate,
}

impl VerdictOutcome {
    /// Returns `true` for [`VerdictOutcome::Pass`].
    #[must_use]
    pub const fn is_pass(self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Returns `true` for [`VerdictOutcome::Escalate`].
    #[must_use]
    pub const fn is_escalate(self) -> bool {
        matches!(self, Self::Escalate)
    }
}

/// The kind of action a next-action entry recommends (§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Repair the asset and re-enter generation.
    Repair,
    /// Re-render with the vote-pack's augmented render set.
    RerenderVotePack,
    /// Fall back to a template/scaffold.
    FallbackToTemplate,
    /// Route to a human reviewer.
    HumanReview,
}

/// One entry in a `Verdict`'s ordered next-action plan (§4.4).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NextAction {
    /// The kind of action recommended.
    pub action_kind: ActionKind,
    /// Priority: 1 (critical, fix first) to 5 (polish).
    pub priority: u8,
    /// Human-readable instructions derived from the failure-code playbook.
    pub instructions: String,
    /// Optional template/scaffold hint.
    pub template_hint: Option<String>,
}

/// The reason a `Verdict` reached its outcome, for audit and escalation
/// messaging (§4.5, §7).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum VerdictReason {
    /// A hard failure code was present; scoring was skipped.
    HardFail,
    /// Scoring completed and every criterion was met.
    Satisfied,
    /// Scoring completed but one or more soft criteria were not met.
    SoftFail,
    /// The vote-pack ensemble produced a tie.
    VotePackTie,
    /// Iteration index reached the configured maximum.
    MaxIterationsExceeded,
    /// The same hard code repeated across consecutive iterations.
    RepeatedHardCode,
    /// An import or render crash recurred.
    ImportOrRenderCrashRecurred,
    /// Semantic critics passed but geometry catastrophically failed.
    AdversarialPattern,
}

/// The authoritative pass/fail/escalate decision for one run (§3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Verdict {
    /// Fixed schema version string, always `"1.0"`.
    pub schema_version: String,
    /// Run this verdict was produced for.
    pub run_id: RunId,
    /// GateConfig identifier used to produce this verdict.
    pub config_id: GateConfigId,
    /// The outcome.
    pub outcome: VerdictOutcome,
    /// Why the outcome was reached.
    pub reason: VerdictReason,
    /// Weighted overall score.
    pub overall_score: BigDecimal,
    /// Per-critic scores, keyed by critic name.
    pub per_critic_scores: BTreeMap<String, BigDecimal>,
    /// Hard/soft partitioned failure codes.
    pub failures: PartitionedFailures,
    /// Ordered next-action plan.
    pub next_actions: Vec<NextAction>,
}

impl Verdict {
    /// Returns `true` iff this verdict satisfies the `pass` invariant from
    /// §3: no hard failures, and (checked by the caller against the
    /// originating `GateConfig`) every subscore floor and the overall
    /// threshold are met. This method only checks the structural half of
    /// the invariant (no hard failures) that is always decidable from the
    /// verdict alone.
    #[must_use]
    pub fn is_structurally_consistent_pass(&self) -> bool {
        if self.outcome.is_pass() {
            return !self.failures.has_hard_failure();
        }
        true
    }
}
