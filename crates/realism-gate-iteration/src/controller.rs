// realism-gate-iteration/src/controller.rs
// ============================================================================
// Module: Iteration Controller State Machine
// Description: `INIT -> GENERATE -> EXPORT -> RENDER -> CRITIC -> VERDICT
//              -> {DONE | REPAIR | ESCALATE}`, with the loop edge
//              `REPAIR -> GENERATE`.
// Purpose: Translate one Verdict plus iteration history into a terminal
//          outcome or the next repair issue.
// Dependencies: realism_gate_core, bigdecimal
// ============================================================================

//! The Iteration Controller state machine (§4.5): `INIT -> GENERATE ->
//! EXPORT -> RENDER -> CRITIC -> VERDICT -> {DONE | REPAIR | ESCALATE}`,
//! with the loop edge `REPAIR -> GENERATE`.
//!
//! The controller never renders or evaluates anything itself. It receives a
//! [`Verdict`] already produced by the rest of the pipeline for the current
//! run and decides the next [`ControllerOutcome`] purely from that verdict
//! plus the stored [`IterationState`], keeping the state machine a pure
//! decision function over explicit inputs (SPEC_FULL §4.5).

use std::collections::BTreeSet;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use realism_gate_core::FailCode;
use realism_gate_core::IssueId;
use realism_gate_core::IterationHistoryEntry;
use realism_gate_core::IterationState;
use realism_gate_core::NextAction;
use realism_gate_core::PartitionedFailures;
use realism_gate_core::RunId;
use realism_gate_core::Timestamp;
use realism_gate_core::Verdict;
use realism_gate_core::VerdictOutcome;
use realism_gate_core::VerdictReason;
use realism_gate_decision::aggregate_vote_pack;
use ret_logic::TriState;

use crate::error::ControllerError;
use crate::ledger::IterationStore;

/// Stable failure-code prefix identifying a crash-class hard code, for the
/// import/render crash recurrence trigger (§4.5, §7).
const CRASH_CLASS_CODES: &[&str] = &["IMPORT_MESH_INVALID", "RENDER_CRASH", "MESH_INVALID", "FILE_NOT_FOUND", "RENDER_TIMEOUT"];

/// Prefix identifying a geometry-dominated failure code, for the
/// template-fallback suggestion after two geometry-dominated iterations.
const GEOMETRY_CODE_PREFIX: &str = "GEO_";

/// Critic names treated as "semantic" for the adversarial-pattern trigger
/// (§4.5: "semantic critics pass but geometry catastrophically fails").
const SEMANTIC_CRITIC_NAMES: &[&str] = &["category", "prompt_alignment", "realism_quality"];

/// Score floor every semantic critic must clear for the adversarial-pattern
/// trigger to consider them "passing".
const ADVERSARIAL_SEMANTIC_FLOOR: &str = "0.85";

/// Score ceiling geometry must fall at or below for the adversarial-pattern
/// trigger to consider it "catastrophically failing".
const ADVERSARIAL_GEOMETRY_CEILING: &str = "0.15";

/// Template hint suggested after two consecutive geometry-dominated
/// failures, matching the scaffold hint the decision playbook already uses
/// for structural mesh failures.
const GEOMETRY_FALLBACK_TEMPLATE_HINT: &str = "car_basic_scaffold";

/// The controller's terminal or continuing decision for one verdict.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerOutcome {
    /// Terminal `DONE`: the verdict passed and no repair is needed.
    Done,
    /// Terminal `ESCALATE`: routed to human review, no further automated
    /// retries.
    Escalate {
        /// Why escalation fired.
        reason: VerdictReason,
    },
    /// `REPAIR`: a new generation round should begin from `next_issue`.
    Repair {
        /// The constructed repair issue the generator should act on.
        next_issue: Box<RepairIssue>,
    },
}

/// A constructed repair issue (§4.5): accumulated failure codes, playbook
/// instructions, the verdict's run to reference, and an optional
/// template-fallback suggestion.
#[derive(Debug, Clone, PartialEq)]
pub struct RepairIssue {
    /// Identifier of the work-item this repair continues.
    pub issue_id: IssueId,
    /// The new iteration index the repaired asset will run as.
    pub iteration_index: u32,
    /// Run id of the iteration that produced the verdict being repaired.
    pub parent_run_id: RunId,
    /// Failure codes accumulated from the triggering verdict.
    pub failures: PartitionedFailures,
    /// Ordered next-action plan, most-critical priority first.
    pub next_actions: Vec<NextAction>,
    /// Priority class of this repair issue, after any priority escalation.
    pub priority: u8,
    /// Template/scaffold hint, set after two consecutive geometry-dominated
    /// failures.
    pub template_fallback_hint: Option<String>,
}

/// Drives the Iteration Controller state machine over a durable lineage
/// ledger.
pub struct Controller<'a> {
    store: &'a dyn IterationStore,
}

impl<'a> Controller<'a> {
    /// Creates a controller backed by `store`.
    #[must_use]
    pub const fn new(store: &'a dyn IterationStore) -> Self {
        Self { store }
    }

    /// Advances the state machine for `issue_id` given the `Verdict` just
    /// produced for its current run, appending the resulting history entry
    /// to the ledger before returning the outcome. `recorded_at` is stamped
    /// onto the ledger row for audit; see [`IterationStore::append_entry`].
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError`] if the ledger cannot be read or written.
    pub fn advance(
        &self,
        issue_id: &IssueId,
        max_iterations: u32,
        repeated_hard_code_threshold: u32,
        priority_escalation_enabled: bool,
        verdict: &Verdict,
        recorded_at: Timestamp,
    ) -> Result<ControllerOutcome, ControllerError> {
        let state = self
            .store
            .load(issue_id)?
            .unwrap_or_else(|| IterationState::new(issue_id.clone(), max_iterations));

        let entry = IterationHistoryEntry {
            iteration_index: state.iteration_index,
            run_id: verdict.run_id.clone(),
            outcome: verdict.outcome,
            hard_fail_codes: verdict.failures.hard.clone(),
        };

        let outcome = decide_outcome(&state, &entry, repeated_hard_code_threshold, priority_escalation_enabled, verdict);

        let escalated = matches!(outcome, ControllerOutcome::Escalate { .. });
        self.store.append_entry(issue_id, &entry, max_iterations, escalated, recorded_at)?;

        Ok(outcome)
    }
}

/// Pure decision function: given the state accumulated *before* this
/// iteration's entry, the entry itself, and the triggering verdict, decides
/// the controller's outcome (§4.5's verdict-handling table).
fn decide_outcome(
    state: &IterationState,
    entry: &IterationHistoryEntry,
    repeated_hard_code_threshold: u32,
    priority_escalation_enabled: bool,
    verdict: &Verdict,
) -> ControllerOutcome {
    if verdict.outcome.is_pass() {
        return ControllerOutcome::Done;
    }

    if verdict.outcome.is_escalate() {
        return ControllerOutcome::Escalate { reason: verdict.reason.clone() };
    }

    // `state.iteration_index` is this iteration's index; the cap is checked
    // against the iteration *about to start* if this one is repaired, i.e.
    // `state.iteration_index + 1 >= max_iterations` means no further repair
    // fits under the cap.
    if state.iteration_index + 1 >= state.max_iterations {
        return ControllerOutcome::Escalate {
            reason: VerdictReason::MaxIterationsExceeded,
        };
    }

    let mut probe = state.clone();
    probe.history.push(entry.clone());
    if let Some(repeated) = probe.most_recent_repeated_hard_code(repeated_hard_code_threshold) {
        let reason = if is_crash_class_code(repeated) {
            VerdictReason::ImportOrRenderCrashRecurred
        } else {
            VerdictReason::RepeatedHardCode
        };
        return ControllerOutcome::Escalate { reason };
    }

    if is_adversarial_pattern(verdict) {
        return ControllerOutcome::Escalate {
            reason: VerdictReason::AdversarialPattern,
        };
    }

    ControllerOutcome::Repair {
        next_issue: Box::new(build_repair_issue(state, entry, priority_escalation_enabled, verdict)),
    }
}

/// Builds the repair issue for a `fail` verdict that did not trigger any
/// escalation (§4.5: "Construct a repair issue: accumulate failure codes,
/// build an instructions block from the playbook, reference the current
/// Verdict by path, optionally suggest a template-fallback if two
/// iterations have failed with geometry-dominated codes. Bump iteration
/// index, record parent run id, re-enter GENERATE.").
fn build_repair_issue(state: &IterationState, entry: &IterationHistoryEntry, priority_escalation_enabled: bool, verdict: &Verdict) -> RepairIssue {
    let mut next_actions = verdict.next_actions.clone();
    next_actions.sort_by_key(|action| action.priority);

    let base_priority = next_actions.first().map_or(5, |action| action.priority);
    let priority = if priority_escalation_enabled {
        let iterations_elapsed = u8::try_from(state.iteration_index).unwrap_or(u8::MAX);
        base_priority.saturating_sub(iterations_elapsed).max(1)
    } else {
        base_priority
    };

    let template_fallback_hint = two_recent_geometry_dominated_failures(state, entry).then(|| GEOMETRY_FALLBACK_TEMPLATE_HINT.to_string());

    RepairIssue {
        issue_id: state.issue_id.clone(),
        iteration_index: state.iteration_index + 1,
        parent_run_id: verdict.run_id.clone(),
        failures: verdict.failures.clone(),
        next_actions,
        priority,
        template_fallback_hint,
    }
}

/// Returns `true` iff this iteration's entry and the one immediately before
/// it both carry a geometry-dominated (`GEO_`-prefixed) hard failure code.
fn two_recent_geometry_dominated_failures(state: &IterationState, entry: &IterationHistoryEntry) -> bool {
    let Some(previous) = state.history.last() else {
        return false;
    };
    is_geometry_dominated(previous) && is_geometry_dominated(entry)
}

/// Returns `true` iff any hard failure code in `entry` is geometry-dominated.
fn is_geometry_dominated(entry: &IterationHistoryEntry) -> bool {
    entry.hard_fail_codes.iter().any(|code| code.as_str().starts_with(GEOMETRY_CODE_PREFIX))
}

/// Returns `true` iff `code` belongs to the crash-class set the
/// import/render crash recurrence trigger watches.
fn is_crash_class_code(code: &FailCode) -> bool {
    CRASH_CLASS_CODES.contains(&code.as_str())
}

/// Returns `true` iff `verdict` shows the adversarial pattern: the three
/// semantic critics all clear [`ADVERSARIAL_SEMANTIC_FLOOR`] while geometry
/// falls at or below [`ADVERSARIAL_GEOMETRY_CEILING`] (§4.5, §9).
fn is_adversarial_pattern(verdict: &Verdict) -> bool {
    let semantic_floor = threshold(ADVERSARIAL_SEMANTIC_FLOOR);
    let geometry_ceiling = threshold(ADVERSARIAL_GEOMETRY_CEILING);

    let semantic_pass = SEMANTIC_CRITIC_NAMES
        .iter()
        .all(|name| verdict.per_critic_scores.get(*name).is_some_and(|score| *score >= semantic_floor));
    let geometry_catastrophic = verdict.per_critic_scores.get("geometry").is_some_and(|score| *score <= geometry_ceiling);

    semantic_pass && geometry_catastrophic
}

/// Parses a literal decimal threshold constant; never actually fails since
/// the constants above are fixed valid decimals.
fn threshold(literal: &str) -> BigDecimal {
    BigDecimal::from_str(literal).unwrap_or_else(|_| BigDecimal::from(0))
}

/// Aggregates three independently-produced vote-pack verdicts into one
/// settled [`Verdict`] (§4.4: "three such evaluations are aggregated by
/// majority (pass/fail) or, on a tie, escalation"). On a tie, returns an
/// `escalate` verdict with reason [`VerdictReason::VotePackTie`] whose
/// failures and next-actions are the union of all three inputs.
#[must_use]
pub fn settle_vote_pack(verdicts: [Verdict; 3]) -> Verdict {
    let outcomes = [verdicts[0].outcome, verdicts[1].outcome, verdicts[2].outcome];
    match aggregate_vote_pack(outcomes) {
        TriState::True => verdicts.into_iter().find(|verdict| verdict.outcome.is_pass()).unwrap_or_else(|| verdicts[0].clone()),
        TriState::False => verdicts
            .into_iter()
            .find(|verdict| matches!(verdict.outcome, VerdictOutcome::Fail))
            .unwrap_or_else(|| verdicts[0].clone()),
        TriState::Unknown => merge_as_tie(verdicts),
    }
}

/// Builds the merged escalate verdict for a vote-pack tie: the union of
/// every input's hard/soft failures and next-actions, deduplicated and
/// priority-sorted.
fn merge_as_tie(verdicts: [Verdict; 3]) -> Verdict {
    let base = verdicts[0].clone();

    let mut hard: BTreeSet<FailCode> = BTreeSet::new();
    let mut soft: BTreeSet<FailCode> = BTreeSet::new();
    let mut next_actions: Vec<NextAction> = Vec::new();
    for verdict in &verdicts {
        hard.extend(verdict.failures.hard.iter().cloned());
        soft.extend(verdict.failures.soft.iter().cloned());
        for action in &verdict.next_actions {
            if !next_actions.iter().any(|existing| existing.instructions == action.instructions) {
                next_actions.push(action.clone());
            }
        }
    }
    next_actions.sort_by_key(|action| action.priority);

    Verdict {
        schema_version: base.schema_version,
        run_id: base.run_id,
        config_id: base.config_id,
        outcome: VerdictOutcome::Escalate,
        reason: VerdictReason::VotePackTie,
        overall_score: base.overall_score,
        per_critic_scores: base.per_critic_scores,
        failures: PartitionedFailures {
            hard: hard.into_iter().collect(),
            soft: soft.into_iter().collect(),
        },
        next_actions,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use bigdecimal::BigDecimal;
    use realism_gate_core::ActionKind;
    use realism_gate_core::GateConfigId;
    use realism_gate_core::IssueId;
    use realism_gate_core::NextAction;
    use realism_gate_core::PartitionedFailures;
    use realism_gate_core::RunId;
    use realism_gate_core::Timestamp;
    use realism_gate_core::Verdict;
    use realism_gate_core::VerdictOutcome;
    use realism_gate_core::VerdictReason;
    use time::macros::datetime;

    use super::settle_vote_pack;
    use super::Controller;
    use super::ControllerOutcome;
    use crate::ledger::SqliteIterationStore;

    fn sample_time() -> Timestamp {
        Timestamp::new(datetime!(2026-07-28 09:05:03 UTC))
    }

    fn verdict(run_id: &str, outcome: VerdictOutcome, reason: VerdictReason, failures: PartitionedFailures) -> Verdict {
        Verdict {
            schema_version: "1.0".into(),
            run_id: RunId::new(run_id),
            config_id: GateConfigId::new("car_realism_v001"),
            outcome,
            reason,
            overall_score: BigDecimal::from(0),
            per_critic_scores: BTreeMap::new(),
            failures,
            next_actions: vec![NextAction {
                action_kind: ActionKind::Repair,
                priority: 2,
                instructions: "fix it".into(),
                template_hint: None,
            }],
        }
    }

    #[test]
    fn a_pass_verdict_terminates_done() {
        let store = SqliteIterationStore::open_in_memory().expect("open ledger");
        let controller = Controller::new(&store);
        let outcome = controller
            .advance(&IssueId::new("issue-1"), 5, 2, true, &verdict("run-0", VerdictOutcome::Pass, VerdictReason::Satisfied, PartitionedFailures::default()), sample_time())
            .expect("advance");
        assert_eq!(outcome, ControllerOutcome::Done);
    }

    #[test]
    fn a_soft_fail_verdict_produces_a_repair_issue() {
        let store = SqliteIterationStore::open_in_memory().expect("open ledger");
        let controller = Controller::new(&store);
        let mut failures = PartitionedFailures::default();
        failures.soft.push(realism_gate_core::FailCode::new("OVERALL_SCORE_LOW"));
        let outcome = controller
            .advance(&IssueId::new("issue-1"), 5, 2, true, &verdict("run-0", VerdictOutcome::Fail, VerdictReason::SoftFail, failures), sample_time())
            .expect("advance");
        match outcome {
            ControllerOutcome::Repair { next_issue } => {
                assert_eq!(next_issue.iteration_index, 1);
                assert_eq!(next_issue.parent_run_id, RunId::new("run-0"));
            }
            other => panic!("expected repair, got {other:?}"),
        }
    }

    #[test]
    fn a_repeated_hard_code_escalates_on_the_second_occurrence() {
        let store = SqliteIterationStore::open_in_memory().expect("open ledger");
        let controller = Controller::new(&store);
        let issue_id = IssueId::new("issue-1");
        let mut failures = PartitionedFailures::default();
        failures.hard.push(realism_gate_core::FailCode::new("CAT_NO_CAR_DETECTED"));

        let first = controller
            .advance(&issue_id, 5, 2, true, &verdict("run-0", VerdictOutcome::Fail, VerdictReason::HardFail, failures.clone()), sample_time())
            .expect("advance first");
        assert!(matches!(first, ControllerOutcome::Repair { .. }));

        let second = controller
            .advance(&issue_id, 5, 2, true, &verdict("run-1", VerdictOutcome::Fail, VerdictReason::HardFail, failures), sample_time())
            .expect("advance second");
        assert_eq!(second, ControllerOutcome::Escalate { reason: VerdictReason::RepeatedHardCode });
    }

    #[test]
    fn a_recurring_crash_code_escalates_with_the_crash_reason() {
        let store = SqliteIterationStore::open_in_memory().expect("open ledger");
        let controller = Controller::new(&store);
        let issue_id = IssueId::new("issue-1");
        let mut failures = PartitionedFailures::default();
        failures.hard.push(realism_gate_core::FailCode::new("RENDER_CRASH"));

        controller
            .advance(&issue_id, 5, 2, true, &verdict("run-0", VerdictOutcome::Fail, VerdictReason::HardFail, failures.clone()), sample_time())
            .expect("advance first");
        let second = controller
            .advance(&issue_id, 5, 2, true, &verdict("run-1", VerdictOutcome::Fail, VerdictReason::HardFail, failures), sample_time())
            .expect("advance second");
        assert_eq!(second, ControllerOutcome::Escalate { reason: VerdictReason::ImportOrRenderCrashRecurred });
    }

    #[test]
    fn reaching_the_retry_cap_escalates_with_max_iterations_exceeded() {
        let store = SqliteIterationStore::open_in_memory().expect("open ledger");
        let controller = Controller::new(&store);
        let issue_id = IssueId::new("issue-1");
        for index in 0..2 {
            let mut failures = PartitionedFailures::default();
            failures.soft.push(realism_gate_core::FailCode::new("OVERALL_SCORE_LOW"));
            let outcome = controller
                .advance(&issue_id, 2, 10, true, &verdict(&format!("run-{index}"), VerdictOutcome::Fail, VerdictReason::SoftFail, failures), sample_time())
                .expect("advance");
            if index == 1 {
                assert_eq!(outcome, ControllerOutcome::Escalate { reason: VerdictReason::MaxIterationsExceeded });
            } else {
                assert!(matches!(outcome, ControllerOutcome::Repair { .. }));
            }
        }
    }

    #[test]
    fn an_escalate_verdict_propagates_its_own_reason() {
        let store = SqliteIterationStore::open_in_memory().expect("open ledger");
        let controller = Controller::new(&store);
        let outcome = controller
            .advance(
                &IssueId::new("issue-1"),
                5,
                2,
                true,
                &verdict("run-0", VerdictOutcome::Escalate, VerdictReason::VotePackTie, PartitionedFailures::default()),
                sample_time(),
            )
            .expect("advance");
        assert_eq!(outcome, ControllerOutcome::Escalate { reason: VerdictReason::VotePackTie });
    }

    #[test]
    fn vote_pack_majority_pass_settles_to_the_passing_verdict() {
        let a = verdict("run-a", VerdictOutcome::Pass, VerdictReason::Satisfied, PartitionedFailures::default());
        let b = verdict("run-b", VerdictOutcome::Pass, VerdictReason::Satisfied, PartitionedFailures::default());
        let c = verdict("run-c", VerdictOutcome::Fail, VerdictReason::SoftFail, PartitionedFailures::default());
        let settled = settle_vote_pack([a, b, c]);
        assert_eq!(settled.outcome, VerdictOutcome::Pass);
    }

    #[test]
    fn vote_pack_three_way_split_settles_to_an_escalate_tie() {
        let a = verdict("run-a", VerdictOutcome::Pass, VerdictReason::Satisfied, PartitionedFailures::default());
        let b = verdict("run-b", VerdictOutcome::Fail, VerdictReason::SoftFail, PartitionedFailures::default());
        let c = verdict("run-c", VerdictOutcome::Escalate, VerdictReason::VotePackTie, PartitionedFailures::default());
        let settled = settle_vote_pack([a, b, c]);
        assert_eq!(settled.outcome, VerdictOutcome::Escalate);
        assert_eq!(settled.reason, VerdictReason::VotePackTie);
    }
}
