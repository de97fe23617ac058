// realism-gate-decision/src/pipeline.rs
// ============================================================================
// Module: Decision Pipeline
// Description: Hard-fail short-circuit, weighted scoring, subscore-floor
//              and overall-threshold checks, and vote-pack tie aggregation.
// Purpose: Implement the five-step decision pipeline as one pure function.
// Dependencies: bigdecimal, ret_logic, realism_gate_core,
//               std::collections::BTreeMap
// ============================================================================

//! The Gate Decision pipeline (§4.4): turns a `CriticReport` into a
//! `Verdict`, plus the vote-pack tie aggregation rule used when the overall
//! score lands inside the configured uncertainty band.

use std::collections::BTreeMap;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use realism_gate_core::CriticReport;
use realism_gate_core::FailCode;
use realism_gate_core::GateConfig;
use realism_gate_core::NextAction;
use realism_gate_core::PartitionedFailures;
use realism_gate_core::Verdict;
use realism_gate_core::VerdictOutcome;
use realism_gate_core::VerdictReason;
use ret_logic::GroupCounts;
use ret_logic::KleeneLogic;
use ret_logic::TriLogic;
use ret_logic::TriState;

use crate::error::DecisionError;
use crate::playbook::next_action_for;

/// Schema version stamped onto every `Verdict` this crate produces.
const VERDICT_SCHEMA_VERSION: &str = "1.0";

/// One pipeline invocation's result: the `Verdict` itself, plus whether the
/// overall score landed inside the configured uncertainty band and so
/// requires the vote-pack ensemble (§4.4: "When `|overall - threshold| <=
/// uncertainty_band`, the Decision re-invokes the pipeline with an augmented
/// render set"). Actually driving that re-invocation belongs to whichever
/// caller already has render and critic access (the Iteration Controller or
/// CLI driver); this crate only flags the need and aggregates the result.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionOutcome {
    /// The verdict produced by this single pipeline pass.
    pub verdict: Verdict,
    /// `true` iff the vote-pack ensemble should be run for this run.
    pub requires_vote_pack: bool,
}

/// Runs the five-step Gate Decision pipeline (§4.4) over one `CriticReport`.
///
/// # Errors
///
/// Returns [`DecisionError::MissingWeightedCritic`] if a critic named in
/// `config.decision.weights` has no matching result in `report`. Load-time
/// config validation (`realism-gate-config`) makes this unreachable for any
/// config that passed validation, since the only valid weight keys are the
/// four fixed critic names.
pub fn decide(report: &CriticReport, config: &GateConfig) -> Result<DecisionOutcome, DecisionError> {
    let decision = &config.decision;
    let per_critic_scores = score_table(report);

    if report.failures.has_hard_failure() {
        let next_actions = build_next_actions(&report.failures.hard, &[]);
        let verdict = Verdict {
            schema_version: VERDICT_SCHEMA_VERSION.to_string(),
            run_id: report.run_id.clone(),
            config_id: report.config_id.clone(),
            outcome: VerdictOutcome::Fail,
            reason: VerdictReason::HardFail,
            overall_score: BigDecimal::from(0),
            per_critic_scores,
            failures: report.failures.clone(),
            next_actions,
        };
        return Ok(DecisionOutcome {
            verdict,
            requires_vote_pack: false,
        });
    }

    let mut overall_score = BigDecimal::from(0);
    for (critic, weight) in &decision.weights {
        let score = per_critic_scores
            .get(critic)
            .ok_or_else(|| DecisionError::MissingWeightedCritic(critic.clone()))?
            .clone();
        overall_score += decimal_from_f64(*weight) * score;
    }

    let mut soft = report.failures.soft.clone();
    for (critic, floor) in &decision.subscore_floors {
        let Some(score) = per_critic_scores.get(critic).cloned() else {
            continue;
        };
        if score < decimal_from_f64(*floor) {
            soft.push(FailCode::new(format!("{}_BELOW_FLOOR", critic.to_uppercase())));
        }
    }

    let below_threshold = overall_score < decimal_from_f64(decision.overall_threshold);
    if below_threshold {
        soft.push(FailCode::new("OVERALL_SCORE_LOW"));
    }

    let failures = PartitionedFailures {
        hard: Vec::new(),
        soft,
    };

    let (outcome, reason) = if failures.soft.is_empty() {
        (VerdictOutcome::Pass, VerdictReason::Satisfied)
    } else {
        (VerdictOutcome::Fail, VerdictReason::SoftFail)
    };

    let distance_from_threshold = (overall_score.clone() - decimal_from_f64(decision.overall_threshold)).abs();
    let requires_vote_pack = decision.vote_pack_enabled && distance_from_threshold <= decimal_from_f64(decision.uncertainty_band);

    let next_actions = build_next_actions(&failures.hard, &failures.soft);
    let verdict = Verdict {
        schema_version: VERDICT_SCHEMA_VERSION.to_string(),
        run_id: report.run_id.clone(),
        config_id: report.config_id.clone(),
        outcome,
        reason,
        overall_score,
        per_critic_scores,
        failures,
        next_actions,
    };

    Ok(DecisionOutcome {
        verdict,
        requires_vote_pack,
    })
}

/// Aggregates three independent vote-pack verdict outcomes by majority
/// (§4.4: "three such evaluations are aggregated by majority (pass/fail)
/// or, on a tie, escalation"), via `pass` counting as satisfied, `fail`
/// counting as neither satisfied nor unknown, and `escalate` counting as
/// unknown, so any non-majority split resolves to [`TriState::Unknown`],
/// which callers should map to an `escalate` outcome.
#[must_use]
pub fn aggregate_vote_pack(outcomes: [VerdictOutcome; 3]) -> TriState {
    let satisfied = outcomes.iter().filter(|outcome| outcome.is_pass()).count();
    let unknown = outcomes.iter().filter(|outcome| outcome.is_escalate()).count();
    KleeneLogic.require_group(
        2,
        GroupCounts {
            satisfied,
            unknown,
            total: outcomes.len(),
        },
    )
}

/// Builds the per-critic score lookup `Verdict.per_critic_scores` and the
/// weighted-sum calculation both read from, keyed by critic name.
fn score_table(report: &CriticReport) -> BTreeMap<String, BigDecimal> {
    report
        .results_in_order()
        .into_iter()
        .map(|result| (result.critic_name.as_str().to_string(), result.score.clone()))
        .collect()
}

/// Converts an already-validated `[0, 1]` configuration value (a weight, a
/// floor, or a threshold) into a `BigDecimal` with six decimal digits, the
/// same precision `realism-gate-critics` scores are rendered at.
fn decimal_from_f64(value: f64) -> BigDecimal {
    BigDecimal::from_str(&format!("{value:.6}")).unwrap_or_else(|_| BigDecimal::from(0))
}

/// Renders hard failures first, then soft failures, into an ordered
/// next-action plan, most-critical-priority first.
fn build_next_actions(hard: &[FailCode], soft: &[FailCode]) -> Vec<NextAction> {
    let mut actions: Vec<NextAction> = hard.iter().chain(soft.iter()).map(next_action_for).collect();
    actions.sort_by_key(|action| action.priority);
    actions
}

#[cfg(test)]
mod tests {
    use realism_gate_core::fixtures::passing_critic_result;
    use realism_gate_core::fixtures::sample_gate_config;
    use realism_gate_core::fixtures::sample_passing_critic_report;
    use realism_gate_core::ActionKind;
    use realism_gate_core::VerdictOutcome;
    use realism_gate_core::VerdictReason;

    use super::aggregate_vote_pack;
    use super::decide;
    use ret_logic::TriState;

    #[test]
    fn a_clean_report_passes_with_no_failures() {
        let report = sample_passing_critic_report();
        let config = sample_gate_config();
        let outcome = decide(&report, &config).expect("decide");
        assert_eq!(outcome.verdict.outcome, VerdictOutcome::Pass);
        assert_eq!(outcome.verdict.reason, VerdictReason::Satisfied);
        assert!(outcome.verdict.failures.hard.is_empty());
        assert!(outcome.verdict.failures.soft.is_empty());
    }

    #[test]
    fn a_hard_failure_skips_scoring_and_fails_immediately() {
        let mut report = sample_passing_critic_report();
        report.category = passing_critic_result("category", "0.0");
        report.failures.hard.push(realism_gate_core::FailCode::new("CAT_NO_CAR_DETECTED"));
        let config = sample_gate_config();
        let outcome = decide(&report, &config).expect("decide");
        assert_eq!(outcome.verdict.outcome, VerdictOutcome::Fail);
        assert_eq!(outcome.verdict.reason, VerdictReason::HardFail);
        assert_eq!(outcome.verdict.overall_score, bigdecimal::BigDecimal::from(0));
        assert!(!outcome.requires_vote_pack);
        assert_eq!(outcome.verdict.next_actions.first().map(|action| action.priority), Some(1));
    }

    #[test]
    fn a_subscore_floor_violation_appends_a_synthetic_below_floor_code() {
        let mut report = sample_passing_critic_report();
        report.geometry = passing_critic_result("geometry", "0.1");
        let config = sample_gate_config();
        let outcome = decide(&report, &config).expect("decide");
        assert_eq!(outcome.verdict.outcome, VerdictOutcome::Fail);
        assert!(outcome.verdict.failures.soft.iter().any(|code| code.as_str() == "GEOMETRY_BELOW_FLOOR"));
        assert!(outcome.verdict.next_actions.iter().any(|action| action.action_kind == ActionKind::Repair));
    }

    #[test]
    fn a_score_inside_the_uncertainty_band_requires_a_vote_pack() {
        let mut report = sample_passing_critic_report();
        let mut config = sample_gate_config();
        config.decision.overall_threshold = 0.9;
        config.decision.uncertainty_band = 0.2;
        report.category = passing_critic_result("category", "0.9");
        report.prompt_alignment = passing_critic_result("prompt_alignment", "0.9");
        report.realism_quality = passing_critic_result("realism_quality", "0.9");
        report.geometry = passing_critic_result("geometry", "0.9");
        let outcome = decide(&report, &config).expect("decide");
        assert!(outcome.requires_vote_pack);
    }

    #[test]
    fn a_score_outside_the_uncertainty_band_skips_the_vote_pack() {
        let report = sample_passing_critic_report();
        let config = sample_gate_config();
        let outcome = decide(&report, &config).expect("decide");
        assert!(!outcome.requires_vote_pack);
    }

    #[test]
    fn vote_pack_majority_pass_aggregates_to_true() {
        let outcomes = [VerdictOutcome::Pass, VerdictOutcome::Pass, VerdictOutcome::Fail];
        assert_eq!(aggregate_vote_pack(outcomes), TriState::True);
    }

    #[test]
    fn vote_pack_three_way_split_ties_to_unknown() {
        let outcomes = [VerdictOutcome::Pass, VerdictOutcome::Fail, VerdictOutcome::Escalate];
        assert_eq!(aggregate_vote_pack(outcomes), TriState::Unknown);
    }

    #[test]
    fn vote_pack_majority_fail_aggregates_to_false() {
        let outcomes = [VerdictOutcome::Fail, VerdictOutcome::Fail, VerdictOutcome::Pass];
        assert_eq!(aggregate_vote_pack(outcomes), TriState::False);
    }
}
