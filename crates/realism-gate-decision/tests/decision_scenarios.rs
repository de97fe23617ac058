// crates/realism-gate-decision/tests/decision_scenarios.rs
// ============================================================================
// Module: Decision Scenario Tests
// Description: End-to-end Gate Decision scenarios: clean sedan, textured
//              blob, and vote-pack boundary/tie aggregation.
// Purpose: Validate `decide()` and `aggregate_vote_pack()` against the
//          literal end-to-end scenarios.
// Dependencies: realism_gate_core, realism_gate_decision, ret_logic,
//               bigdecimal
// ============================================================================

//! End-to-end Gate Decision scenarios (§8): clean sedan, textured blob, and
//! vote-pack tie aggregation.

use realism_gate_core::fixtures::passing_critic_result;
use realism_gate_core::fixtures::sample_gate_config;
use realism_gate_core::fixtures::sample_passing_critic_report;
use realism_gate_core::ActionKind;
use realism_gate_core::FailCode;
use realism_gate_core::VerdictOutcome;
use realism_gate_core::VerdictReason;
use bigdecimal::BigDecimal;
use realism_gate_decision::aggregate_vote_pack;
use realism_gate_decision::decide;
use ret_logic::TriState;

#[test]
fn clean_sedan_passes_with_score_at_or_above_threshold() {
    let report = sample_passing_critic_report();
    let config = sample_gate_config();
    let outcome = decide(&report, &config).expect("decide");

    assert_eq!(outcome.verdict.outcome, VerdictOutcome::Pass);
    assert_eq!(outcome.verdict.reason, VerdictReason::Satisfied);
    assert!(outcome.verdict.overall_score >= "0.80".parse::<BigDecimal>().expect("parse threshold"));
    assert!(outcome.verdict.failures.hard.is_empty());
    assert!(outcome.verdict.failures.soft.is_empty());
}

#[test]
fn textured_blob_fails_on_hard_codes_with_geometry_repair_first() {
    let mut report = sample_passing_critic_report();
    report.category = passing_critic_result("category", "0.2");
    report.geometry = passing_critic_result("geometry", "0.05");
    report.failures.hard.push(FailCode::new("GEO_TRI_COUNT_TRIVIAL"));
    report.failures.hard.push(FailCode::new("CAT_CLAY_DISAGREEMENT"));
    let config = sample_gate_config();

    let outcome = decide(&report, &config).expect("decide");

    assert_eq!(outcome.verdict.outcome, VerdictOutcome::Fail);
    assert_eq!(outcome.verdict.reason, VerdictReason::HardFail);
    assert!(outcome.verdict.failures.hard.iter().any(|code| code.as_str() == "GEO_TRI_COUNT_TRIVIAL"));
    assert!(outcome.verdict.failures.hard.iter().any(|code| code.as_str() == "CAT_CLAY_DISAGREEMENT"));

    let first_action = outcome.verdict.next_actions.first().expect("at least one next action");
    assert_eq!(first_action.priority, 1);
    assert_eq!(first_action.action_kind, ActionKind::Repair);
    assert_eq!(first_action.template_hint.as_deref(), Some("car_basic_scaffold"));
}

#[test]
fn boundary_asset_inside_the_uncertainty_band_fires_the_vote_pack() {
    let mut config = sample_gate_config();
    config.decision.overall_threshold = 0.8;
    config.decision.uncertainty_band = 0.03;
    let mut report = sample_passing_critic_report();
    // Weighted overall lands at threshold - 0.01, inside the 0.03 band.
    report.category = passing_critic_result("category", "0.79");
    report.prompt_alignment = passing_critic_result("prompt_alignment", "0.79");
    report.realism_quality = passing_critic_result("realism_quality", "0.79");
    report.geometry = passing_critic_result("geometry", "0.79");

    let outcome = decide(&report, &config).expect("decide");

    assert!(outcome.requires_vote_pack);
}

#[test]
fn vote_pack_majority_resolves_without_a_tie() {
    let outcomes = [VerdictOutcome::Pass, VerdictOutcome::Pass, VerdictOutcome::Fail];
    assert_eq!(aggregate_vote_pack(outcomes), TriState::True);
}

#[test]
fn vote_pack_even_split_escalates_on_tie() {
    let outcomes = [VerdictOutcome::Pass, VerdictOutcome::Fail, VerdictOutcome::Escalate];
    assert_eq!(aggregate_vote_pack(outcomes), TriState::Unknown);
}
