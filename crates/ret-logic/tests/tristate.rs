// crates/ret-logic/tests/tristate.rs
// ============================================================================
// Module: Tri-State Tests
// Description: Tests for tri-state logic tables and group semantics.
// Purpose: Validate tri-state logic tables and group semantics behavior.
// Dependencies: ret_logic::tristate
// ============================================================================
//! ## Overview
//! Validates tri-state evaluation modes and group-threshold semantics.

use ret_logic::BochvarLogic;
use ret_logic::GroupCounts;
use ret_logic::KleeneLogic;
use ret_logic::LogicMode;
use ret_logic::TriLogic;
use ret_logic::TriState;

// ============================================================================
// SECTION: Kleene Logic Complete Truth Tables
// ============================================================================

#[test]
fn kleene_and_complete_truth_table() {
    use TriState::False;
    use TriState::True;
    use TriState::Unknown;
    let logic = KleeneLogic;

    assert_eq!(logic.and(True, True), True);
    assert_eq!(logic.and(True, False), False);
    assert_eq!(logic.and(True, Unknown), Unknown);

    assert_eq!(logic.and(False, True), False);
    assert_eq!(logic.and(False, False), False);
    assert_eq!(logic.and(False, Unknown), False);

    assert_eq!(logic.and(Unknown, True), Unknown);
    assert_eq!(logic.and(Unknown, False), False);
    assert_eq!(logic.and(Unknown, Unknown), Unknown);
}

#[test]
fn kleene_or_complete_truth_table() {
    use TriState::False;
    use TriState::True;
    use TriState::Unknown;
    let logic = KleeneLogic;

    assert_eq!(logic.or(True, True), True);
    assert_eq!(logic.or(True, False), True);
    assert_eq!(logic.or(True, Unknown), True);

    assert_eq!(logic.or(False, True), True);
    assert_eq!(logic.or(False, False), False);
    assert_eq!(logic.or(False, Unknown), Unknown);

    assert_eq!(logic.or(Unknown, True), True);
    assert_eq!(logic.or(Unknown, False), Unknown);
    assert_eq!(logic.or(Unknown, Unknown), Unknown);
}

#[test]
fn kleene_not_complete_truth_table() {
    use TriState::False;
    use TriState::True;
    use TriState::Unknown;
    let logic = KleeneLogic;

    assert_eq!(logic.not(True), False);
    assert_eq!(logic.not(False), True);
    assert_eq!(logic.not(Unknown), Unknown);
}

#[test]
fn kleene_and_is_commutative() {
    use TriState::False;
    use TriState::True;
    use TriState::Unknown;
    let logic = KleeneLogic;
    let values = [True, False, Unknown];

    for &a in &values {
        for &b in &values {
            assert_eq!(logic.and(a, b), logic.and(b, a));
        }
    }
}

#[test]
fn kleene_or_is_commutative() {
    use TriState::False;
    use TriState::True;
    use TriState::Unknown;
    let logic = KleeneLogic;
    let values = [True, False, Unknown];

    for &a in &values {
        for &b in &values {
            assert_eq!(logic.or(a, b), logic.or(b, a));
        }
    }
}

#[test]
fn kleene_double_negation() {
    use TriState::False;
    use TriState::True;
    use TriState::Unknown;
    let logic = KleeneLogic;

    assert_eq!(logic.not(logic.not(True)), True);
    assert_eq!(logic.not(logic.not(False)), False);
    assert_eq!(logic.not(logic.not(Unknown)), Unknown);
}

// ============================================================================
// SECTION: Bochvar Logic Complete Truth Tables
// ============================================================================

#[test]
fn bochvar_and_complete_truth_table() {
    use TriState::False;
    use TriState::True;
    use TriState::Unknown;
    let logic = BochvarLogic;

    assert_eq!(logic.and(True, True), True);
    assert_eq!(logic.and(True, False), False);
    assert_eq!(logic.and(True, Unknown), Unknown);

    assert_eq!(logic.and(False, True), False);
    assert_eq!(logic.and(False, False), False);
    assert_eq!(logic.and(False, Unknown), Unknown);

    assert_eq!(logic.and(Unknown, True), Unknown);
    assert_eq!(logic.and(Unknown, False), Unknown);
    assert_eq!(logic.and(Unknown, Unknown), Unknown);
}

#[test]
fn bochvar_or_complete_truth_table() {
    use TriState::False;
    use TriState::True;
    use TriState::Unknown;
    let logic = BochvarLogic;

    assert_eq!(logic.or(True, True), True);
    assert_eq!(logic.or(True, False), True);
    assert_eq!(logic.or(True, Unknown), Unknown);

    assert_eq!(logic.or(False, True), True);
    assert_eq!(logic.or(False, False), False);
    assert_eq!(logic.or(False, Unknown), Unknown);

    assert_eq!(logic.or(Unknown, True), Unknown);
    assert_eq!(logic.or(Unknown, False), Unknown);
    assert_eq!(logic.or(Unknown, Unknown), Unknown);
}

#[test]
fn bochvar_not_complete_truth_table() {
    use TriState::False;
    use TriState::True;
    use TriState::Unknown;
    let logic = BochvarLogic;

    assert_eq!(logic.not(True), False);
    assert_eq!(logic.not(False), True);
    assert_eq!(logic.not(Unknown), Unknown);
}

#[test]
fn bochvar_vs_kleene_key_difference() {
    use TriState::False;
    use TriState::True;
    use TriState::Unknown;

    assert_eq!(KleeneLogic.and(False, Unknown), False, "Kleene: False absorbs Unknown");
    assert_eq!(BochvarLogic.and(False, Unknown), Unknown, "Bochvar: Unknown is infectious");

    assert_eq!(KleeneLogic.or(True, Unknown), True, "Kleene: True absorbs Unknown");
    assert_eq!(BochvarLogic.or(True, Unknown), Unknown, "Bochvar: Unknown is infectious");
}

// ============================================================================
// SECTION: Runtime Logic Mode
// ============================================================================

#[test]
fn logic_mode_dispatch_matches_underlying_table() {
    assert_eq!(LogicMode::Kleene.and(TriState::True, TriState::Unknown), KleeneLogic.and(TriState::True, TriState::Unknown));
    assert_eq!(LogicMode::Bochvar.and(TriState::False, TriState::Unknown), BochvarLogic.and(TriState::False, TriState::Unknown));
    assert_eq!(LogicMode::Kleene.or(TriState::False, TriState::Unknown), KleeneLogic.or(TriState::False, TriState::Unknown));
    assert_eq!(LogicMode::Bochvar.not(TriState::True), BochvarLogic.not(TriState::True));
}

// ============================================================================
// SECTION: require_group Complete Boundary Tests
// ============================================================================

#[test]
fn require_group_min_zero_always_true() {
    let logic = KleeneLogic;
    let test_cases = [
        GroupCounts { satisfied: 0, unknown: 0, total: 0 },
        GroupCounts { satisfied: 0, unknown: 0, total: 5 },
        GroupCounts { satisfied: 0, unknown: 5, total: 5 },
        GroupCounts { satisfied: 5, unknown: 0, total: 5 },
        GroupCounts { satisfied: 2, unknown: 3, total: 5 },
    ];

    for counts in test_cases {
        assert_eq!(logic.require_group(0, counts), TriState::True);
    }
}

#[test]
fn require_group_exact_threshold() {
    let logic = KleeneLogic;

    let counts = GroupCounts { satisfied: 3, unknown: 0, total: 5 };
    assert_eq!(logic.require_group(3, counts), TriState::True);

    let counts = GroupCounts { satisfied: 2, unknown: 0, total: 5 };
    assert_eq!(logic.require_group(3, counts), TriState::False);

    let counts = GroupCounts { satisfied: 4, unknown: 0, total: 5 };
    assert_eq!(logic.require_group(3, counts), TriState::True);
}

#[test]
fn require_group_impossible_path() {
    let logic = KleeneLogic;

    let counts = GroupCounts { satisfied: 1, unknown: 1, total: 5 };
    assert_eq!(logic.require_group(3, counts), TriState::False);

    let counts = GroupCounts { satisfied: 2, unknown: 0, total: 5 };
    assert_eq!(logic.require_group(3, counts), TriState::False);
}

#[test]
fn require_group_uncertain_outcomes() {
    let logic = KleeneLogic;

    let counts = GroupCounts { satisfied: 2, unknown: 2, total: 5 };
    assert_eq!(logic.require_group(3, counts), TriState::Unknown);

    let counts = GroupCounts { satisfied: 2, unknown: 1, total: 5 };
    assert_eq!(logic.require_group(3, counts), TriState::Unknown);
}

/// Three independent evaluations, majority wins: a tie (one pass, one fail,
/// one escalate) yields `Unknown`, which callers treat as an escalation.
#[test]
fn require_group_vote_pack_tie_is_unknown() {
    let logic = KleeneLogic;
    // One "pass" (satisfied), one "fail" (neither satisfied nor unknown),
    // one "escalate" (unknown).
    let counts = GroupCounts { satisfied: 1, unknown: 1, total: 3 };
    assert_eq!(logic.require_group(2, counts), TriState::Unknown);
}

#[test]
fn require_group_min_one() {
    let logic = KleeneLogic;

    assert_eq!(
        logic.require_group(1, GroupCounts { satisfied: 1, unknown: 0, total: 3 }),
        TriState::True
    );
    assert_eq!(
        logic.require_group(1, GroupCounts { satisfied: 0, unknown: 1, total: 3 }),
        TriState::Unknown
    );
    assert_eq!(
        logic.require_group(1, GroupCounts { satisfied: 0, unknown: 0, total: 3 }),
        TriState::False
    );
}

#[test]
fn require_group_min_equals_total() {
    let logic = KleeneLogic;

    assert_eq!(
        logic.require_group(5, GroupCounts { satisfied: 5, unknown: 0, total: 5 }),
        TriState::True
    );
    assert_eq!(
        logic.require_group(5, GroupCounts { satisfied: 4, unknown: 1, total: 5 }),
        TriState::Unknown
    );
    assert_eq!(
        logic.require_group(5, GroupCounts { satisfied: 4, unknown: 0, total: 5 }),
        TriState::False
    );
}

#[test]
fn require_group_u8_max_boundary() {
    let logic = KleeneLogic;

    let counts = GroupCounts { satisfied: 255, unknown: 0, total: 255 };
    assert_eq!(logic.require_group(255, counts), TriState::True);

    let counts = GroupCounts { satisfied: 254, unknown: 1, total: 255 };
    assert_eq!(logic.require_group(255, counts), TriState::Unknown);
}

#[test]
fn group_counts_failed_calculation() {
    let counts = GroupCounts { satisfied: 2, unknown: 1, total: 5 };
    assert_eq!(counts.failed(), 2);

    let counts = GroupCounts { satisfied: 5, unknown: 0, total: 5 };
    assert_eq!(counts.failed(), 0);

    let counts = GroupCounts { satisfied: 0, unknown: 0, total: 5 };
    assert_eq!(counts.failed(), 5);

    // Saturating behavior (should not panic on overflow).
    let counts = GroupCounts { satisfied: 10, unknown: 10, total: 5 };
    assert_eq!(counts.failed(), 0);
}

// ============================================================================
// SECTION: TriState Helper Method Tests
// ============================================================================

#[test]
fn tristate_is_true() {
    assert!(TriState::True.is_true());
    assert!(!TriState::False.is_true());
    assert!(!TriState::Unknown.is_true());
}

#[test]
fn tristate_is_false() {
    assert!(!TriState::True.is_false());
    assert!(TriState::False.is_false());
    assert!(!TriState::Unknown.is_false());
}

#[test]
fn tristate_is_unknown() {
    assert!(!TriState::True.is_unknown());
    assert!(!TriState::False.is_unknown());
    assert!(TriState::Unknown.is_unknown());
}

#[test]
fn tristate_from_bool() {
    assert_eq!(TriState::from(true), TriState::True);
    assert_eq!(TriState::from(false), TriState::False);
}
