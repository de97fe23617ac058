// realism-gate-core/src/iteration.rs
// ============================================================================
// Module: IterationState
// Description: Accumulated history for one work-item chasing a pass
//              across repair iterations.
// Purpose: Carry the retry cap, lineage, and per-iteration fail codes the
//          Iteration Controller needs to decide what happens next.
// Dependencies: serde
// ============================================================================

//! `IterationState` (§3, §4.5): accumulated history for one work-item
//! chasing a pass across repair iterations.

use serde::Deserialize;
use serde::Serialize;

use crate::identifiers::FailCode;
use crate::identifiers::IssueId;
use crate::identifiers::RunId;
use crate::verdict::VerdictOutcome;

/// One iteration's outcome, as retained in history (§3: "accumulated
/// history of (verdict, fail-codes) per iteration").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IterationHistoryEntry {
    /// Iteration index this entry records.
    pub iteration_index: u32,
    /// Run id that produced this entry.
    pub run_id: RunId,
    /// The verdict outcome reached.
    pub outcome: VerdictOutcome,
    /// Hard failure codes observed, for repeated-code escalation checks.
    pub hard_fail_codes: Vec<FailCode>,
}

/// Accumulated state for one work-item across repair iterations (§3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IterationState {
    /// Identifier of the original issue / work-item.
    pub issue_id: IssueId,
    /// Current iteration index.
    pub iteration_index: u32,
    /// History of prior iterations, oldest first.
    pub history: Vec<IterationHistoryEntry>,
    /// Configured retry cap.
    pub max_iterations: u32,
    /// Set once escalation has been recorded for this issue.
    pub escalated: bool,
}

impl IterationState {
    /// Creates the initial state for a freshly-started issue.
    #[must_use]
    pub const fn new(issue_id: IssueId, max_iterations: u32) -> Self {
        Self {
            issue_id,
            iteration_index: 0,
            history: Vec::new(),
            max_iterations,
            escalated: false,
        }
    }

    /// Returns the two most recent hard failure codes recorded in history
    /// that are identical, if any, for the repeated-hard-code escalation
    /// trigger (§4.5).
    #[must_use]
    pub fn most_recent_repeated_hard_code(&self, threshold: u32) -> Option<&FailCode> {
        if threshold == 0 {
            return None;
        }
        let window_size = threshold as usize;
        if self.history.len() < window_size {
            return None;
        }
        let window = &self.history[self.history.len() - window_size..];
        let first_entry = window.first()?;
        let candidate = first_entry.hard_fail_codes.first()?;
        let all_match = window.iter().all(|entry| entry.hard_fail_codes.first() == Some(candidate));
        if all_match { Some(candidate) } else { None }
    }

    /// Returns `true` iff `iteration_index` has reached `max_iterations`.
    #[must_use]
    pub const fn at_retry_cap(&self) -> bool {
        self.iteration_index >= self.max_iterations
    }
}

#[cfg(test)]
mod tests {
    use super::IterationHistoryEntry;
    use super::IterationState;
    use crate::identifiers::FailCode;
    use crate::identifiers::IssueId;
    use crate::identifiers::RunId;
    use crate::verdict::VerdictOutcome;

    fn entry(index: u32, code: &str) -> IterationHistoryEntry {
        IterationHistoryEntry {
            iteration_index: index,
            run_id: RunId::new(format!("run-{index}")),
            outcome: VerdictOutcome::Fail,
            hard_fail_codes: vec![FailCode::new(code)],
        }
    }

    #[test]
    fn detects_repeated_hard_code_across_threshold_window() {
        let mut state = IterationState::new(IssueId::new("issue-1"), 5);
        state.history.push(entry(0, "CAT_NO_CAR_DETECTED"));
        state.history.push(entry(1, "CAT_NO_CAR_DETECTED"));
        let repeated = state.most_recent_repeated_hard_code(2);
        assert_eq!(repeated, Some(&FailCode::new("CAT_NO_CAR_DETECTED")));
    }

    #[test]
    fn no_repeat_when_codes_differ() {
        let mut state = IterationState::new(IssueId::new("issue-1"), 5);
        state.history.push(entry(0, "CAT_NO_CAR_DETECTED"));
        state.history.push(entry(1, "GEO_ASYMMETRIC"));
        assert_eq!(state.most_recent_repeated_hard_code(2), None);
    }

    #[test]
    fn at_retry_cap_compares_against_max_iterations() {
        let mut state = IterationState::new(IssueId::new("issue-1"), 2);
        assert!(!state.at_retry_cap());
        state.iteration_index = 2;
        assert!(state.at_retry_cap());
    }
}
