// realism-gate-core/src/critic.rs
// ============================================================================
// Module: CriticResult And CriticReport
// Description: Per-critic scores and evidence, and the aggregated report
//              that carries all four into the Gate Decision.
// Purpose: Give every critic a common, serializable output shape.
// Dependencies: bigdecimal, serde, std::collections::BTreeMap
// ============================================================================

//! `CriticResult` and `CriticReport` (§3, §4.3.5).

use std::collections::BTreeMap;

use bigdecimal::BigDecimal;
use serde::Deserialize;
use serde::Serialize;

use crate::hashing::HashDigest;
use crate::identifiers::CriticName;
use crate::identifiers::FailCode;
use crate::identifiers::GateConfigId;
use crate::identifiers::RunId;
use crate::identifiers::ViewId;

/// Identity and weights digest of one model a critic consulted (§9: model
/// weights are part of the gate's identity).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelRecord {
    /// Model name.
    pub name: String,
    /// Model version.
    pub version: String,
    /// Digest of the model's weights (or, for closed-form estimators, of
    /// the fixed parameter set that stands in for weights).
    pub weights_digest: HashDigest,
}

/// Per-view evidence a critic recorded while reaching its verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ViewEvidence {
    /// View this evidence is about.
    pub view_id: ViewId,
    /// Whether this view individually passed the critic's per-view test.
    pub passed: bool,
    /// Free-form metric key/values recorded for this view.
    pub metrics: BTreeMap<String, f64>,
}

/// The output of one critic for one run (§3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CriticResult {
    /// Name of the critic that produced this result.
    pub critic_name: CriticName,
    /// Normalized score in `[0, 1]`.
    pub score: BigDecimal,
    /// Ordered list of stable failure codes, most significant first.
    pub fail_codes: Vec<FailCode>,
    /// Per-view evidence.
    pub view_evidence: Vec<ViewEvidence>,
    /// Free-form metric key/values aggregated across views.
    pub metrics: BTreeMap<String, f64>,
    /// Models consulted while computing this result.
    pub models_used: Vec<ModelRecord>,
    /// Whether the critic itself considers this a pass (informational;
    /// the Gate Decision alone determines hard/soft partitioning).
    pub pass: bool,
}

impl CriticResult {
    /// Returns `true` if `code` appears in this result's fail codes.
    #[must_use]
    pub fn has_fail_code(&self, code: &FailCode) -> bool {
        self.fail_codes.iter().any(|existing| existing == code)
    }
}

/// Determinism record carried by a `CriticReport` (§3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeterminismRecord {
    /// Seed used by the render/critic pipeline for this run.
    pub seed: u64,
    /// Thread counts pinned for this run.
    pub thread_counts: BTreeMap<String, u32>,
    /// Framework/library versions recorded for audit.
    pub framework_versions: BTreeMap<String, String>,
}

/// Failure codes partitioned into hard (disqualifying) and soft (the
/// remainder), per the Gate Decision's configured hard-fail set (§4.3.5,
/// §4.4).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartitionedFailures {
    /// Codes the Gate Decision treats as immediately disqualifying.
    pub hard: Vec<FailCode>,
    /// The remainder.
    pub soft: Vec<FailCode>,
}

impl PartitionedFailures {
    /// Returns `true` if any hard failure code is present.
    #[must_use]
    pub fn has_hard_failure(&self) -> bool {
        !self.hard.is_empty()
    }
}

/// The aggregated output of the Critics Stack for one run (§3, §4.3.5).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CriticReport {
    /// Run this report belongs to.
    pub run_id: RunId,
    /// GateConfig this report was produced under.
    pub config_id: GateConfigId,
    /// All models consulted by any critic, deduplicated.
    pub models_used: Vec<ModelRecord>,
    /// Determinism record.
    pub determinism: DeterminismRecord,
    /// The category critic's result.
    pub category: CriticResult,
    /// The prompt-alignment critic's result.
    pub prompt_alignment: CriticResult,
    /// The realism/quality critic's result.
    pub realism_quality: CriticResult,
    /// The geometry critic's result.
    pub geometry: CriticResult,
    /// Hard/soft partitioned failure codes across all four critics.
    pub failures: PartitionedFailures,
}

impl CriticReport {
    /// Returns the four critic results in a fixed, stable order
    /// (category, prompt_alignment, realism_quality, geometry).
    #[must_use]
    pub fn results_in_order(&self) -> [&CriticResult; 4] {
        [
            &self.category,
            &self.prompt_alignment,
            &self.realism_quality,
            &self.geometry,
        ]
    }

    /// Looks up a critic result by name.
    #[must_use]
    pub fn result_for(&self, name: &CriticName) -> Option<&CriticResult> {
        self.results_in_order()
            .into_iter()
            .find(|result| &result.critic_name == name)
    }
}

#[cfg(test)]
mod tests {
    use bigdecimal::BigDecimal;

    use super::CriticReport;
    use super::CriticResult;
    use super::DeterminismRecord;
    use super::PartitionedFailures;
    use crate::identifiers::CriticName;
    use crate::identifiers::FailCode;
    use crate::identifiers::GateConfigId;
    use crate::identifiers::RunId;

    fn result(name: &str, score: &str) -> CriticResult {
        CriticResult {
            critic_name: CriticName::new(name),
            score: score.parse::<BigDecimal>().expect("parse score"),
            fail_codes: Vec::new(),
            view_evidence: Vec::new(),
            metrics: std::collections::BTreeMap::new(),
            models_used: Vec::new(),
            pass: true,
        }
    }

    #[test]
    fn results_in_order_is_stable() {
        let report = CriticReport {
            run_id: RunId::new("run-1"),
            config_id: GateConfigId::new("car_realism_v001"),
            models_used: Vec::new(),
            determinism: DeterminismRecord {
                seed: 1,
                thread_counts: std::collections::BTreeMap::new(),
                framework_versions: std::collections::BTreeMap::new(),
            },
            category: result("category", "0.9"),
            prompt_alignment: result("prompt_alignment", "0.8"),
            realism_quality: result("realism_quality", "0.7"),
            geometry: result("geometry", "0.95"),
            failures: PartitionedFailures::default(),
        };

        let names: Vec<&str> = report
            .results_in_order()
            .iter()
            .map(|result| result.critic_name.as_str())
            .collect();
        assert_eq!(names, vec!["category", "prompt_alignment", "realism_quality", "geometry"]);

        let found = report.result_for(&CriticName::new("geometry")).expect("geometry result");
        assert_eq!(found.score, "0.95".parse::<BigDecimal>().expect("parse"));
    }

    #[test]
    fn partitioned_failures_detects_hard_failures() {
        let mut failures = PartitionedFailures::default();
        assert!(!failures.has_hard_failure());
        failures.hard.push(FailCode::new("GEO_SCALE_IMPLAUSIBLE"));
        assert!(failures.has_hard_failure());
    }
}
