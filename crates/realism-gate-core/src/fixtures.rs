// realism-gate-core/src/fixtures.rs
// ============================================================================
// Module: Shared Test Fixtures
// Description: Sample GateConfig, Asset, CriticResult, CriticReport, and
//              Timestamp literals gated behind the `test-support` feature.
// Purpose: Let every downstream crate's test suite share one set of
//          literals instead of re-deriving them.
// Dependencies: bigdecimal, time, std::collections::{BTreeMap, BTreeSet}
// ============================================================================

//! Sample documents shared by this crate's own tests and by downstream
//! crates' test suites (enabled via the `test-support` feature), so each
//! crate does not re-derive the same large literals.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use bigdecimal::BigDecimal;
use time::macros::datetime;

use crate::asset::Asset;
use crate::config::CategoryCriticParams;
use crate::config::CriticParams;
use crate::config::DecisionParams;
use crate::config::GateConfig;
use crate::config::GeometryCriticParams;
use crate::config::IterationParams;
use crate::config::PromptAlignmentCriticParams;
use crate::config::RealismQualityCriticParams;
use crate::config::RenderParams;
use crate::critic::CriticReport;
use crate::critic::CriticResult;
use crate::critic::DeterminismRecord;
use crate::critic::PartitionedFailures;
use crate::hashing::DEFAULT_HASH_ALGORITHM;
use crate::hashing::hash_bytes;
use crate::identifiers::Category;
use crate::identifiers::CriticName;
use crate::identifiers::GateConfigId;
use crate::identifiers::RunId;
use crate::time::Timestamp;

/// A fully-populated `GateConfig` for the `car` category, matching the
/// illustrative thresholds in §4.3 / §4.4.
#[must_use]
pub fn sample_gate_config() -> GateConfig {
    GateConfig {
        config_id: GateConfigId::new("car_realism_v001"),
        category: Category::new("car"),
        lookdev_scene_id: "studio_v1".into(),
        camera_rig_id: "car_rig_v1".into(),
        render: RenderParams {
            engine: "reference-cpu".into(),
            renderer_version: "1.0.0".into(),
            resolution: [1024, 1024],
            sample_count: 64,
            seed: 42,
            denoise: false,
            worker_count: 1,
            turntable_frame_count: 12,
            required_passes: BTreeSet::new(),
        },
        critics: CriticParams {
            category: CategoryCriticParams {
                min_views: 2,
                min_detector_confidence: 0.6,
                min_clip_margin: 0.05,
                decoy_prompts: vec!["a photo of a sofa".into(), "a photo of a bicycle".into()],
            },
            prompt_alignment: PromptAlignmentCriticParams {
                min_margin: 0.03,
                attribute_probes: vec!["color".into(), "era".into()],
            },
            realism_quality: RealismQualityCriticParams {
                min_aesthetic_score: 0.4,
                max_niqe: 8.0,
                max_noise: 0.2,
                max_magenta_ratio: 0.01,
                min_entropy: 0.3,
                max_clipping_ratio: 0.05,
            },
            geometry: GeometryCriticParams {
                length_bounds_m: [3.0, 6.0],
                width_bounds_m: [1.4, 2.5],
                height_bounds_m: [1.0, 2.5],
                triangle_count_bounds: [5_000, 2_000_000],
                triangle_count_trivial_floor: 1_000,
                min_symmetry: 0.8,
                min_wheel_candidates: 4,
                max_non_manifold_fraction: 0.02,
            },
        },
        decision: DecisionParams {
            weights: [
                ("category".to_string(), 0.25),
                ("prompt_alignment".to_string(), 0.2),
                ("realism_quality".to_string(), 0.25),
                ("geometry".to_string(), 0.3),
            ]
            .into_iter()
            .collect(),
            subscore_floors: [
                ("category".to_string(), 0.5),
                ("prompt_alignment".to_string(), 0.4),
                ("realism_quality".to_string(), 0.4),
                ("geometry".to_string(), 0.5),
            ]
            .into_iter()
            .collect(),
            overall_threshold: 0.8,
            uncertainty_band: 0.03,
            vote_pack_enabled: true,
            hard_fail_codes: [
                "IMPORT_MESH_INVALID",
                "FILE_NOT_FOUND",
                "MESH_INVALID",
                "CAT_NO_CAR_DETECTED",
                "GEO_SCALE_IMPLAUSIBLE",
                "GEO_TRI_COUNT_TRIVIAL",
                "MAT_MISSING_TEXTURES",
                "RENDER_CRASH",
            ]
            .into_iter()
            .map(crate::identifiers::FailCode::new)
            .collect(),
        },
        iteration: IterationParams {
            max_iterations: 5,
            repeated_hard_code_threshold: 2,
            priority_escalation_enabled: true,
        },
    }
}

/// A clean, passing asset matching end-to-end scenario 1 (§8: "Clean
/// sedan").
#[must_use]
pub fn sample_asset() -> Asset {
    Asset {
        asset_id: crate::identifiers::AssetId::new("asset-sedan-1"),
        category: Category::new("car"),
        prompt: "a silver modern sedan".into(),
        portable_export_path: "asset/export.glb".into(),
        portable_export_digest: hash_bytes(DEFAULT_HASH_ALGORITHM, b"sample-mesh-bytes"),
        template_ref: None,
    }
}

/// Builds a passing [`CriticResult`] for `critic_name` with `score`.
#[must_use]
pub fn passing_critic_result(critic_name: &str, score: &str) -> CriticResult {
    CriticResult {
        critic_name: CriticName::new(critic_name),
        score: score.parse::<BigDecimal>().unwrap_or_default(),
        fail_codes: Vec::new(),
        view_evidence: Vec::new(),
        metrics: BTreeMap::new(),
        models_used: Vec::new(),
        pass: true,
    }
}

/// A `CriticReport` in which all four critics pass cleanly, matching
/// end-to-end scenario 1 (§8: "Clean sedan").
#[must_use]
pub fn sample_passing_critic_report() -> CriticReport {
    CriticReport {
        run_id: RunId::new("run-20260728T000000Z-sample"),
        config_id: GateConfigId::new("car_realism_v001"),
        models_used: Vec::new(),
        determinism: DeterminismRecord {
            seed: 42,
            thread_counts: BTreeMap::new(),
            framework_versions: BTreeMap::new(),
        },
        category: passing_critic_result("category", "0.95"),
        prompt_alignment: passing_critic_result("prompt_alignment", "0.9"),
        realism_quality: passing_critic_result("realism_quality", "0.88"),
        geometry: passing_critic_result("geometry", "0.93"),
        failures: PartitionedFailures::default(),
    }
}

/// A fixed reference timestamp (2026-07-28T00:00:00Z) for deterministic
/// fixtures.
#[must_use]
pub fn sample_timestamp() -> Timestamp {
    Timestamp::new(datetime!(2026-07-28 00:00:00 UTC))
}
