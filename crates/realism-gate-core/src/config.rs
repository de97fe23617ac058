// realism-gate-core/src/config.rs
// ============================================================================
// Module: GateConfig Document
// Description: Render, critic, decision, and iteration parameters for one
//              immutable, versioned, category-specific gate.
// Purpose: Carry a gate's full identity and thresholds as one validated,
//          serializable record.
// Dependencies: serde, std::collections::{BTreeMap, BTreeSet}
// ============================================================================

//! The `GateConfig` document (§3, §6): an immutable, versioned,
//! category-specific configuration for one gate.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::identifiers::Category;
use crate::identifiers::FailCode;
use crate::identifiers::GateConfigId;

/// An immutable configuration document identifying a category-specific
/// gate version. Re-calibration replaces the identifier rather than
/// mutating an existing one (§4.4 Goodharting defenses).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GateConfig {
    /// Opaque configuration identifier.
    pub config_id: GateConfigId,
    /// Category this configuration governs.
    pub category: Category,
    /// Pinned lookdev scene identifier.
    pub lookdev_scene_id: String,
    /// Pinned camera rig identifier.
    pub camera_rig_id: String,
    /// Render Harness parameters.
    pub render: RenderParams,
    /// Per-critic parameters, keyed by critic name.
    pub critics: CriticParams,
    /// Gate Decision parameters.
    pub decision: DecisionParams,
    /// Iteration Controller parameters.
    pub iteration: IterationParams,
}

/// Render Harness parameters (§4.2, §6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderParams {
    /// Renderer engine name (informational; recorded into determinism
    /// records).
    pub engine: String,
    /// Pinned renderer version.
    pub renderer_version: String,
    /// Output resolution `[width, height]`.
    pub resolution: [u32; 2],
    /// Sample count for the beauty pass.
    pub sample_count: u32,
    /// Fixed seed for all render-time entropy.
    pub seed: u64,
    /// Denoising toggle; must be `false` for the baseline determinism
    /// contract.
    pub denoise: bool,
    /// Pinned worker thread count for the renderer's internal pool.
    pub worker_count: u32,
    /// Number of turntable frames (12 default for the car category).
    pub turntable_frame_count: u32,
    /// Auxiliary passes a category config requires unconditionally; a
    /// missing required pass is promoted from a warning to the hard
    /// failure `RENDER_MISSING_REQUIRED_PASS` (SPEC_FULL §9 resolution 2).
    #[serde(default)]
    pub required_passes: BTreeSet<crate::view::AuxiliaryPass>,
}

/// Per-critic configuration, keyed by critic concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CriticParams {
    /// Category critic parameters.
    pub category: CategoryCriticParams,
    /// Prompt-alignment critic parameters.
    pub prompt_alignment: PromptAlignmentCriticParams,
    /// Realism/quality critic parameters.
    pub realism_quality: RealismQualityCriticParams,
    /// Geometry critic parameters.
    pub geometry: GeometryCriticParams,
}

/// Category critic configuration (§4.3.1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryCriticParams {
    /// Minimum number of views that must be evaluated.
    pub min_views: u32,
    /// Minimum detector confidence for a view to pass.
    pub min_detector_confidence: f64,
    /// Minimum text-vs-decoy classification margin.
    pub min_clip_margin: f64,
    /// Decoy prompts contrasted against the category prompt.
    pub decoy_prompts: Vec<String>,
}

/// Prompt-alignment critic configuration (§4.3.2).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PromptAlignmentCriticParams {
    /// Minimum similarity margin over the best-matching decoy.
    pub min_margin: f64,
    /// Attribute probes (color, era, style, ...) appended to the decoy set.
    #[serde(default)]
    pub attribute_probes: Vec<String>,
}

/// Realism/quality critic configuration (§4.3.3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RealismQualityCriticParams {
    /// Minimum acceptable aesthetic predictor score.
    pub min_aesthetic_score: f64,
    /// Maximum acceptable no-reference quality (NIQE-style) metric.
    pub max_niqe: f64,
    /// Maximum acceptable noise estimate on near-flat regions.
    pub max_noise: f64,
    /// Maximum acceptable magenta/default-pink pixel ratio.
    pub max_magenta_ratio: f64,
    /// Minimum acceptable regional entropy.
    pub min_entropy: f64,
    /// Maximum acceptable clipped-pixel ratio.
    pub max_clipping_ratio: f64,
}

/// Geometry critic configuration (§4.3.4).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeometryCriticParams {
    /// Plausible bounds `[min, max]` along each axis, in meters:
    /// `(length, width, height)`.
    pub length_bounds_m: [f64; 2],
    /// See [`GeometryCriticParams::length_bounds_m`].
    pub width_bounds_m: [f64; 2],
    /// See [`GeometryCriticParams::length_bounds_m`].
    pub height_bounds_m: [f64; 2],
    /// Plausible triangle count bounds `[min, max]`.
    pub triangle_count_bounds: [u64; 2],
    /// Secondary floor below which triangle count is a hard failure.
    pub triangle_count_trivial_floor: u64,
    /// Minimum bilateral symmetry score.
    pub min_symmetry: f64,
    /// Minimum number of wheel-candidate components (car category).
    pub min_wheel_candidates: u32,
    /// Maximum acceptable fraction of non-manifold edges.
    pub max_non_manifold_fraction: f64,
}

/// Gate Decision parameters (§4.4, §6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DecisionParams {
    /// Per-critic weights; must sum to 1 (validated at load time).
    pub weights: BTreeMap<String, f64>,
    /// Per-critic subscore floors.
    pub subscore_floors: BTreeMap<String, f64>,
    /// Overall score threshold for a `pass` verdict.
    pub overall_threshold: f64,
    /// Half-width of the uncertainty band around `overall_threshold` that
    /// triggers the vote pack.
    pub uncertainty_band: f64,
    /// Whether the vote-pack ensemble is enabled for this config.
    pub vote_pack_enabled: bool,
    /// Failure codes treated as immediately disqualifying (§4.4).
    pub hard_fail_codes: BTreeSet<FailCode>,
}

/// Iteration Controller parameters (§4.5, §6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IterationParams {
    /// Maximum number of iterations before escalation.
    pub max_iterations: u32,
    /// Number of consecutive iterations with an identical hard code that
    /// triggers escalation.
    pub repeated_hard_code_threshold: u32,
    /// Whether the controller may raise repair-issue priority with each
    /// iteration.
    pub priority_escalation_enabled: bool,
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::CategoryCriticParams;
    use super::CriticParams;
    use super::DecisionParams;
    use super::GateConfig;
    use super::GeometryCriticParams;
    use super::IterationParams;
    use super::PromptAlignmentCriticParams;
    use super::RealismQualityCriticParams;
    use super::RenderParams;
    use crate::identifiers::Category;
    use crate::identifiers::GateConfigId;

    pub(crate) fn sample_gate_config() -> GateConfig {
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
                    decoy_prompts: vec!["a photo of a sofa".into()],
                },
                prompt_alignment: PromptAlignmentCriticParams {
                    min_margin: 0.03,
                    attribute_probes: vec!["color".into()],
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
                hard_fail_codes: BTreeSet::new(),
            },
            iteration: IterationParams {
                max_iterations: 5,
                repeated_hard_code_threshold: 2,
                priority_escalation_enabled: true,
            },
        }
    }

    #[test]
    fn sample_config_round_trips_through_json() {
        let config = sample_gate_config();
        let json = serde_json::to_string(&config).expect("serialize config");
        let parsed: GateConfig = serde_json::from_str(&json).expect("deserialize config");
        assert_eq!(parsed, config);
    }
}
