// realism-gate-critics/src/lib.rs
// ============================================================================
// Module: Critics Stack Root
// Description: The `Critic` trait, `CriticInput`/`RenderedView`, and the
//              registry that assembles four critic results into one
//              `CriticReport`.
// Purpose: Give every critic a common interface and one aggregation point.
// Dependencies: realism_gate_core, crate::{category, geometry,
//               prompt_alignment, realism_quality}
// ============================================================================

//! The Critics Stack (§4.3): Category, Prompt-Alignment, Realism/Quality, and
//! Geometry critics, plus the registry that assembles their four results
//! into one [`CriticReport`].
//!
//! Every critic is a deterministic, closed-form estimator over rendered
//! pixels or mesh geometry rather than a trained model; see each critic
//! module for the specific statistics it reads.

pub mod category;
pub mod geometry;
pub mod pixel_stats;
pub mod prompt_alignment;
pub mod realism_quality;
mod support;

use std::collections::BTreeMap;

use image::RgbImage;
use realism_gate_core::Asset;
use realism_gate_core::CriticName;
use realism_gate_core::CriticReport;
use realism_gate_core::DeterminismRecord;
use realism_gate_core::FailCode;
use realism_gate_core::GateConfig;
use realism_gate_core::GateConfigId;
use realism_gate_core::ModelRecord;
use realism_gate_core::PartitionedFailures;
use realism_gate_core::PortableMesh;
use realism_gate_core::RunId;
use realism_gate_core::View;
use thiserror::Error;

pub use category::CategoryCritic;
pub use geometry::GeometryCritic;
pub use prompt_alignment::PromptAlignmentCritic;
pub use realism_quality::RealismQualityCritic;

/// One rendered view paired with its decoded pixels, the unit every critic
/// that reads images is evaluated against.
pub struct RenderedView {
    /// View metadata (mode, camera, path) as produced by the Render Harness.
    pub view: View,
    /// Decoded RGB pixels for this view.
    pub pixels: RgbImage,
}

/// Everything one critic needs to produce a [`realism_gate_core::CriticResult`].
pub struct CriticInput<'a> {
    /// Run under evaluation.
    pub run_id: &'a RunId,
    /// GateConfig this evaluation runs under.
    pub config_id: &'a GateConfigId,
    /// The asset under evaluation, carrying its generation prompt.
    pub asset: &'a Asset,
    /// The asset's normalized mesh.
    pub mesh: &'a PortableMesh,
    /// Every rendered view, decoded and paired with its metadata.
    pub views: &'a [RenderedView],
    /// The GateConfig governing this evaluation.
    pub config: &'a GateConfig,
    /// Seed recorded into the determinism record (`config.render.seed`).
    pub determinism_seed: u64,
}

/// One concern in the Critics Stack.
pub trait Critic {
    /// Stable name this critic registers under, matching one of
    /// `CriticReport`'s four fixed fields.
    fn name(&self) -> CriticName;

    /// Evaluates `input` and returns this critic's result.
    fn evaluate(&self, input: &CriticInput<'_>) -> realism_gate_core::CriticResult;
}

/// Errors raised while assembling a [`CriticReport`] from registered critics.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CriticError {
    /// A critic name required by `CriticReport`'s fixed fields was never
    /// registered.
    #[error("no critic registered for required name: {0}")]
    MissingCritic(String),
}

/// The four fixed critic names `CriticReport` expects.
const REQUIRED_CRITIC_NAMES: [&str; 4] = ["category", "prompt_alignment", "realism_quality", "geometry"];

/// Holds one boxed [`Critic`] per registered name and assembles their
/// results into a [`CriticReport`].
pub struct CriticRegistry {
    /// Registered critics, keyed by the name they evaluate under.
    critics: BTreeMap<String, Box<dyn Critic + Send + Sync>>,
}

impl CriticRegistry {
    /// Creates a registry with the four built-in critics registered under
    /// their fixed names.
    #[must_use]
    pub fn with_builtin_critics() -> Self {
        let mut registry = Self::new();
        registry.register(CategoryCritic::default());
        registry.register(PromptAlignmentCritic::default());
        registry.register(RealismQualityCritic::default());
        registry.register(GeometryCritic::default());
        registry
    }

    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            critics: BTreeMap::new(),
        }
    }

    /// Registers `critic` under its own [`Critic::name`].
    pub fn register(&mut self, critic: impl Critic + Send + Sync + 'static) {
        self.critics.insert(critic.name().as_str().to_string(), Box::new(critic));
    }

    /// Evaluates every registered critic and assembles a [`CriticReport`].
    ///
    /// # Errors
    ///
    /// Returns [`CriticError::MissingCritic`] if any of the four critic
    /// names `CriticReport` requires is not registered.
    pub fn evaluate_all(&self, input: &CriticInput<'_>) -> Result<CriticReport, CriticError> {
        let mut results = BTreeMap::new();
        for name in REQUIRED_CRITIC_NAMES {
            let critic = self.critics.get(name).ok_or_else(|| CriticError::MissingCritic(name.to_string()))?;
            results.insert(name, critic.evaluate(input));
        }

        let mut models_used: Vec<ModelRecord> = Vec::new();
        for name in REQUIRED_CRITIC_NAMES {
            for model in &results[name].models_used {
                if !models_used.contains(model) {
                    models_used.push(model.clone());
                }
            }
        }

        let hard_fail_codes = &input.config.decision.hard_fail_codes;
        let mut hard: Vec<FailCode> = Vec::new();
        let mut soft: Vec<FailCode> = Vec::new();
        for name in REQUIRED_CRITIC_NAMES {
            for code in &results[name].fail_codes {
                if hard_fail_codes.contains(code) {
                    if !hard.contains(code) {
                        hard.push(code.clone());
                    }
                } else if !soft.contains(code) {
                    soft.push(code.clone());
                }
            }
        }

        let missing = |name: &str| CriticError::MissingCritic(name.to_string());
        let category = results.remove("category").ok_or_else(|| missing("category"))?;
        let prompt_alignment = results.remove("prompt_alignment").ok_or_else(|| missing("prompt_alignment"))?;
        let realism_quality = results.remove("realism_quality").ok_or_else(|| missing("realism_quality"))?;
        let geometry = results.remove("geometry").ok_or_else(|| missing("geometry"))?;

        Ok(CriticReport {
            run_id: input.run_id.clone(),
            config_id: input.config_id.clone(),
            models_used,
            determinism: DeterminismRecord {
                seed: input.determinism_seed,
                thread_counts: BTreeMap::new(),
                framework_versions: BTreeMap::new(),
            },
            category,
            prompt_alignment,
            realism_quality,
            geometry,
            failures: PartitionedFailures { hard, soft },
        })
    }
}

impl Default for CriticRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds a closed-form, non-ML model record: the critic's name, a fixed
/// "version", and a digest of its configuration-derived parameters standing
/// in for trained weights (§9: model identity is part of the gate's
/// identity even for closed-form estimators).
#[must_use]
pub fn closed_form_model_record(name: &str, parameters_digest_input: &str) -> ModelRecord {
    let digest = realism_gate_core::hashing::hash_bytes(
        realism_gate_core::DEFAULT_HASH_ALGORITHM,
        parameters_digest_input.as_bytes(),
    );
    ModelRecord {
        name: name.to_string(),
        version: "closed-form-v1".to_string(),
        weights_digest: digest,
    }
}
