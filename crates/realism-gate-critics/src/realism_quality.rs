// realism-gate-critics/src/realism_quality.rs
// ============================================================================
// Module: Realism/Quality Critic
// Description: Aesthetic, no-reference quality, noise, clipping,
//              magenta-ratio, and entropy checks over every beauty view.
// Purpose: Penalize obvious synthesis artifacts and low-quality renders.
// Dependencies: realism_gate_core, crate::pixel_stats
// ============================================================================

//! The Realism/Quality critic (§4.3.3): a no-reference image-quality check
//! over every rendered view, independent of category or prompt.

use std::collections::BTreeMap;

use realism_gate_core::CriticResult;
use realism_gate_core::FailCode;
use realism_gate_core::ViewEvidence;

use crate::closed_form_model_record;
use crate::pixel_stats;
use crate::pixel_stats::ImageStats;
use crate::support::score_from_unit_f64;
use crate::Critic;
use crate::CriticInput;

/// Scales a raw noise estimate into a NIQE-like `[0, 40]` range; higher is
/// worse, matching the convention real no-reference quality metrics use.
const NIQE_SCALE: f64 = 200.0;

/// Closed-form stand-in for an aesthetic predictor and a no-reference
/// quality (NIQE-style) metric, both derived from [`pixel_stats::compute`].
#[derive(Debug, Default)]
pub struct RealismQualityCritic;

impl Critic for RealismQualityCritic {
    fn name(&self) -> realism_gate_core::CriticName {
        realism_gate_core::CriticName::new("realism_quality")
    }

    fn evaluate(&self, input: &CriticInput<'_>) -> CriticResult {
        let params = &input.config.critics.realism_quality;

        let mut view_evidence = Vec::new();
        let mut aesthetic_scores = Vec::new();
        let mut niqe_values = Vec::new();
        let mut noise_values = Vec::new();
        let mut magenta_values = Vec::new();
        let mut entropy_values = Vec::new();
        let mut clipping_values = Vec::new();

        for view in input.views {
            let stats = pixel_stats::compute(&view.pixels);
            let aesthetic = aesthetic_score(&stats);
            let niqe = stats.noise_estimate * NIQE_SCALE;

            let passed = aesthetic >= params.min_aesthetic_score
                && niqe <= params.max_niqe
                && stats.noise_estimate <= params.max_noise
                && stats.magenta_ratio <= params.max_magenta_ratio
                && stats.entropy >= params.min_entropy
                && stats.clipping_ratio <= params.max_clipping_ratio;

            let mut metrics = BTreeMap::new();
            metrics.insert("aesthetic_score".to_string(), aesthetic);
            metrics.insert("niqe".to_string(), niqe);
            metrics.insert("noise".to_string(), stats.noise_estimate);
            metrics.insert("magenta_ratio".to_string(), stats.magenta_ratio);
            metrics.insert("entropy".to_string(), stats.entropy);
            metrics.insert("clipping_ratio".to_string(), stats.clipping_ratio);
            view_evidence.push(ViewEvidence {
                view_id: view.view.view_id.clone(),
                passed,
                metrics,
            });

            aesthetic_scores.push(aesthetic);
            niqe_values.push(niqe);
            noise_values.push(stats.noise_estimate);
            magenta_values.push(stats.magenta_ratio);
            entropy_values.push(stats.entropy);
            clipping_values.push(stats.clipping_ratio);
        }

        let mean_aesthetic = mean(&aesthetic_scores);
        let mean_niqe = mean(&niqe_values);
        let mean_noise = mean(&noise_values);
        let mean_magenta = mean(&magenta_values);
        let mean_entropy = mean(&entropy_values);
        let mean_clipping = mean(&clipping_values);

        let mut fail_codes = Vec::new();
        if mean_aesthetic < params.min_aesthetic_score {
            fail_codes.push(FailCode::new("REAL_LOW_AESTHETIC"));
        }
        if mean_niqe > params.max_niqe {
            fail_codes.push(FailCode::new("REAL_HIGH_NIQE"));
        }
        if mean_noise > params.max_noise {
            fail_codes.push(FailCode::new("REAL_NOISY_RENDER"));
        }
        if mean_magenta > params.max_magenta_ratio {
            fail_codes.push(FailCode::new("REAL_MISSING_TEXTURE"));
        }
        if mean_entropy < params.min_entropy {
            fail_codes.push(FailCode::new("REAL_LOW_ENTROPY"));
        }
        if mean_clipping > params.max_clipping_ratio {
            fail_codes.push(FailCode::new("REAL_CLIPPING"));
        }

        let mut metrics = BTreeMap::new();
        metrics.insert("mean_aesthetic_score".to_string(), mean_aesthetic);
        metrics.insert("mean_niqe".to_string(), mean_niqe);
        metrics.insert("mean_noise".to_string(), mean_noise);
        metrics.insert("mean_magenta_ratio".to_string(), mean_magenta);
        metrics.insert("mean_entropy".to_string(), mean_entropy);
        metrics.insert("mean_clipping_ratio".to_string(), mean_clipping);

        let score_components = [
            mean_aesthetic,
            (1.0 - mean_niqe / (params.max_niqe * 2.0).max(1e-6)).clamp(0.0, 1.0),
            (1.0 - mean_noise / (params.max_noise * 2.0).max(1e-6)).clamp(0.0, 1.0),
            (1.0 - mean_magenta / (params.max_magenta_ratio * 4.0).max(0.01)).clamp(0.0, 1.0),
            mean_entropy,
            (1.0 - mean_clipping / (params.max_clipping_ratio * 4.0).max(0.01)).clamp(0.0, 1.0),
        ];

        let pass = fail_codes.is_empty();
        CriticResult {
            critic_name: self.name(),
            score: score_from_unit_f64(mean(&score_components)),
            fail_codes,
            view_evidence,
            metrics,
            models_used: vec![closed_form_model_record("realism-quality-scorer", "niqe-aesthetic-v1")],
            pass,
        }
    }
}

/// A closed-form aesthetic-predictor stand-in: rewards entropy (visual
/// complexity) and penalizes clipped and magenta "missing texture" pixels.
fn aesthetic_score(stats: &ImageStats) -> f64 {
    (stats.entropy * 0.5 + (1.0 - stats.clipping_ratio) * 0.3 + (1.0 - stats.magenta_ratio) * 0.2).clamp(0.0, 1.0)
}

/// Arithmetic mean, `0.0` for an empty slice.
fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        #[allow(clippy::cast_precision_loss, reason = "sample counts are far below f64's exact-integer range")]
        let count = values.len() as f64;
        values.iter().sum::<f64>() / count
    }
}
