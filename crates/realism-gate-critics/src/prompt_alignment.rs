// realism-gate-critics/src/prompt_alignment.rs
// ============================================================================
// Module: Prompt-Alignment Critic
// Description: Per-view prompt-vs-attribute-probe affinity margin.
// Purpose: Verify the asset matches its generation prompt, not merely its
//          declared category.
// Dependencies: realism_gate_core, crate::{pixel_stats, support}
// ============================================================================

//! The Prompt-Alignment critic (§4.3.2): does the rendered asset match the
//! specific attributes named in its generation prompt, not merely its
//! broad category?

use std::collections::BTreeMap;

use realism_gate_core::CriticResult;
use realism_gate_core::FailCode;
use realism_gate_core::ViewEvidence;

use crate::closed_form_model_record;
use crate::pixel_stats;
use crate::support::score_from_unit_f64;
use crate::support::text_image_affinity;
use crate::Critic;
use crate::CriticInput;

/// Minimum affinity below which a view is considered unrelated to its
/// prompt regardless of the configured margin.
const LOW_SIMILARITY_FLOOR: f64 = 0.3;

/// Closed-form stand-in for a text/image alignment model: compares the
/// asset's full prompt against each configured attribute probe using the
/// same affinity function the Category critic uses against its decoys.
#[derive(Debug, Default)]
pub struct PromptAlignmentCritic;

impl Critic for PromptAlignmentCritic {
    fn name(&self) -> realism_gate_core::CriticName {
        realism_gate_core::CriticName::new("prompt_alignment")
    }

    fn evaluate(&self, input: &CriticInput<'_>) -> CriticResult {
        let params = &input.config.critics.prompt_alignment;
        let prompt = input.asset.prompt.as_str();

        let mut view_evidence = Vec::new();
        let mut prompt_affinities = Vec::new();
        let mut margins = Vec::new();
        let mut attribute_mismatches = 0u32;

        for view in input.views {
            let stats = pixel_stats::compute(&view.pixels);
            let prompt_affinity = text_image_affinity(prompt, &stats);
            let probe_affinities: Vec<f64> = params.attribute_probes.iter().map(|probe| text_image_affinity(probe, &stats)).collect();
            let best_probe = probe_affinities.iter().copied().fold(0.0_f64, f64::max);
            let margin = prompt_affinity - best_probe;
            let passed = prompt_affinity >= LOW_SIMILARITY_FLOOR && margin >= params.min_margin;

            if probe_affinities.iter().any(|&probe_affinity| probe_affinity > prompt_affinity) {
                attribute_mismatches += 1;
            }

            let mut metrics = BTreeMap::new();
            metrics.insert("prompt_affinity".to_string(), prompt_affinity);
            metrics.insert("margin".to_string(), margin);
            view_evidence.push(ViewEvidence {
                view_id: view.view.view_id.clone(),
                passed,
                metrics,
            });

            prompt_affinities.push(prompt_affinity);
            margins.push(margin);
        }

        let mut fail_codes = Vec::new();
        let mean_affinity = mean(&prompt_affinities);
        if mean_affinity < LOW_SIMILARITY_FLOOR {
            fail_codes.push(FailCode::new("ALIGN_LOW_SIMILARITY"));
        }
        let passing_views = view_evidence.iter().filter(|evidence| evidence.passed).count();

        let min_margin = margins.iter().copied().fold(f64::MAX, f64::min);
        if min_margin.is_finite() && min_margin < params.min_margin {
            fail_codes.push(FailCode::new("ALIGN_MARGIN_LOW"));
        }

        if attribute_mismatches > 0 {
            fail_codes.push(FailCode::new("ALIGN_ATTRIBUTE_MISMATCH"));
        }

        let mut metrics = BTreeMap::new();
        metrics.insert("mean_prompt_affinity".to_string(), mean_affinity);
        metrics.insert("min_margin".to_string(), if min_margin.is_finite() { min_margin } else { 0.0 });
        #[allow(clippy::cast_precision_loss, reason = "view counts are far below f64's exact-integer range")]
        let mismatch_fraction =
            f64::from(attribute_mismatches) / (prompt_affinities.len() as f64).max(1.0);
        metrics.insert("attribute_mismatch_fraction".to_string(), mismatch_fraction);

        let pass = fail_codes.is_empty();
        let score = if view_evidence.is_empty() {
            0.0
        } else {
            #[allow(clippy::cast_precision_loss, reason = "view counts are far below f64's exact-integer range")]
            let fraction = passing_views as f64 / view_evidence.len() as f64;
            fraction
        };
        CriticResult {
            critic_name: self.name(),
            score: score_from_unit_f64(score),
            fail_codes,
            view_evidence,
            metrics,
            models_used: vec![closed_form_model_record("prompt-alignment-scorer", prompt)],
            pass,
        }
    }
}

/// Arithmetic mean, `0.0` for an empty slice.
fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        #[allow(clippy::cast_precision_loss, reason = "view counts are far below f64's exact-integer range")]
        let count = values.len() as f64;
        values.iter().sum::<f64>() / count
    }
}

#[cfg(test)]
mod tests {
    use image::Rgb;
    use image::RgbImage;
    use realism_gate_core::fixtures::sample_asset;
    use realism_gate_core::fixtures::sample_gate_config;
    use realism_gate_core::CameraMetadata;
    use realism_gate_core::FailCode;
    use realism_gate_core::PortableMesh;
    use realism_gate_core::RenderMode;
    use realism_gate_core::RunId;
    use realism_gate_core::View;
    use realism_gate_core::ViewId;

    use super::PromptAlignmentCritic;
    use crate::Critic;
    use crate::CriticInput;
    use crate::RenderedView;

    fn solid_view(view_id: &str) -> RenderedView {
        let mut pixels = RgbImage::new(24, 24);
        for y in 0..24 {
            for x in 0..24 {
                let inside = (3..21).contains(&x) && (3..21).contains(&y);
                pixels.put_pixel(x, y, Rgb(if inside { [140, 140, 150] } else { [250, 250, 250] }));
            }
        }
        RenderedView {
            view: View {
                view_id: ViewId::new(view_id),
                mode: RenderMode::Beauty,
                image_path: format!("render/beauty/beauty_{view_id}.png"),
                camera: CameraMetadata {
                    azimuth_deg: 0.0,
                    elevation_deg: 0.0,
                    focal_length_mm: 50.0,
                    distance_diagonals: 2.0,
                    frame_index: None,
                },
            },
            pixels,
        }
    }

    fn run_critic(asset_prompt: &str, views: &[RenderedView]) -> realism_gate_core::CriticResult {
        let config = sample_gate_config();
        let mut asset = sample_asset();
        asset.prompt = asset_prompt.to_string();
        let mesh = PortableMesh {
            schema_version: "1.0".into(),
            vertices: Vec::new(),
            triangles: Vec::new(),
            has_uvs: true,
            texture_refs: Vec::new(),
            dangling_texture_refs: Vec::new(),
        };
        let config_id = config.config_id.clone();
        let input = CriticInput {
            run_id: &RunId::new("run-1"),
            config_id: &config_id,
            asset: &asset,
            mesh: &mesh,
            views,
            config: &config,
            determinism_seed: 7,
        };
        PromptAlignmentCritic.evaluate(&input)
    }

    #[test]
    fn an_empty_render_set_fails_on_low_similarity() {
        let result = run_critic("a silver modern sedan", &[]);
        assert!(result.has_fail_code(&FailCode::new("ALIGN_LOW_SIMILARITY")));
        assert!(!result.pass);
    }

    #[test]
    fn result_is_named_after_the_critic() {
        let views = vec![solid_view("front_three_quarter"), solid_view("left_profile")];
        let result = run_critic("a silver modern sedan", &views);
        assert_eq!(result.critic_name.as_str(), "prompt_alignment");
    }

    #[test]
    fn view_evidence_carries_one_entry_per_view() {
        let views = vec![solid_view("front_three_quarter"), solid_view("left_profile")];
        let result = run_critic("a silver modern sedan", &views);
        assert_eq!(result.view_evidence.len(), views.len());
    }

    #[test]
    fn score_is_the_fraction_of_passing_views() {
        let mut magenta_fill = RgbImage::new(24, 24);
        for pixel in magenta_fill.pixels_mut() {
            *pixel = Rgb([230, 20, 220]);
        }
        let magenta_view = RenderedView {
            view: View {
                view_id: ViewId::new("left_profile"),
                mode: RenderMode::Beauty,
                image_path: "render/beauty/beauty_left_profile.png".to_string(),
                camera: CameraMetadata {
                    azimuth_deg: 0.0,
                    elevation_deg: 0.0,
                    focal_length_mm: 50.0,
                    distance_diagonals: 2.0,
                    frame_index: None,
                },
            },
            pixels: magenta_fill,
        };
        let views = vec![solid_view("front_three_quarter"), magenta_view];
        let result = run_critic("a silver modern sedan", &views);
        assert_eq!(result.score, "0.5".parse::<bigdecimal::BigDecimal>().expect("parse"));
    }
}
