// realism-gate-critics/src/category.rs
// ============================================================================
// Module: Category Critic
// Description: Per-view detector confidence plus text/image margin,
//              cross-checked between beauty and clay passes.
// Purpose: Answer "is this the declared category at all?" in a way that
//          resists texture cheating.
// Dependencies: realism_gate_core, crate::{pixel_stats, support}
// ============================================================================

//! The Category critic (§4.3.1): does the rendered asset actually depict
//! its declared category, and does that detection hold up across views and
//! between the beauty and clay passes?

use std::collections::BTreeMap;

use realism_gate_core::CriticResult;
use realism_gate_core::FailCode;
use realism_gate_core::RenderMode;
use realism_gate_core::ViewEvidence;

use crate::closed_form_model_record;
use crate::pixel_stats;
use crate::support::score_from_unit_f64;
use crate::support::text_image_affinity;
use crate::Critic;
use crate::CriticInput;

/// Closed-form stand-in for a category detector plus a CLIP-style
/// text/image margin check, evaluated per view and aggregated across the
/// rig.
#[derive(Debug, Default)]
pub struct CategoryCritic;

impl Critic for CategoryCritic {
    fn name(&self) -> realism_gate_core::CriticName {
        realism_gate_core::CriticName::new("category")
    }

    fn evaluate(&self, input: &CriticInput<'_>) -> CriticResult {
        let params = &input.config.critics.category;
        let category = input.asset.category.as_str();

        let mut view_evidence = Vec::new();
        let mut confidences = Vec::new();
        let mut margins = Vec::new();
        let mut confidence_by_base_id: BTreeMap<String, (Option<f64>, Option<f64>)> = BTreeMap::new();

        for view in input.views {
            let stats = pixel_stats::compute(&view.pixels);
            let confidence = (stats.foreground_area_ratio * 2.0).clamp(0.0, 1.0);
            let category_affinity = text_image_affinity(category, &stats);
            let best_decoy = params
                .decoy_prompts
                .iter()
                .map(|decoy| text_image_affinity(decoy, &stats))
                .fold(0.0_f64, f64::max);
            let margin = category_affinity - best_decoy;
            let passed = confidence >= params.min_detector_confidence && margin >= params.min_clip_margin;

            let mut metrics = BTreeMap::new();
            metrics.insert("detector_confidence".to_string(), confidence);
            metrics.insert("clip_margin".to_string(), margin);
            view_evidence.push(ViewEvidence {
                view_id: view.view.view_id.clone(),
                passed,
                metrics,
            });

            confidences.push(confidence);
            margins.push(margin);

            let entry = confidence_by_base_id.entry(view.view.view_id.as_str().to_string()).or_insert((None, None));
            match view.view.mode {
                RenderMode::Beauty => entry.0 = Some(confidence),
                RenderMode::Clay => entry.1 = Some(confidence),
            }
        }

        let mut fail_codes = Vec::new();
        let max_confidence = confidences.iter().copied().fold(0.0_f64, f64::max);
        let passing_views = view_evidence.iter().filter(|evidence| evidence.passed).count();

        if max_confidence < params.min_detector_confidence * 0.5 {
            fail_codes.push(FailCode::new("CAT_NO_CAR_DETECTED"));
        } else if passing_views < params.min_views as usize {
            fail_codes.push(FailCode::new("CAT_LOW_CONFIDENCE"));
        }

        let min_margin = margins.iter().copied().fold(f64::MAX, f64::min);
        if min_margin.is_finite() && min_margin < params.min_clip_margin {
            fail_codes.push(FailCode::new("CAT_CLIP_MARGIN_LOW"));
        }

        let clay_disagreement = confidence_by_base_id.values().any(|&(beauty, clay)| match (beauty, clay) {
            (Some(b), Some(c)) => (b - c).abs() > 0.25,
            _ => false,
        });
        if clay_disagreement {
            fail_codes.push(FailCode::new("CAT_CLAY_DISAGREEMENT"));
        }

        let confidence_variance = variance(&confidences);
        if confidence_variance > 0.06 {
            fail_codes.push(FailCode::new("CAT_UNSTABLE_DETECTION"));
        }

        let mut metrics = BTreeMap::new();
        metrics.insert("mean_detector_confidence".to_string(), mean(&confidences));
        metrics.insert("min_clip_margin".to_string(), if min_margin.is_finite() { min_margin } else { 0.0 });
        metrics.insert("confidence_variance".to_string(), confidence_variance);

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
            models_used: vec![closed_form_model_record("category-detector", category)],
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

/// Population variance, `0.0` for an empty slice.
fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let average = mean(values);
    mean(&values.iter().map(|value| (value - average).powi(2)).collect::<Vec<_>>())
}

#[cfg(test)]
mod tests {
    use image::Rgb;
    use image::RgbImage;
    use realism_gate_core::fixtures::sample_asset;
    use realism_gate_core::fixtures::sample_gate_config;
    use realism_gate_core::CameraMetadata;
    use realism_gate_core::FailCode;
    use realism_gate_core::RenderMode;
    use realism_gate_core::RunId;
    use realism_gate_core::View;
    use realism_gate_core::ViewId;

    use super::CategoryCritic;
    use crate::Critic;
    use crate::CriticInput;
    use crate::RenderedView;

    fn solid_view(view_id: &str, mode: RenderMode, color: [u8; 3]) -> RenderedView {
        let mut pixels = RgbImage::new(32, 32);
        for y in 0..32 {
            for x in 0..32 {
                let inside = (4..28).contains(&x) && (4..28).contains(&y);
                pixels.put_pixel(x, y, Rgb(if inside { color } else { [250, 250, 250] }));
            }
        }
        RenderedView {
            view: View {
                view_id: ViewId::new(view_id),
                mode,
                image_path: format!("render/{}/{}_{view_id}.png", mode.path_segment(), mode.path_segment()),
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

    fn run_critic(views: &[RenderedView]) -> realism_gate_core::CriticResult {
        let config = sample_gate_config();
        let asset = sample_asset();
        let mesh = realism_gate_core::PortableMesh {
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
        CategoryCritic.evaluate(&input)
    }

    #[test]
    fn an_empty_render_set_fails_with_no_car_detected() {
        let result = run_critic(&[]);
        assert!(result.has_fail_code(&FailCode::new("CAT_NO_CAR_DETECTED")));
        assert!(!result.pass);
    }

    #[test]
    fn matching_beauty_and_clay_views_produce_no_clay_disagreement() {
        let views = vec![
            solid_view("front_three_quarter", RenderMode::Beauty, [120, 40, 40]),
            solid_view("front_three_quarter", RenderMode::Clay, [120, 40, 40]),
            solid_view("left_profile", RenderMode::Beauty, [120, 40, 40]),
            solid_view("left_profile", RenderMode::Clay, [120, 40, 40]),
        ];
        let result = run_critic(&views);
        assert!(!result.has_fail_code(&FailCode::new("CAT_CLAY_DISAGREEMENT")));
    }

    #[test]
    fn wildly_differing_clay_and_beauty_silhouettes_disagree() {
        let mut beauty = solid_view("front_three_quarter", RenderMode::Beauty, [120, 40, 40]);
        for pixel in beauty.pixels.pixels_mut() {
            *pixel = Rgb([250, 250, 250]);
        }
        let clay = solid_view("front_three_quarter", RenderMode::Clay, [182, 182, 182]);
        let result = run_critic(&[beauty, clay]);
        assert!(result.has_fail_code(&FailCode::new("CAT_CLAY_DISAGREEMENT")));
    }

    #[test]
    fn score_is_the_fraction_of_passing_views() {
        let views = vec![
            solid_view("front_three_quarter", RenderMode::Beauty, [120, 40, 40]),
            solid_view("left_profile", RenderMode::Beauty, [250, 250, 250]),
        ];
        let result = run_critic(&views);
        assert_eq!(result.critic_name.as_str(), "category");
        assert_eq!(result.score, "0.5".parse::<bigdecimal::BigDecimal>().expect("parse"));
    }
}
