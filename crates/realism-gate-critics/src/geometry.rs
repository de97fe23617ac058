// realism-gate-critics/src/geometry.rs
// ============================================================================
// Module: Geometry Critic
// Description: Plausible scale, triangle budget, bilateral symmetry,
//              wheel-candidate component counting, manifoldness, and
//              material sanity, all computed from the portable mesh.
// Purpose: Catch category-looking textures on nonsense geometry.
// Dependencies: realism_gate_core
// ============================================================================

//! The Geometry critic (§4.3.4): plausible scale, triangle budget,
//! bilateral symmetry, wheel-candidate component counting, manifoldness,
//! and material sanity, all computed directly from the asset's
//! [`realism_gate_core::PortableMesh`] rather than from any rendered view.

use std::collections::BTreeMap;

use realism_gate_core::CriticResult;
use realism_gate_core::FailCode;
use realism_gate_core::PortableMesh;

use crate::closed_form_model_record;
use crate::support::score_from_unit_f64;
use crate::Critic;
use crate::CriticInput;

/// A component is a wheel candidate if its vertical extent is at most this
/// fraction of the mesh's overall height.
const WHEEL_HEIGHT_FRACTION: f64 = 0.5;
/// A component is a wheel candidate only if it sits within this fraction of
/// the mesh's overall height from the ground plane.
const WHEEL_GROUND_BAND_FRACTION: f64 = 0.4;
/// A component's footprint must not be more elongated than this
/// width/depth ratio to be considered wheel-like.
const WHEEL_FOOTPRINT_ASPECT_CEILING: f64 = 2.5;
/// A component needs at least this many vertices to be a candidate rather
/// than render noise.
const WHEEL_MIN_VERTICES: usize = 3;

/// Geometry analysis over the asset's portable mesh; consults no rendered
/// pixels.
#[derive(Debug, Default)]
pub struct GeometryCritic;

impl Critic for GeometryCritic {
    fn name(&self) -> realism_gate_core::CriticName {
        realism_gate_core::CriticName::new("geometry")
    }

    fn evaluate(&self, input: &CriticInput<'_>) -> CriticResult {
        let params = &input.config.critics.geometry;
        let mesh = input.mesh;
        let mut fail_codes = Vec::new();

        let extents = mesh.bounding_box_extents().unwrap_or_default();
        let [length, width, height] = extents;
        let scale_ok = in_bounds(length, params.length_bounds_m)
            && in_bounds(width, params.width_bounds_m)
            && in_bounds(height, params.height_bounds_m);
        if !scale_ok {
            fail_codes.push(FailCode::new("GEO_SCALE_IMPLAUSIBLE"));
        }

        let triangle_count = mesh.triangle_count();
        let [min_triangles, max_triangles] = params.triangle_count_bounds;
        if triangle_count < params.triangle_count_trivial_floor {
            fail_codes.push(FailCode::new("GEO_TRI_COUNT_TRIVIAL"));
        } else if triangle_count < min_triangles {
            fail_codes.push(FailCode::new("GEO_TRI_COUNT_LOW"));
        } else if triangle_count > max_triangles {
            fail_codes.push(FailCode::new("GEO_TRI_COUNT_HIGH"));
        }

        let symmetry = mesh.bilateral_symmetry_score().unwrap_or(0.0);
        if symmetry < params.min_symmetry {
            fail_codes.push(FailCode::new("GEO_ASYMMETRIC"));
        }

        let wheel_candidates = count_wheel_candidates(mesh);
        if wheel_candidates < params.min_wheel_candidates {
            fail_codes.push(FailCode::new("GEO_WHEEL_COUNT_LOW"));
        }

        let non_manifold_fraction = mesh.non_manifold_edge_fraction();
        if non_manifold_fraction > params.max_non_manifold_fraction {
            fail_codes.push(FailCode::new("GEO_NON_MANIFOLD"));
        }

        let normals_consistency = mesh.outward_normal_consistency().unwrap_or(1.0);
        if normals_consistency < 0.5 {
            fail_codes.push(FailCode::new("GEO_NORMALS_INCONSISTENT"));
        }

        if !mesh.has_uvs {
            fail_codes.push(FailCode::new("MAT_NO_UVS"));
        }
        if !mesh.dangling_texture_refs.is_empty() {
            fail_codes.push(FailCode::new("MAT_MISSING_TEXTURES"));
        }

        let mut metrics = BTreeMap::new();
        metrics.insert("length_m".to_string(), length);
        metrics.insert("width_m".to_string(), width);
        metrics.insert("height_m".to_string(), height);
        #[allow(clippy::cast_precision_loss, reason = "triangle counts stay far below f64's exact-integer range")]
        let triangle_count_f64 = triangle_count as f64;
        metrics.insert("triangle_count".to_string(), triangle_count_f64);
        metrics.insert("symmetry_score".to_string(), symmetry);
        metrics.insert("wheel_candidate_count".to_string(), f64::from(wheel_candidates));
        metrics.insert("non_manifold_fraction".to_string(), non_manifold_fraction);
        metrics.insert("normals_consistency".to_string(), normals_consistency);

        let triangle_count_component = if triangle_count < params.triangle_count_trivial_floor
            || triangle_count < min_triangles
            || triangle_count > max_triangles
        {
            0.0
        } else {
            1.0
        };
        #[allow(clippy::cast_precision_loss, reason = "candidate counts are tiny and far below f64's exact-integer range")]
        let wheel_component = (f64::from(wheel_candidates) / f64::from(params.min_wheel_candidates.max(1))).min(1.0);
        let material_component = if mesh.has_uvs && mesh.dangling_texture_refs.is_empty() { 1.0 } else { 0.0 };
        let score_components = [
            f64::from(u8::from(scale_ok)),
            triangle_count_component,
            symmetry,
            wheel_component,
            (1.0 - non_manifold_fraction).clamp(0.0, 1.0),
            material_component,
        ];

        let pass = fail_codes.is_empty();
        CriticResult {
            critic_name: self.name(),
            score: score_from_unit_f64(mean(&score_components)),
            fail_codes,
            view_evidence: Vec::new(),
            metrics,
            models_used: vec![closed_form_model_record("geometry-analyzer", &format!("{params:?}"))],
            pass,
        }
    }
}

/// Returns `true` iff `value` falls within `[bounds[0], bounds[1]]`.
fn in_bounds(value: f64, bounds: [f64; 2]) -> bool {
    value >= bounds[0] && value <= bounds[1]
}

/// Counts connected components shaped and positioned like a wheel: small
/// relative to the mesh's overall height, seated near the ground plane, and
/// roughly as wide as they are deep.
fn count_wheel_candidates(mesh: &PortableMesh) -> u32 {
    let Ok((full_min, full_max)) = mesh.bounding_box() else {
        return 0;
    };
    let full_height = (full_max.z - full_min.z).max(1e-9);

    let mut count = 0u32;
    for component in mesh.connected_components() {
        if component.len() < WHEEL_MIN_VERTICES {
            continue;
        }
        let Ok((comp_min, comp_max)) = mesh.component_bounding_box(&component) else {
            continue;
        };
        let comp_extent = comp_max - comp_min;
        if comp_extent.z > full_height * WHEEL_HEIGHT_FRACTION {
            continue;
        }
        if comp_min.z - full_min.z > full_height * WHEEL_GROUND_BAND_FRACTION {
            continue;
        }
        let footprint_long = comp_extent.x.max(comp_extent.y).max(1e-9);
        let footprint_short = comp_extent.x.min(comp_extent.y).max(1e-9);
        if footprint_long / footprint_short > WHEEL_FOOTPRINT_ASPECT_CEILING {
            continue;
        }
        count += 1;
    }
    count
}

/// Arithmetic mean, `0.0` for an empty slice.
fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        #[allow(clippy::cast_precision_loss, reason = "component counts are far below f64's exact-integer range")]
        let count = values.len() as f64;
        values.iter().sum::<f64>() / count
    }
}
