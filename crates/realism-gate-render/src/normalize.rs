// realism-gate-render/src/normalize.rs
// ============================================================================
// Module: Asset Normalization
// Description: Bake transforms, re-center on the vertical axis, ground
//              the lowest vertex, align forward, and compute the bounding
//              box diagonal.
// Purpose: Make camera distances expressed as a diagonal multiple mean the
//          same thing for every asset, regardless of scale or export
//          orientation.
// Dependencies: glam, realism_gate_core
// ============================================================================

//! Asset normalization (§4.2): the fixed sequence of transforms applied
//! before any camera is placed, so that camera distances expressed as a
//! multiple of the bounding-box diagonal mean the same thing for every
//! asset regardless of its real-world scale or export orientation.

use glam::DVec3;
use realism_gate_core::PortableMesh;

use crate::RenderError;

/// The rig's declared forward direction, in degrees of rotation about the
/// vertical axis an asset must be aligned to. A car rig expects the
/// asset's forward axis to already be +X after export; `0.0` is therefore
/// a no-op rotation that exists so a future rig with a different forward
/// convention has somewhere to plug in without touching the pipeline
/// order.
pub const FORWARD_AXIS_ALIGNMENT_DEG: f64 = 0.0;

/// The outcome of normalizing one mesh: the mesh itself (mutated in
/// place) plus the bounding-box diagonal every camera distance in the rig
/// is expressed as a multiple of.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedFrame {
    /// Length of the bounding box's space diagonal, in meters.
    pub bounding_box_diagonal_m: f64,
    /// Vertical center of the bounding box after grounding, used as the
    /// camera rig's look-at target.
    pub look_at_height_m: f64,
}

/// Runs the five-step asset normalization pipeline in order (§4.2):
/// bake transforms (assumed already baked by the exporter), re-center on
/// the vertical axis, ground at height zero, align the forward axis, and
/// compute the bounding-box diagonal.
///
/// # Errors
///
/// Returns [`RenderError::MeshInvalid`] when the mesh has no vertices, so
/// no centroid or bounding box can be computed.
pub fn normalize_mesh(mesh: &mut PortableMesh) -> Result<NormalizedFrame, RenderError> {
    let centroid = mesh.centroid().map_err(|err| RenderError::MeshInvalid(err.to_string()))?;
    mesh.translate(DVec3::new(-centroid.x, -centroid.y, 0.0));

    let (min, _max) = mesh.bounding_box().map_err(|err| RenderError::MeshInvalid(err.to_string()))?;
    mesh.translate(DVec3::new(0.0, 0.0, -min.z));

    if FORWARD_AXIS_ALIGNMENT_DEG != 0.0 {
        mesh.rotate_about_vertical_axis(FORWARD_AXIS_ALIGNMENT_DEG.to_radians());
    }

    let diagonal = mesh.bounding_box_diagonal().map_err(|err| RenderError::MeshInvalid(err.to_string()))?;
    let (_min, max) = mesh.bounding_box().map_err(|err| RenderError::MeshInvalid(err.to_string()))?;

    Ok(NormalizedFrame {
        bounding_box_diagonal_m: diagonal,
        look_at_height_m: max.z / 2.0,
    })
}

#[cfg(test)]
mod tests {
    use realism_gate_core::PortableMesh;

    use super::normalize_mesh;

    fn offset_cube(offset: [f64; 3]) -> PortableMesh {
        let corners = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 1.0],
            [1.0, 1.0, 1.0],
            [0.0, 1.0, 1.0],
        ];
        let vertices = corners
            .into_iter()
            .map(|[x, y, z]| [x + offset[0], y + offset[1], z + offset[2]])
            .collect();
        PortableMesh {
            schema_version: "1.0".into(),
            vertices,
            triangles: vec![[0, 1, 2]],
            has_uvs: true,
            texture_refs: Vec::new(),
            dangling_texture_refs: Vec::new(),
        }
    }

    #[test]
    fn centroid_lands_on_the_vertical_axis() {
        let mut mesh = offset_cube([5.0, -3.0, 2.0]);
        normalize_mesh(&mut mesh).expect("normalize");
        let centroid = mesh.centroid().expect("centroid");
        assert!(centroid.x.abs() < 1e-9);
        assert!(centroid.y.abs() < 1e-9);
    }

    #[test]
    fn lowest_vertex_sits_at_height_zero() {
        let mut mesh = offset_cube([5.0, -3.0, 2.0]);
        normalize_mesh(&mut mesh).expect("normalize");
        let (min, _max) = mesh.bounding_box().expect("bounds");
        assert!(min.z.abs() < 1e-9);
    }

    #[test]
    fn diagonal_is_scale_invariant_under_translation() {
        let mut mesh_a = offset_cube([0.0, 0.0, 0.0]);
        let mut mesh_b = offset_cube([100.0, 200.0, 300.0]);
        let frame_a = normalize_mesh(&mut mesh_a).expect("normalize a");
        let frame_b = normalize_mesh(&mut mesh_b).expect("normalize b");
        assert!((frame_a.bounding_box_diagonal_m - frame_b.bounding_box_diagonal_m).abs() < 1e-9);
    }

    #[test]
    fn empty_mesh_is_rejected() {
        let mut mesh = offset_cube([0.0, 0.0, 0.0]);
        mesh.vertices.clear();
        assert!(normalize_mesh(&mut mesh).is_err());
    }
}
