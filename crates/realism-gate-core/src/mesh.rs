// realism-gate-core/src/mesh.rs
// ============================================================================
// Module: Portable Mesh
// Description: The in-memory geometry record the Render Harness normalizes
//              and the Geometry critic analyzes, plus its derived
//              measurements (bounds, symmetry, manifoldness).
// Purpose: Give the gate one flat geometry representation independent of
//          any interchange-format parser.
// Dependencies: serde
// ============================================================================

//! The portable mesh form (§4.2, §4.3.4): the in-memory geometry the Render
//! Harness normalizes and the Geometry critic analyzes.
//!
//! The gate does not depend on any particular interchange format parser;
//! a `PortableMesh` is the gate's own flat, serializable geometry record,
//! decoded from whatever bytes an `AssetProof` references. This keeps
//! geometry manipulation testable without pulling in a mesh-format
//! dependency the rest of the gate has no other use for.

use std::collections::BTreeMap;

use glam::DVec3;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Schema version carried by every serialized `PortableMesh`.
pub const PORTABLE_MESH_SCHEMA_VERSION: &str = "1.0";

/// A triangle, as three indices into a `PortableMesh`'s `vertices`.
pub type Triangle = [u32; 3];

/// Flat, serializable geometry: vertices plus triangle indices, with the
/// material facts the Geometry critic needs (§4.3.4: "material sanity").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PortableMesh {
    /// Fixed schema version string, always `"1.0"`.
    pub schema_version: String,
    /// Vertex positions in meters, in the asset's original (un-normalized)
    /// coordinate frame.
    pub vertices: Vec<[f64; 3]>,
    /// Triangle indices into `vertices`.
    pub triangles: Vec<Triangle>,
    /// `true` iff every vertex carries a UV coordinate.
    pub has_uvs: bool,
    /// External texture paths referenced by the mesh's materials.
    pub texture_refs: Vec<String>,
    /// Texture paths referenced by a material but absent from the asset's
    /// file bundle at export time (§4.2: "missing texture references").
    pub dangling_texture_refs: Vec<String>,
}

/// Errors raised while decoding or manipulating a `PortableMesh`.
#[derive(Debug, Error)]
pub enum MeshError {
    /// The mesh bytes did not parse as a `PortableMesh` document.
    #[error("mesh is not a valid portable mesh document: {0}")]
    Invalid(String),
    /// The mesh has no triangles, so no geometric measurement is possible.
    #[error("mesh has no triangles")]
    Empty,
}

impl PortableMesh {
    /// Decodes a `PortableMesh` from its canonical JSON encoding.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::Invalid`] when `bytes` do not parse.
    pub fn decode(bytes: &[u8]) -> Result<Self, MeshError> {
        serde_json::from_slice(bytes).map_err(|err| MeshError::Invalid(err.to_string()))
    }

    /// Encodes this mesh as canonical JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::Invalid`] when serialization fails (never
    /// expected for a well-formed in-memory value).
    pub fn encode(&self) -> Result<Vec<u8>, MeshError> {
        serde_json::to_vec(self).map_err(|err| MeshError::Invalid(err.to_string()))
    }

    /// Returns each vertex as a [`glam::DVec3`] for geometric computation.
    fn vectors(&self) -> impl Iterator<Item = DVec3> + '_ {
        self.vertices.iter().map(|vertex| DVec3::from_array(*vertex))
    }

    /// Returns the arithmetic mean of all vertex positions.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::Empty`] when the mesh has no vertices.
    pub fn centroid(&self) -> Result<DVec3, MeshError> {
        if self.vertices.is_empty() {
            return Err(MeshError::Empty);
        }
        #[allow(
            clippy::cast_precision_loss,
            reason = "vertex counts are far below f64's 2^53 exact-integer range"
        )]
        let count = self.vertices.len() as f64;
        let sum = self.vectors().fold(DVec3::ZERO, |acc, vertex| acc + vertex);
        Ok(sum / count)
    }

    /// Returns `(min, max)` corners of the axis-aligned bounding box.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::Empty`] when the mesh has no vertices.
    pub fn bounding_box(&self) -> Result<(DVec3, DVec3), MeshError> {
        let mut vectors = self.vectors();
        let first = vectors.next().ok_or(MeshError::Empty)?;
        let (min, max) = vectors.fold((first, first), |(min, max), vertex| {
            (min.min(vertex), max.max(vertex))
        });
        Ok((min, max))
    }

    /// Returns the bounding box's three axis extents `(length, width,
    /// height)` in meters, where length/width/height map to x/y/z.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::Empty`] when the mesh has no vertices.
    pub fn bounding_box_extents(&self) -> Result<[f64; 3], MeshError> {
        let (min, max) = self.bounding_box()?;
        let extent = max - min;
        Ok([extent.x, extent.y, extent.z])
    }

    /// Returns the length of the bounding box's space diagonal, the unit
    /// every camera distance in the rig is expressed as a multiple of
    /// (§4.2).
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::Empty`] when the mesh has no vertices.
    pub fn bounding_box_diagonal(&self) -> Result<f64, MeshError> {
        let (min, max) = self.bounding_box()?;
        Ok((max - min).length())
    }

    /// Translates every vertex by `delta`.
    pub fn translate(&mut self, delta: DVec3) {
        for vertex in &mut self.vertices {
            let translated = DVec3::from_array(*vertex) + delta;
            *vertex = translated.to_array();
        }
    }

    /// Rotates every vertex about the vertical (Z) axis by `radians`,
    /// aligning the asset's forward axis to the rig's declared forward
    /// direction (§4.2 step 4).
    pub fn rotate_about_vertical_axis(&mut self, radians: f64) {
        let rotation = glam::DMat3::from_rotation_z(radians);
        for vertex in &mut self.vertices {
            let rotated = rotation * DVec3::from_array(*vertex);
            *vertex = rotated.to_array();
        }
    }

    /// Returns the triangle count.
    #[must_use]
    pub fn triangle_count(&self) -> u64 {
        u64::try_from(self.triangles.len()).unwrap_or(u64::MAX)
    }

    /// Partitions vertex indices into connected components by triangle-edge
    /// adjacency. A vertex touched by no triangle forms its own singleton
    /// component.
    #[must_use]
    pub fn connected_components(&self) -> Vec<Vec<u32>> {
        let mut parent: Vec<u32> = (0..u32::try_from(self.vertices.len()).unwrap_or(u32::MAX)).collect();

        fn find(parent: &mut [u32], node: u32) -> u32 {
            let mut root = node;
            while parent[root as usize] != root {
                root = parent[root as usize];
            }
            let mut current = node;
            while parent[current as usize] != current {
                let next = parent[current as usize];
                parent[current as usize] = root;
                current = next;
            }
            root
        }

        fn union(parent: &mut [u32], a: u32, b: u32) {
            let root_a = find(parent, a);
            let root_b = find(parent, b);
            if root_a != root_b {
                parent[root_a as usize] = root_b;
            }
        }

        for triangle in &self.triangles {
            union(&mut parent, triangle[0], triangle[1]);
            union(&mut parent, triangle[1], triangle[2]);
        }

        let mut components: BTreeMap<u32, Vec<u32>> = BTreeMap::new();
        for index in 0..parent.len() {
            #[allow(clippy::cast_possible_truncation, reason = "index stays below the vertex count, already a valid u32")]
            let index = index as u32;
            let root = find(&mut parent, index);
            components.entry(root).or_default().push(index);
        }
        components.into_values().collect()
    }

    /// Returns `(min, max)` corners of the bounding box spanning only the
    /// vertices named by `indices`.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::Empty`] when `indices` is empty.
    pub fn component_bounding_box(&self, indices: &[u32]) -> Result<(DVec3, DVec3), MeshError> {
        let mut vectors = indices.iter().filter_map(|&index| self.vertices.get(index as usize)).map(|vertex| DVec3::from_array(*vertex));
        let first = vectors.next().ok_or(MeshError::Empty)?;
        let (min, max) = vectors.fold((first, first), |(min, max), vertex| (min.min(vertex), max.max(vertex)));
        Ok((min, max))
    }

    /// Bilateral (left/right) symmetry score in `[0, 1]`: mirrors every
    /// vertex across the plane `y = centroid.y` and measures the mean
    /// nearest-neighbor distance from each mirrored vertex back to the
    /// original vertex set, normalized by the bounding-box diagonal. `1.0`
    /// is perfectly symmetric; the search is O(vertex count squared), fine
    /// for the export sizes this gate evaluates.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::Empty`] when the mesh has no vertices.
    pub fn bilateral_symmetry_score(&self) -> Result<f64, MeshError> {
        let centroid = self.centroid()?;
        let diagonal = self.bounding_box_diagonal()?.max(1e-9);
        let originals: Vec<DVec3> = self.vectors().collect();
        let mirrored = originals.iter().map(|vertex| DVec3::new(vertex.x, 2.0 * centroid.y - vertex.y, vertex.z));

        let mut total_distance = 0.0;
        let mut count = 0u64;
        for mirror in mirrored {
            let nearest = originals.iter().map(|original| (*original - mirror).length()).fold(f64::MAX, f64::min);
            total_distance += nearest;
            count += 1;
        }
        if count == 0 {
            return Err(MeshError::Empty);
        }
        #[allow(clippy::cast_precision_loss, reason = "vertex counts are far below f64's exact-integer range")]
        let mean_distance = total_distance / count as f64;
        Ok((1.0 - mean_distance / diagonal).clamp(0.0, 1.0))
    }

    /// Fraction of edges shared by more than two triangles, the geometry
    /// critic's non-manifold-edge signal. `0.0` for a mesh with no edges.
    #[must_use]
    pub fn non_manifold_edge_fraction(&self) -> f64 {
        let mut counts: BTreeMap<(u32, u32), u32> = BTreeMap::new();
        for triangle in &self.triangles {
            for &(a, b) in &[(triangle[0], triangle[1]), (triangle[1], triangle[2]), (triangle[2], triangle[0])] {
                let edge = if a < b { (a, b) } else { (b, a) };
                *counts.entry(edge).or_insert(0) += 1;
            }
        }
        if counts.is_empty() {
            return 0.0;
        }
        let non_manifold = counts.values().filter(|&&count| count > 2).count();
        #[allow(clippy::cast_precision_loss, reason = "edge counts are far below f64's exact-integer range")]
        let fraction = non_manifold as f64 / counts.len() as f64;
        fraction
    }

    /// Fraction of triangles whose face normal points away from the mesh
    /// centroid (the expected orientation for a closed, outward-facing
    /// surface), the geometry critic's normals-consistency signal.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::Empty`] when the mesh has no vertices or no
    /// triangles.
    pub fn outward_normal_consistency(&self) -> Result<f64, MeshError> {
        if self.triangles.is_empty() {
            return Err(MeshError::Empty);
        }
        let centroid = self.centroid()?;
        let mut consistent = 0u64;
        for triangle in &self.triangles {
            let Some(a) = self.vertices.get(triangle[0] as usize).map(|v| DVec3::from_array(*v)) else {
                continue;
            };
            let Some(b) = self.vertices.get(triangle[1] as usize).map(|v| DVec3::from_array(*v)) else {
                continue;
            };
            let Some(c) = self.vertices.get(triangle[2] as usize).map(|v| DVec3::from_array(*v)) else {
                continue;
            };
            let normal = (b - a).cross(c - a);
            let face_centroid = (a + b + c) / 3.0;
            if normal.dot(face_centroid - centroid) >= 0.0 {
                consistent += 1;
            }
        }
        #[allow(clippy::cast_precision_loss, reason = "triangle counts are far below f64's exact-integer range")]
        let fraction = consistent as f64 / self.triangles.len() as f64;
        Ok(fraction)
    }
}
