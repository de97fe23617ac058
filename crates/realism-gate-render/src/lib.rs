// realism-gate-render/src/lib.rs
// ============================================================================
// Module: Render Harness Root
// Description: Re-exports the `Renderer` trait, asset normalization, the
//              camera rig, and the reference renderer.
// Purpose: Produce the canonical render set for one asset under one
//          GateConfig.
// Dependencies: realism_gate_core, glam, image, rand, crate::{error,
//               normalize, reference, rig}
// ============================================================================

//! The Render Harness (§4.2): asset normalization, the fixed camera rig,
//! and a deterministic CPU-only reference renderer producing beauty, clay,
//! and optional auxiliary passes.
//!
//! Every other component depends on [`Renderer`] rather than on
//! [`reference::ReferenceRenderer`] directly, mirroring the rest of this
//! codebase's trait-per-concern seams.

pub mod error;
pub mod normalize;
pub mod reference;
pub mod rig;

use realism_gate_core::ArtifactStore;
use realism_gate_core::GateConfig;
use realism_gate_core::PortableMesh;
use realism_gate_core::View;

pub use error::RenderError;
pub use normalize::normalize_mesh;
pub use normalize::NormalizedFrame;
pub use reference::ReferenceRenderer;
pub use rig::CameraRig;

/// Stable failure code for a renderer that cannot honor a category's
/// unconditionally required auxiliary pass (SPEC_FULL §9 resolution 2).
pub const FAIL_CODE_RENDER_MISSING_REQUIRED_PASS: &str = "RENDER_MISSING_REQUIRED_PASS";

/// Every view a render job produced, plus the normalization frame the
/// camera rig was placed relative to.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSet {
    /// One entry per `(view, pass)` combination written to the store.
    pub views: Vec<View>,
    /// The normalization frame computed for the asset before any camera
    /// was placed.
    pub normalized_frame: NormalizedFrame,
}

/// A render backend: takes ownership of an asset's mesh and produces every
/// view the rig calls for, writing image bytes into `store` as it goes.
pub trait Renderer {
    /// Normalizes `mesh`, places the configured camera rig, and renders
    /// beauty, clay, and any configured auxiliary passes for every view.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::MeshInvalid`] if the mesh has no measurable
    /// geometry, [`RenderError::RenderCrash`] if rasterizing a view fails,
    /// or [`RenderError::Store`] if the artifact store rejects a write.
    fn render(
        &self,
        store: &dyn ArtifactStore,
        mesh: PortableMesh,
        config: &GateConfig,
    ) -> Result<RenderSet, RenderError>;
}
