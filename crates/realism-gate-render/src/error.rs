// realism-gate-render/src/error.rs
// ============================================================================
// Module: Render Errors
// Description: Asset-file problems, renderer crashes/timeouts, and store
//              failures that pass through unchanged.
// Purpose: Map every render-time failure onto the hard-fail codes the Gate
//          Decision expects.
// Dependencies: realism_gate_core, thiserror
// ============================================================================

//! The Render Harness's failure taxonomy (§4.2): asset-file problems,
//! renderer crashes, and store failures that pass through unchanged.

use realism_gate_core::ArtifactStoreError;
use realism_gate_core::MeshError;
use thiserror::Error;

/// Errors raised by a [`crate::Renderer`] implementation.
#[derive(Debug, Error)]
pub enum RenderError {
    /// No bytes were found at the asset's declared export path.
    #[error("asset export file not found: {0}")]
    FileNotFound(String),
    /// The asset bytes did not decode as a portable mesh.
    #[error("asset mesh is not importable: {0}")]
    ImportMeshInvalid(#[source] MeshError),
    /// Normalization or rig setup could not proceed because the mesh has
    /// no measurable extent (e.g. zero vertices).
    #[error("asset mesh has no measurable geometry: {0}")]
    MeshInvalid(String),
    /// The reference renderer encountered an unrecoverable internal
    /// failure while rasterizing a view.
    #[error("renderer crashed while rendering view {view_id}: {reason}")]
    RenderCrash {
        /// The view being rendered when the crash occurred.
        view_id: String,
        /// Description of the failure.
        reason: String,
    },
    /// A render stage exceeded its configured time budget. The reference
    /// renderer never raises this itself (it has no wall-clock
    /// dependency); callers wrapping it in a timeout surface it here.
    #[error("render stage exceeded its time budget")]
    RenderTimeout,
    /// The artifact store reported a failure while writing or reading a
    /// rendered image. This is a fatal, non-gate-code error (§7: artifact
    /// store failures abort the run without producing a Verdict).
    #[error(transparent)]
    Store(#[from] ArtifactStoreError),
}

impl RenderError {
    /// Returns the stable fail-code string for this error, or `None` when
    /// the error is a fatal store failure rather than a gate-level failure
    /// code (§7 propagation policy).
    #[must_use]
    pub const fn fail_code(&self) -> Option<&'static str> {
        match self {
            Self::FileNotFound(_) => Some("FILE_NOT_FOUND"),
            Self::ImportMeshInvalid(_) | Self::MeshInvalid(_) => Some("IMPORT_MESH_INVALID"),
            Self::RenderCrash {
                ..
            } => Some("RENDER_CRASH"),
            Self::RenderTimeout => Some("RENDER_TIMEOUT"),
            Self::Store(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RenderError;

    #[test]
    fn file_not_found_maps_to_stable_fail_code() {
        let error = RenderError::FileNotFound("asset/export.glb".into());
        assert_eq!(error.fail_code(), Some("FILE_NOT_FOUND"));
    }

    #[test]
    fn store_failure_has_no_gate_fail_code() {
        let error = RenderError::Store(realism_gate_core::ArtifactStoreError::NotFound("x".into()));
        assert_eq!(error.fail_code(), None);
    }
}
