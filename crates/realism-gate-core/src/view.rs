// realism-gate-core/src/view.rs
// ============================================================================
// Module: View Entity
// Description: One rendered image plus the camera metadata that produced
//              it, and the render-mode/auxiliary-pass vocabulary.
// Purpose: Give every rendered frame one addressable, serializable record.
// Dependencies: serde
// ============================================================================

//! The `View` entity (§3): one rendered image plus the camera metadata that
//! produced it.

use serde::Deserialize;
use serde::Serialize;

use crate::identifiers::ViewId;

/// Render pass mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Full shading through the lookdev scene's HDRI.
    Beauty,
    /// All materials overridden by a single neutral diffuse material.
    Clay,
}

impl RenderMode {
    /// Returns the path-segment name used in artifact paths
    /// (`render/<mode>/...`).
    #[must_use]
    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::Beauty => "beauty",
            Self::Clay => "clay",
        }
    }
}

/// Auxiliary (optional) render pass kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuxiliaryPass {
    /// Object segmentation mask.
    Mask,
    /// Linear depth.
    Depth,
    /// Surface-normal vector image.
    Normal,
}

impl AuxiliaryPass {
    /// Returns the path-segment name used under `render/passes/`.
    #[must_use]
    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::Mask => "mask",
            Self::Depth => "depth",
            Self::Normal => "normal",
        }
    }
}

/// Camera placement for one viewpoint, expressed relative to the asset's
/// bounding-box diagonal rather than an absolute distance (§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CameraMetadata {
    /// Azimuth in degrees.
    pub azimuth_deg: f64,
    /// Elevation in degrees.
    pub elevation_deg: f64,
    /// Focal length in millimeters (35mm-equivalent).
    pub focal_length_mm: f64,
    /// Camera distance as a multiple of the asset's bounding-box diagonal.
    pub distance_diagonals: f64,
    /// Turntable frame index, or `None` for a fixed named viewpoint.
    pub frame_index: Option<u32>,
}

/// A single rendered view: an image plus the camera state that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct View {
    /// Identifier for this view, e.g. `front_three_quarter` or
    /// `turntable_f03`.
    pub view_id: ViewId,
    /// Which render pass produced this view.
    pub mode: RenderMode,
    /// Path to the rendered image, relative to the run root.
    pub image_path: String,
    /// Camera placement used for this view.
    pub camera: CameraMetadata,
}
