// realism-gate-render/src/rig.rs
// ============================================================================
// Module: Camera Rig
// Description: Six fixed named viewpoints plus an N-frame turntable about
//              the vertical axis, every distance a diagonal multiple.
// Purpose: Give consistent framing across assets of different real-world
//          scales.
// Dependencies: realism_gate_core
// ============================================================================

//! The camera rig (§4.2): six fixed named viewpoints plus an N-frame
//! turntable about the vertical axis, every distance expressed as a
//! multiple of the asset's bounding-box diagonal.

use realism_gate_core::CameraMetadata;
use realism_gate_core::ViewId;

/// One fixed, named viewpoint in the car category's rig.
struct NamedViewpoint {
    /// Stable view identifier.
    name: &'static str,
    azimuth_deg: f64,
    elevation_deg: f64,
    focal_length_mm: f64,
    distance_diagonals: f64,
}

/// The six fixed viewpoints required for the car category (§4.2).
const CAR_RIG_FIXED_VIEWPOINTS: &[NamedViewpoint] = &[
    NamedViewpoint {
        name: "front_three_quarter",
        azimuth_deg: 35.0,
        elevation_deg: 15.0,
        focal_length_mm: 50.0,
        distance_diagonals: 2.2,
    },
    NamedViewpoint {
        name: "rear_three_quarter",
        azimuth_deg: 215.0,
        elevation_deg: 15.0,
        focal_length_mm: 50.0,
        distance_diagonals: 2.2,
    },
    NamedViewpoint {
        name: "left_profile",
        azimuth_deg: 90.0,
        elevation_deg: 5.0,
        focal_length_mm: 85.0,
        distance_diagonals: 2.5,
    },
    NamedViewpoint {
        name: "direct_front",
        azimuth_deg: 0.0,
        elevation_deg: 5.0,
        focal_length_mm: 50.0,
        distance_diagonals: 2.5,
    },
    NamedViewpoint {
        name: "top_down",
        azimuth_deg: 0.0,
        elevation_deg: 89.0,
        focal_length_mm: 35.0,
        distance_diagonals: 2.8,
    },
    NamedViewpoint {
        name: "front_wheel_close_up",
        azimuth_deg: 55.0,
        elevation_deg: 8.0,
        focal_length_mm: 100.0,
        distance_diagonals: 0.9,
    },
];

/// Elevation and distance used for every turntable frame.
const TURNTABLE_ELEVATION_DEG: f64 = 12.0;
/// See [`TURNTABLE_ELEVATION_DEG`].
const TURNTABLE_DISTANCE_DIAGONALS: f64 = 2.3;
/// Focal length used for every turntable frame.
const TURNTABLE_FOCAL_LENGTH_MM: f64 = 50.0;

/// Builds the fixed-plus-turntable camera set for one render job.
pub struct CameraRig {
    /// Number of turntable frames to generate about the vertical axis.
    turntable_frame_count: u32,
}

impl CameraRig {
    /// Creates a rig that will emit `turntable_frame_count` turntable
    /// frames in addition to the six fixed viewpoints.
    #[must_use]
    pub const fn new(turntable_frame_count: u32) -> Self {
        Self {
            turntable_frame_count,
        }
    }

    /// Returns every `(view_id, camera)` pair this rig produces, fixed
    /// viewpoints first, then turntable frames in increasing azimuth
    /// order.
    #[must_use]
    pub fn views(&self) -> Vec<(ViewId, CameraMetadata)> {
        let mut views = Vec::with_capacity(
            CAR_RIG_FIXED_VIEWPOINTS.len() + self.turntable_frame_count as usize,
        );
        for viewpoint in CAR_RIG_FIXED_VIEWPOINTS {
            views.push((
                ViewId::new(viewpoint.name),
                CameraMetadata {
                    azimuth_deg: viewpoint.azimuth_deg,
                    elevation_deg: viewpoint.elevation_deg,
                    focal_length_mm: viewpoint.focal_length_mm,
                    distance_diagonals: viewpoint.distance_diagonals,
                    frame_index: None,
                },
            ));
        }
        for frame_index in 0..self.turntable_frame_count {
            let azimuth_deg = 360.0 * f64::from(frame_index) / f64::from(self.turntable_frame_count.max(1));
            views.push((
                ViewId::new(format!("turntable_f{frame_index:02}")),
                CameraMetadata {
                    azimuth_deg,
                    elevation_deg: TURNTABLE_ELEVATION_DEG,
                    focal_length_mm: TURNTABLE_FOCAL_LENGTH_MM,
                    distance_diagonals: TURNTABLE_DISTANCE_DIAGONALS,
                    frame_index: Some(frame_index),
                },
            ));
        }
        views
    }
}
