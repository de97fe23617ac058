// realism-gate-decision/src/playbook.rs
// ============================================================================
// Module: Repair Playbook
// Description: A fixed failure-code-to-repair-instructions lookup table
//              with generic fallbacks for floor violations and unknown
//              codes.
// Purpose: Turn a fail code into a prioritized, human-readable next-action.
// Dependencies: realism_gate_core
// ============================================================================

//! The fixed failure-code-to-repair-instructions playbook (§4.4:
//! "Instructions are human-readable text derived from a fixed playbook keyed
//! by failure code").

use realism_gate_core::ActionKind;
use realism_gate_core::FailCode;
use realism_gate_core::NextAction;

/// One playbook entry: how urgent the fix is, what to tell the generator,
/// and which action a next-action entry should recommend.
struct PlaybookEntry {
    /// Stable failure code this entry answers, or a `_BELOW_FLOOR` suffix
    /// matched against any critic name.
    code: &'static str,
    /// See [`NextAction::action_kind`].
    action_kind: ActionKind,
    /// See [`NextAction::priority`].
    priority: u8,
    /// See [`NextAction::instructions`].
    instructions: &'static str,
    /// See [`NextAction::template_hint`].
    template_hint: Option<&'static str>,
}

/// Exact failure codes the playbook answers directly.
const ENTRIES: &[PlaybookEntry] = &[
    PlaybookEntry {
        code: "CONFIG_UNKNOWN_CATEGORY",
        action_kind: ActionKind::HumanReview,
        priority: 1,
        instructions: "The asset's category tag has no routed GateConfig. Add a routing entry or correct the tag before resubmitting.",
        template_hint: None,
    },
    PlaybookEntry {
        code: "CONFIG_INVALID",
        action_kind: ActionKind::HumanReview,
        priority: 1,
        instructions: "The GateConfig failed load-time validation. Fix the configuration document; no retry will help.",
        template_hint: None,
    },
    PlaybookEntry {
        code: "ASSET_PROOF_INVALID",
        action_kind: ActionKind::Repair,
        priority: 1,
        instructions: "The AssetProof document failed schema validation. Re-export the asset with a conforming proof record.",
        template_hint: None,
    },
    PlaybookEntry {
        code: "IMPORT_MESH_INVALID",
        action_kind: ActionKind::Repair,
        priority: 1,
        instructions: "The portable mesh export could not be imported. Check the exporter settings and re-export.",
        template_hint: Some("car_basic_scaffold"),
    },
    PlaybookEntry {
        code: "FILE_NOT_FOUND",
        action_kind: ActionKind::Repair,
        priority: 1,
        instructions: "A file referenced by the AssetProof is missing from the artifact directory. Re-export and re-submit all referenced files.",
        template_hint: None,
    },
    PlaybookEntry {
        code: "MESH_INVALID",
        action_kind: ActionKind::Repair,
        priority: 1,
        instructions: "The mesh failed structural decoding. Verify the export is a valid portable mesh document.",
        template_hint: Some("car_basic_scaffold"),
    },
    PlaybookEntry {
        code: "RENDER_CRASH",
        action_kind: ActionKind::HumanReview,
        priority: 1,
        instructions: "The renderer crashed on this asset. This is often adversarial or corrupt geometry; route to a human reviewer.",
        template_hint: None,
    },
    PlaybookEntry {
        code: "RENDER_TIMEOUT",
        action_kind: ActionKind::Repair,
        priority: 2,
        instructions: "Rendering exceeded its time budget, likely due to excessive triangle count or degenerate geometry. Simplify the mesh.",
        template_hint: None,
    },
    PlaybookEntry {
        code: "CRITIC_TIMEOUT",
        action_kind: ActionKind::HumanReview,
        priority: 2,
        instructions: "A critic exceeded its time budget. Route to a human reviewer for manual inspection.",
        template_hint: None,
    },
    PlaybookEntry {
        code: "GATE_TIMEOUT",
        action_kind: ActionKind::HumanReview,
        priority: 2,
        instructions: "The overall gate evaluation exceeded its time budget. Route to a human reviewer.",
        template_hint: None,
    },
    PlaybookEntry {
        code: "CAT_NO_CAR_DETECTED",
        action_kind: ActionKind::Repair,
        priority: 1,
        instructions: "No recognizable instance of the target category was detected in any view. Regenerate with a clearer silhouette matching the category.",
        template_hint: Some("car_basic_scaffold"),
    },
    PlaybookEntry {
        code: "CAT_LOW_CONFIDENCE",
        action_kind: ActionKind::Repair,
        priority: 2,
        instructions: "Category detection confidence is low across too many views. Increase silhouette clarity and foreground contrast.",
        template_hint: None,
    },
    PlaybookEntry {
        code: "CAT_CLIP_MARGIN_LOW",
        action_kind: ActionKind::Repair,
        priority: 2,
        instructions: "The category margin over the nearest decoy category is too small. Strengthen category-distinguishing features.",
        template_hint: None,
    },
    PlaybookEntry {
        code: "CAT_CLAY_DISAGREEMENT",
        action_kind: ActionKind::Repair,
        priority: 1,
        instructions: "Category confidence disagrees strongly between the beauty and clay passes, suggesting textures are carrying a shape the geometry does not have. Fix the underlying geometry, not the texture.",
        template_hint: None,
    },
    PlaybookEntry {
        code: "CAT_UNSTABLE_DETECTION",
        action_kind: ActionKind::Repair,
        priority: 3,
        instructions: "Category detection confidence varies too much across views. Check for view-dependent artifacts such as backface culling errors.",
        template_hint: None,
    },
    PlaybookEntry {
        code: "ALIGN_LOW_SIMILARITY",
        action_kind: ActionKind::Repair,
        priority: 2,
        instructions: "The rendered asset does not resemble its generation prompt. Regenerate closer to the requested description.",
        template_hint: None,
    },
    PlaybookEntry {
        code: "ALIGN_MARGIN_LOW",
        action_kind: ActionKind::Repair,
        priority: 3,
        instructions: "The prompt's specific attributes are not clearly distinguishable from the probed alternatives. Emphasize the requested color, era, or style.",
        template_hint: None,
    },
    PlaybookEntry {
        code: "ALIGN_ATTRIBUTE_MISMATCH",
        action_kind: ActionKind::Repair,
        priority: 3,
        instructions: "One or more attribute probes scored higher than the prompt itself on at least one view. Revisit the attributes named in the prompt.",
        template_hint: None,
    },
    PlaybookEntry {
        code: "REAL_LOW_AESTHETIC",
        action_kind: ActionKind::Repair,
        priority: 3,
        instructions: "Overall aesthetic quality is below the configured floor. Improve lighting response and surface detail.",
        template_hint: None,
    },
    PlaybookEntry {
        code: "REAL_HIGH_NIQE",
        action_kind: ActionKind::Repair,
        priority: 3,
        instructions: "No-reference image quality is below acceptable bounds. Check for rendering artifacts or excessive compression.",
        template_hint: None,
    },
    PlaybookEntry {
        code: "REAL_NOISY_RENDER",
        action_kind: ActionKind::Repair,
        priority: 3,
        instructions: "Rendered views show excessive noise. Increase sample count or check the denoiser configuration.",
        template_hint: None,
    },
    PlaybookEntry {
        code: "REAL_MISSING_TEXTURE",
        action_kind: ActionKind::Repair,
        priority: 2,
        instructions: "Rendered views show the default missing-texture magenta pattern. Fix texture references before resubmitting.",
        template_hint: None,
    },
    PlaybookEntry {
        code: "REAL_LOW_ENTROPY",
        action_kind: ActionKind::Repair,
        priority: 4,
        instructions: "Rendered views are visually flat. Add surface detail or texture variation.",
        template_hint: None,
    },
    PlaybookEntry {
        code: "REAL_CLIPPING",
        action_kind: ActionKind::Repair,
        priority: 4,
        instructions: "Rendered views show excessive highlight or shadow clipping. Adjust exposure or material response.",
        template_hint: None,
    },
    PlaybookEntry {
        code: "GEO_SCALE_IMPLAUSIBLE",
        action_kind: ActionKind::Repair,
        priority: 1,
        instructions: "The asset's bounding box falls outside the category's plausible scale bounds. Rescale the mesh to real-world dimensions.",
        template_hint: Some("car_basic_scaffold"),
    },
    PlaybookEntry {
        code: "GEO_TRI_COUNT_TRIVIAL",
        action_kind: ActionKind::Repair,
        priority: 1,
        instructions: "Triangle count is far below a plausible asset of this category. Regenerate with real geometric detail rather than a placeholder primitive.",
        template_hint: Some("car_basic_scaffold"),
    },
    PlaybookEntry {
        code: "GEO_TRI_COUNT_LOW",
        action_kind: ActionKind::Repair,
        priority: 2,
        instructions: "Triangle count is below the configured plausible range. Add geometric detail.",
        template_hint: None,
    },
    PlaybookEntry {
        code: "GEO_TRI_COUNT_HIGH",
        action_kind: ActionKind::Repair,
        priority: 3,
        instructions: "Triangle count exceeds the configured plausible range. Simplify or decimate the mesh.",
        template_hint: None,
    },
    PlaybookEntry {
        code: "GEO_ASYMMETRIC",
        action_kind: ActionKind::Repair,
        priority: 2,
        instructions: "Bilateral symmetry is below the configured floor. Check for a lopsided or partially-generated mesh.",
        template_hint: None,
    },
    PlaybookEntry {
        code: "GEO_WHEEL_COUNT_LOW",
        action_kind: ActionKind::Repair,
        priority: 1,
        instructions: "Fewer wheel-like components were detected near the ground plane than the category requires. Check for missing or merged wheel geometry.",
        template_hint: Some("car_basic_scaffold"),
    },
    PlaybookEntry {
        code: "GEO_NON_MANIFOLD",
        action_kind: ActionKind::Repair,
        priority: 2,
        instructions: "Too many edges are shared by more than two triangles. Clean up non-manifold geometry before export.",
        template_hint: None,
    },
    PlaybookEntry {
        code: "GEO_NORMALS_INCONSISTENT",
        action_kind: ActionKind::Repair,
        priority: 2,
        instructions: "Face normals do not consistently point outward. Recompute or unify normals before export.",
        template_hint: None,
    },
    PlaybookEntry {
        code: "MAT_NO_UVS",
        action_kind: ActionKind::Repair,
        priority: 3,
        instructions: "The mesh has no UV coordinates. Unwrap the mesh before texturing.",
        template_hint: None,
    },
    PlaybookEntry {
        code: "MAT_MISSING_TEXTURES",
        action_kind: ActionKind::Repair,
        priority: 2,
        instructions: "One or more materials reference textures missing from the asset's file bundle. Include every referenced texture in the export.",
        template_hint: None,
    },
    PlaybookEntry {
        code: "OVERALL_SCORE_LOW",
        action_kind: ActionKind::Repair,
        priority: 3,
        instructions: "The weighted overall score fell below the configured threshold even though no single criterion was catastrophic. Address the highest-priority items above first.",
        template_hint: None,
    },
];

/// Generic entry used for a failure code the playbook has no exact match
/// for, including any unrecognized `_BELOW_FLOOR` suffix.
const FALLBACK_ENTRY: PlaybookEntry = PlaybookEntry {
    code: "",
    action_kind: ActionKind::HumanReview,
    priority: 3,
    instructions: "An unrecognized failure code was recorded. Route to a human reviewer for manual triage.",
    template_hint: None,
};

/// Entry used for a critic subscore floor violation, before the critic name
/// is spliced into its instructions.
const BELOW_FLOOR_ENTRY: PlaybookEntry = PlaybookEntry {
    code: "",
    action_kind: ActionKind::Repair,
    priority: 2,
    instructions: "This critic's score fell below its configured floor even though no single hard check failed. Improve the specific metrics that critic reports.",
    template_hint: None,
};

/// Looks up the playbook entry for `code` and renders it as a [`NextAction`].
///
/// A code ending in `_BELOW_FLOOR` that has no exact match falls back to a
/// generic subscore-floor entry; any other unmatched code falls back to a
/// generic human-review entry.
#[must_use]
pub(crate) fn next_action_for(code: &FailCode) -> NextAction {
    let raw = code.as_str();
    let entry = ENTRIES
        .iter()
        .find(|entry| entry.code == raw)
        .unwrap_or_else(|| if raw.ends_with("_BELOW_FLOOR") { &BELOW_FLOOR_ENTRY } else { &FALLBACK_ENTRY });
    NextAction {
        action_kind: entry.action_kind,
        priority: entry.priority,
        instructions: entry.instructions.to_string(),
        template_hint: entry.template_hint.map(ToString::to_string),
    }
}

#[cfg(test)]
mod tests {
    use realism_gate_core::ActionKind;
    use realism_gate_core::FailCode;

    use super::next_action_for;

    #[test]
    fn a_known_code_resolves_to_its_specific_instructions() {
        let action = next_action_for(&FailCode::new("GEO_SCALE_IMPLAUSIBLE"));
        assert_eq!(action.priority, 1);
        assert!(action.instructions.contains("plausible scale"));
    }

    #[test]
    fn an_unknown_below_floor_code_falls_back_to_the_generic_floor_entry() {
        let action = next_action_for(&FailCode::new("GEOMETRY_BELOW_FLOOR"));
        assert_eq!(action.action_kind, ActionKind::Repair);
        assert!(action.instructions.contains("floor"));
    }

    #[test]
    fn a_wholly_unrecognized_code_falls_back_to_human_review() {
        let action = next_action_for(&FailCode::new("SOMETHING_NEW"));
        assert_eq!(action.action_kind, ActionKind::HumanReview);
    }
}
