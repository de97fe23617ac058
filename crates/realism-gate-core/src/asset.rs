// realism-gate-core/src/asset.rs
// ============================================================================
// Module: Asset And AssetProof
// Description: The `AssetProof` input contract and the in-run `Asset`
//              record.
// Purpose: Validate and carry the generator's asset handoff through the
//          rest of the gate.
// Dependencies: serde, crate::hashing
// ============================================================================

//! The `AssetProof` input contract (§6) and the in-run `Asset` record (§3).

use serde::Deserialize;
use serde::Serialize;

use crate::hashing::HashDigest;
use crate::identifiers::AssetId;
use crate::identifiers::Category;
use crate::identifiers::RunId;
use crate::time::Timestamp;

/// Schema version carried by every `AssetProof` document.
pub const ASSET_PROOF_SCHEMA_VERSION: &str = "1.0";

/// The generator's declaration of what it produced, validated on receipt.
///
/// `additionalProperties: false` semantics (§6) are enforced at the type
/// level via `deny_unknown_fields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssetProof {
    /// Fixed schema version string, always `"1.0"`.
    pub schema_version: String,
    /// Run this asset belongs to.
    pub run_id: RunId,
    /// Identifier for this asset within the run.
    pub asset_id: AssetId,
    /// Declared category, e.g. `car`.
    pub category: Category,
    /// Provenance of the asset.
    pub source: AssetSource,
    /// Exported and editable-source file references.
    pub files: AssetFiles,
    /// Generator and exporter metadata.
    pub metadata: AssetMetadata,
}

impl AssetProof {
    /// Returns `true` iff `schema_version` matches the version this binary
    /// understands.
    #[must_use]
    pub fn has_supported_schema_version(&self) -> bool {
        self.schema_version == ASSET_PROOF_SCHEMA_VERSION
    }
}

/// Provenance fields for an `AssetProof`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssetSource {
    /// Identifier of the generating agent.
    pub agent_id: String,
    /// UTC time the asset was produced.
    pub produced_at: Timestamp,
    /// Optional template/scaffold reference the generator started from.
    pub template_ref: Option<String>,
}

/// File references carried by an `AssetProof`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssetFiles {
    /// Path to the portable mesh export, relative to `asset/`.
    pub portable_export_path: String,
    /// SHA-256 digest of the portable export.
    pub portable_export_digest: HashDigest,
    /// Path to the editable source form, if the generator retained one.
    pub editable_source_path: Option<String>,
}

/// Generator/exporter metadata carried by an `AssetProof`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssetMetadata {
    /// Version string of the generator that produced the asset.
    pub generator_version: String,
    /// Digest of the exporter's settings, for reproducibility audits.
    pub exporter_settings_digest: HashDigest,
    /// Triangle count as reported by the exporter.
    pub triangle_count: u64,
    /// Bounding-box dimensions in meters, as reported by the exporter.
    pub bounding_box_meters: [f64; 3],
}

/// The asset record as carried through the pipeline once accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Asset {
    /// Identifier for this asset within the run.
    pub asset_id: AssetId,
    /// Declared category.
    pub category: Category,
    /// Generation prompt text.
    pub prompt: String,
    /// Path to the portable mesh export, relative to the run's `asset/`
    /// directory.
    pub portable_export_path: String,
    /// SHA-256 digest of the portable export.
    pub portable_export_digest: HashDigest,
    /// Optional template/scaffold reference.
    pub template_ref: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::ASSET_PROOF_SCHEMA_VERSION;
    use super::AssetProof;

    fn sample_json() -> serde_json::Value {
        serde_json::json!({
            "schema_version": "1.0",
            "run_id": "run-20260728T000000Z-abc",
            "asset_id": "asset-1",
            "category": "car",
            "source": {
                "agent_id": "agent-7",
                "produced_at": "2026-07-28T00:00:00Z",
                "template_ref": null
            },
            "files": {
                "portable_export_path": "asset/export.glb",
                "portable_export_digest": {"algorithm": "sha256", "value": "aa"},
                "editable_source_path": null
            },
            "metadata": {
                "generator_version": "gen-3.2.0",
                "exporter_settings_digest": {"algorithm": "sha256", "value": "bb"},
                "triangle_count": 85_000,
                "bounding_box_meters": [4.6, 1.8, 1.45]
            }
        })
    }

    #[test]
    fn parses_a_well_formed_asset_proof() {
        let proof: AssetProof = serde_json::from_value(sample_json()).expect("parse asset proof");
        assert_eq!(proof.schema_version, ASSET_PROOF_SCHEMA_VERSION);
        assert!(proof.has_supported_schema_version());
        assert_eq!(proof.metadata.triangle_count, 85_000);
    }

    #[test]
    fn rejects_unknown_fields() {
        let mut value = sample_json();
        value["unexpected"] = serde_json::json!(true);
        let result: Result<AssetProof, _> = serde_json::from_value(value);
        assert!(result.is_err());
    }
}
