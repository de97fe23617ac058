// realism-gate-core/src/manifest.rs
// ============================================================================
// Module: RunManifest Document
// Description: The sealed record linking every byte of a run to a content
//              digest, plus iteration lineage and tool versions.
// Purpose: Give every consumer one audit trail for a run's artifacts.
// Dependencies: serde
// ============================================================================

//! The `RunManifest` document (§3, §4.1, §6): the sealed record linking
//! every byte of a run to a content digest.

use serde::Deserialize;
use serde::Serialize;

use crate::hashing::HashAlgorithm;
use crate::hashing::HashDigest;
use crate::identifiers::RunId;
use crate::time::Timestamp;

/// Schema version carried by every `RunManifest` document.
pub const RUN_MANIFEST_SCHEMA_VERSION: &str = "1.0";

/// The kind of artifact a manifest entry refers to, mirroring the
/// directory layout in §4.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// `config/` — verbatim copy of the `GateConfig`.
    Config,
    /// `input/` — prompt text, template references, seed.
    Input,
    /// `asset/` — source mesh, portable export, textures.
    Asset,
    /// `render/beauty/` or `render/clay/` — a rendered view.
    Render,
    /// `render/passes/` — an optional auxiliary pass.
    RenderPass,
    /// `critics/report.json` or a per-critic derived image.
    CriticArtifact,
    /// `verdict/gate_verdict.json`.
    Verdict,
    /// `logs/` — renderer/critic stdout/stderr.
    Log,
    /// A kind not covered above, named explicitly.
    Custom,
}

/// One file recorded in a `RunManifest`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestEntry {
    /// Path relative to the run root.
    pub path: String,
    /// Kind of artifact at this path.
    pub kind: ArtifactKind,
    /// Content digest.
    pub digest: HashDigest,
    /// Size in bytes.
    pub size_bytes: u64,
}

/// One tool/model version recorded for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolVersion {
    /// Tool name, e.g. `reference-renderer`.
    pub name: String,
    /// Tool version string.
    pub version: String,
}

/// Iteration lineage recorded in a `RunManifest` (§3, §4.5).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IterationLineage {
    /// The run id of the previous iteration, if any.
    pub parent_run_id: Option<RunId>,
    /// Iteration index, starting at 0 for the first evaluation.
    pub iteration_index: u32,
}

/// The sealed record linking every byte of a run to a content digest
/// (§3, §4.1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunManifest {
    /// Fixed schema version string, always `"1.0"`.
    pub schema_version: String,
    /// Run this manifest seals.
    pub run_id: RunId,
    /// Time the manifest was sealed.
    pub created_at: Timestamp,
    /// Hash algorithm used for every entry's digest.
    pub hash_algorithm: HashAlgorithm,
    /// Every artifact written during the run.
    pub entries: Vec<ManifestEntry>,
    /// Tool/model versions recorded for audit.
    pub tool_versions: Vec<ToolVersion>,
    /// Iteration lineage.
    pub lineage: IterationLineage,
}

impl RunManifest {
    /// Returns the manifest entry for `path`, if recorded.
    #[must_use]
    pub fn entry_for(&self, path: &str) -> Option<&ManifestEntry> {
        self.entries.iter().find(|entry| entry.path == path)
    }

    /// Returns `true` iff every entry's digest uses `self.hash_algorithm`.
    #[must_use]
    pub fn digests_use_consistent_algorithm(&self) -> bool {
        self.entries.iter().all(|entry| entry.digest.algorithm == self.hash_algorithm)
    }
}
