// realism-gate-store/src/lib.rs
// ============================================================================
// Module: Filesystem Artifact Store
// Description: Physical run layout, write/read/digest, manifest sealing.
// Purpose: The one on-disk contract every other component writes into or
//          reads from.
// Dependencies: realism-gate-core, std::fs
// ============================================================================

//! ## Overview
//! [`FilesystemArtifactStore`] is the on-disk `ArtifactStore` implementation:
//! a per-run directory tree matching the layout in §4.1, with digests
//! computed lazily on write and cached for `seal()`. A failed write poisons
//! the store permanently — the partial directory is left on disk for
//! forensics, but no further writes or seal can succeed.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;

use realism_gate_core::ArtifactStore;
use realism_gate_core::ArtifactStoreError;
use realism_gate_core::ArtifactKind;
use realism_gate_core::HashDigest;
use realism_gate_core::IterationLineage;
use realism_gate_core::ManifestEntry;
use realism_gate_core::RunId;
use realism_gate_core::RunManifest;
use realism_gate_core::Timestamp;
use realism_gate_core::ToolVersion;
use realism_gate_core::hashing::DEFAULT_HASH_ALGORITHM;
use realism_gate_core::hashing::hash_bytes;
use realism_gate_core::manifest::RUN_MANIFEST_SCHEMA_VERSION;
use time::OffsetDateTime;

/// Directories scaffolded under the run root before any write occurs,
/// matching the fixed layout (§4.1).
const SCAFFOLD_DIRS: &[&str] = &[
    "config",
    "input",
    "asset",
    "render/beauty",
    "render/clay",
    "render/passes/mask",
    "render/passes/depth",
    "render/passes/normal",
    "critics",
    "verdict",
    "logs",
];

/// Filename of the sealed manifest, written directly under the run root.
const MANIFEST_FILE_NAME: &str = "manifest";

/// Mutable bookkeeping guarded by a single mutex so `ArtifactStore` methods
/// can take `&self` (§4.1 implementation note: interior mutability guard).
struct StoreState {
    entries: BTreeMap<String, ManifestEntry>,
    sealed: bool,
    poisoned: bool,
}

/// Filesystem-backed [`ArtifactStore`] rooted at one run directory.
pub struct FilesystemArtifactStore {
    root: PathBuf,
    run_id: RunId,
    lineage: IterationLineage,
    tool_versions: Vec<ToolVersion>,
    state: Mutex<StoreState>,
}

impl FilesystemArtifactStore {
    /// Creates the run directory tree at `root` and returns a fresh,
    /// unsealed store.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactStoreError::Io`] if the directory tree cannot be
    /// created.
    pub fn create(
        root: PathBuf,
        run_id: RunId,
        lineage: IterationLineage,
        tool_versions: Vec<ToolVersion>,
    ) -> Result<Self, ArtifactStoreError> {
        for dir in SCAFFOLD_DIRS {
            fs::create_dir_all(root.join(dir)).map_err(|source| ArtifactStoreError::Io {
                path: (*dir).to_string(),
                source,
            })?;
        }
        Ok(Self {
            root,
            run_id,
            lineage,
            tool_versions,
            state: Mutex::new(StoreState {
                entries: BTreeMap::new(),
                sealed: false,
                poisoned: false,
            }),
        })
    }

    /// Returns the run root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the run id this store is scoped to.
    #[must_use]
    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }
}

/// Infers a manifest `ArtifactKind` from a path's leading directory segment,
/// matching the fixed layout (§4.1).
fn infer_kind(rel_path: &str) -> ArtifactKind {
    if rel_path.starts_with("config/") {
        ArtifactKind::Config
    } else if rel_path.starts_with("input/") {
        ArtifactKind::Input
    } else if rel_path.starts_with("asset/") {
        ArtifactKind::Asset
    } else if rel_path.starts_with("render/passes/") {
        ArtifactKind::RenderPass
    } else if rel_path.starts_with("render/") {
        ArtifactKind::Render
    } else if rel_path.starts_with("critics/") {
        ArtifactKind::CriticArtifact
    } else if rel_path.starts_with("verdict/") {
        ArtifactKind::Verdict
    } else if rel_path.starts_with("logs/") {
        ArtifactKind::Log
    } else {
        ArtifactKind::Custom
    }
}

impl ArtifactStore for FilesystemArtifactStore {
    fn write(&self, rel_path: &str, bytes: &[u8]) -> Result<(), ArtifactStoreError> {
        let mut state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if state.sealed {
            return Err(ArtifactStoreError::AlreadySealed(self.run_id.to_string()));
        }
        if state.poisoned {
            return Err(ArtifactStoreError::Poisoned(self.run_id.to_string()));
        }

        let full_path = self.root.join(rel_path);
        let write_result = full_path
            .parent()
            .map_or(Ok(()), fs::create_dir_all)
            .and_then(|()| fs::write(&full_path, bytes));

        if let Err(source) = write_result {
            state.poisoned = true;
            return Err(ArtifactStoreError::Io {
                path: rel_path.to_string(),
                source,
            });
        }

        let digest = hash_bytes(DEFAULT_HASH_ALGORITHM, bytes);
        state.entries.insert(
            rel_path.to_string(),
            ManifestEntry {
                path: rel_path.to_string(),
                kind: infer_kind(rel_path),
                digest,
                #[allow(clippy::cast_possible_truncation, reason = "artifact files stay far below u64::MAX")]
                size_bytes: bytes.len() as u64,
            },
        );
        Ok(())
    }

    fn read(&self, rel_path: &str) -> Result<Vec<u8>, ArtifactStoreError> {
        let full_path = self.root.join(rel_path);
        fs::read(&full_path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ArtifactStoreError::NotFound(rel_path.to_string())
            } else {
                ArtifactStoreError::Io {
                    path: rel_path.to_string(),
                    source,
                }
            }
        })
    }

    fn digest(&self, rel_path: &str) -> Result<HashDigest, ArtifactStoreError> {
        let state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        state
            .entries
            .get(rel_path)
            .map(|entry| entry.digest.clone())
            .ok_or_else(|| ArtifactStoreError::NotFound(rel_path.to_string()))
    }

    fn seal(&self) -> Result<RunManifest, ArtifactStoreError> {
        let mut state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if state.sealed {
            return Err(ArtifactStoreError::AlreadySealed(self.run_id.to_string()));
        }
        if state.poisoned {
            return Err(ArtifactStoreError::Poisoned(self.run_id.to_string()));
        }

        let manifest = RunManifest {
            schema_version: RUN_MANIFEST_SCHEMA_VERSION.to_string(),
            run_id: self.run_id.clone(),
            created_at: Timestamp::new(OffsetDateTime::now_utc()),
            hash_algorithm: DEFAULT_HASH_ALGORITHM,
            entries: state.entries.values().cloned().collect(),
            tool_versions: self.tool_versions.clone(),
            lineage: self.lineage.clone(),
        };

        let bytes = serde_json::to_vec_pretty(&manifest).map_err(|err| ArtifactStoreError::Io {
            path: MANIFEST_FILE_NAME.to_string(),
            source: std::io::Error::other(err),
        })?;
        fs::write(self.root.join(MANIFEST_FILE_NAME), bytes).map_err(|source| {
            state.poisoned = true;
            ArtifactStoreError::Io {
                path: MANIFEST_FILE_NAME.to_string(),
                source,
            }
        })?;

        state.sealed = true;
        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use realism_gate_core::identifiers::RunId;

    use super::ArtifactStore;
    use super::ArtifactStoreError;
    use super::FilesystemArtifactStore;
    use super::IterationLineage;

    fn new_store(dir: &tempfile::TempDir) -> FilesystemArtifactStore {
        FilesystemArtifactStore::create(
            dir.path().join("run-1"),
            RunId::new("run-20260728T000000Z-test"),
            IterationLineage {
                parent_run_id: None,
                iteration_index: 0,
            },
            Vec::new(),
        )
        .expect("store should create its directory tree")
    }

    #[test]
    fn create_scaffolds_the_fixed_layout() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = new_store(&dir);
        for expected in [
            "config",
            "input",
            "asset",
            "render/beauty",
            "render/clay",
            "render/passes/mask",
            "render/passes/depth",
            "render/passes/normal",
            "critics",
            "verdict",
            "logs",
        ] {
            assert!(store.root().join(expected).is_dir(), "missing directory {expected}");
        }
    }

    #[test]
    fn write_then_read_round_trips_bytes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = new_store(&dir);
        store.write("render/beauty/beauty_front.png", b"fake-png").expect("write should succeed");
        let bytes = store.read("render/beauty/beauty_front.png").expect("read should succeed");
        assert_eq!(bytes, b"fake-png");
    }

    #[test]
    fn digest_matches_independently_computed_hash() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = new_store(&dir);
        store.write("critics/report.json", b"{}").expect("write should succeed");
        let digest = store.digest("critics/report.json").expect("digest should be recorded");
        let expected =
            realism_gate_core::hashing::hash_bytes(realism_gate_core::hashing::DEFAULT_HASH_ALGORITHM, b"{}");
        assert_eq!(digest, expected);
    }

    #[test]
    fn read_of_unwritten_path_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = new_store(&dir);
        let error = store.read("verdict/gate_verdict.json").expect_err("expected NotFound");
        assert!(matches!(error, ArtifactStoreError::NotFound(_)));
    }

    #[test]
    fn seal_is_exactly_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = new_store(&dir);
        store.write("verdict/gate_verdict.json", b"{}").expect("write should succeed");
        let manifest = store.seal().expect("first seal should succeed");
        assert_eq!(manifest.entries.len(), 1);
        let second = store.seal().expect_err("second seal should fail");
        assert!(matches!(second, ArtifactStoreError::AlreadySealed(_)));
    }

    #[test]
    fn seal_writes_manifest_file_to_run_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = new_store(&dir);
        store.write("asset/export.glb", b"mesh-bytes").expect("write should succeed");
        store.seal().expect("seal should succeed");
        assert!(store.root().join("manifest").is_file());
    }

    #[test]
    fn writes_after_seal_are_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = new_store(&dir);
        store.seal().expect("seal should succeed on an empty run");
        let error = store.write("logs/renderer.log", b"log line").expect_err("expected AlreadySealed");
        assert!(matches!(error, ArtifactStoreError::AlreadySealed(_)));
    }

    #[test]
    fn failed_write_poisons_the_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = new_store(&dir);
        // A path with an embedded NUL byte is rejected by the filesystem on
        // every common platform, forcing the write to fail.
        let error = store.write("asset/bad\0name.glb", b"x").expect_err("expected io failure");
        assert!(matches!(error, ArtifactStoreError::Io { .. }));
        let poisoned = store.write("asset/export.glb", b"y").expect_err("expected poisoned store");
        assert!(matches!(poisoned, ArtifactStoreError::Poisoned(_)));
        let seal_result = store.seal().expect_err("expected poisoned store to reject seal");
        assert!(matches!(seal_result, ArtifactStoreError::Poisoned(_)));
    }

    #[test]
    fn manifest_digests_use_consistent_algorithm() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = new_store(&dir);
        store.write("asset/export.glb", b"mesh-bytes").expect("write should succeed");
        store.write("critics/report.json", b"{}").expect("write should succeed");
        let manifest = store.seal().expect("seal should succeed");
        assert!(manifest.digests_use_consistent_algorithm());
    }
}
