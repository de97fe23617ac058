// realism-gate-core/src/traits.rs
// ============================================================================
// Module: ArtifactStore Trait
// Description: The one interface every other component writes into or
//              reads from: write, read, digest, and an exactly-once seal.
// Purpose: Keep the Render Harness, Critics Stack, Gate Decision, and
//          Iteration Controller backend-agnostic to the physical store.
// Dependencies: thiserror
// ============================================================================

//! The `ArtifactStore` trait (§4.1): the one interface every other
//! component writes into or reads from.
//!
//! Render Harness, Critics Stack, Gate Decision, and Iteration Controller
//! all depend on this trait rather than on a concrete filesystem
//! implementation, mirroring the backend-agnostic interface pattern used
//! throughout this codebase's lineage (trait-per-concern, one matching
//! error enum).

use thiserror::Error;

use crate::hashing::HashDigest;
use crate::manifest::RunManifest;

/// Errors raised by an [`ArtifactStore`] implementation.
#[derive(Debug, Error)]
pub enum ArtifactStoreError {
    /// An I/O failure occurred while writing or reading an artifact.
    #[error("artifact store io error for {path}: {source}")]
    Io {
        /// Path relative to the run root.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The requested path has no recorded artifact.
    #[error("no artifact recorded at path {0}")]
    NotFound(String),
    /// A write or digest request was made after `seal()` was already
    /// called.
    #[error("artifact store for run {0} is already sealed")]
    AlreadySealed(String),
    /// A prior write failed; the run is poisoned and preserved for
    /// forensics but can no longer be sealed (§4.1 failure semantics).
    #[error("artifact store for run {0} is poisoned by a prior failed write")]
    Poisoned(String),
    /// Canonical hashing of the manifest failed.
    #[error(transparent)]
    Hash(#[from] crate::hashing::HashError),
}

/// The physical layout and manifest contract every other component writes
/// into or reads from (§4.1).
///
/// # Invariants
///
/// - `seal` must be called at most once per run; subsequent calls return
///   [`ArtifactStoreError::AlreadySealed`].
/// - A failed `write` poisons the store: the partial directory is
///   preserved but no further writes or a seal can succeed.
pub trait ArtifactStore {
    /// Writes `bytes` to `rel_path`, relative to the run root.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactStoreError::AlreadySealed`] if the store has
    /// already been sealed, [`ArtifactStoreError::Poisoned`] if a prior
    /// write failed, or [`ArtifactStoreError::Io`] on I/O failure.
    fn write(&self, rel_path: &str, bytes: &[u8]) -> Result<(), ArtifactStoreError>;

    /// Reads the bytes previously written at `rel_path`.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactStoreError::NotFound`] if nothing was written at
    /// `rel_path`, or [`ArtifactStoreError::Io`] on I/O failure.
    fn read(&self, rel_path: &str) -> Result<Vec<u8>, ArtifactStoreError>;

    /// Returns the content digest recorded for `rel_path`.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactStoreError::NotFound`] if nothing was written at
    /// `rel_path`.
    fn digest(&self, rel_path: &str) -> Result<HashDigest, ArtifactStoreError>;

    /// Seals the run, producing a [`RunManifest`] covering every artifact
    /// written so far. Idempotent-exactly-once: see the trait-level
    /// invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactStoreError::AlreadySealed`] if already sealed, or
    /// [`ArtifactStoreError::Poisoned`] if a prior write failed.
    fn seal(&self) -> Result<RunManifest, ArtifactStoreError>;
}
