// realism-gate-core/src/lib.rs
// ============================================================================
// Module: Core Root
// Description: Shared identifiers, canonical hashing, timestamps, and the
//              four external schema documents every other crate builds on.
// Purpose: Re-export the gate's shared vocabulary so no two crates define
//          the same record twice.
// Dependencies: crate::{asset, config, critic, hashing, identifiers,
//               iteration, manifest, mesh, time, traits, verdict, view}
// ============================================================================

//! Shared identifiers, canonical hashing, timestamps, and the four external
//! schema documents (`AssetProof`, `GateConfig`, `CriticReport`, `Verdict`,
//! `RunManifest`) that every other Realism Gate crate builds on.
//!
//! This crate owns no behavior beyond validated construction and the
//! `ArtifactStore` trait surface (§4.1 of the gate specification); the
//! Render Harness, Critics Stack, Gate Decision, and Iteration Controller
//! each live in their own crate and depend on these types rather than on
//! each other.

pub mod asset;
pub mod config;
pub mod critic;
pub mod hashing;
pub mod identifiers;
pub mod iteration;
pub mod manifest;
pub mod mesh;
pub mod time;
pub mod traits;
pub mod verdict;
pub mod view;

#[cfg(feature = "test-support")]
pub mod fixtures;

pub use asset::Asset;
pub use asset::AssetFiles;
pub use asset::AssetMetadata;
pub use asset::AssetProof;
pub use asset::AssetSource;
pub use asset::ASSET_PROOF_SCHEMA_VERSION;
pub use config::CategoryCriticParams;
pub use config::CriticParams;
pub use config::DecisionParams;
pub use config::GateConfig;
pub use config::GeometryCriticParams;
pub use config::IterationParams;
pub use config::PromptAlignmentCriticParams;
pub use config::RealismQualityCriticParams;
pub use config::RenderParams;
pub use critic::CriticReport;
pub use critic::CriticResult;
pub use critic::DeterminismRecord;
pub use critic::ModelRecord;
pub use critic::PartitionedFailures;
pub use critic::ViewEvidence;
pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use hashing::HashError;
pub use hashing::DEFAULT_HASH_ALGORITHM;
pub use identifiers::AssetId;
pub use identifiers::Category;
pub use identifiers::CriticName;
pub use identifiers::FailCode;
pub use identifiers::GateConfigId;
pub use identifiers::IssueId;
pub use identifiers::RunId;
pub use identifiers::ViewId;
pub use iteration::IterationHistoryEntry;
pub use iteration::IterationState;
pub use manifest::ArtifactKind;
pub use manifest::IterationLineage;
pub use manifest::ManifestEntry;
pub use manifest::RunManifest;
pub use manifest::ToolVersion;
pub use manifest::RUN_MANIFEST_SCHEMA_VERSION;
pub use mesh::MeshError;
pub use mesh::PortableMesh;
pub use mesh::Triangle;
pub use mesh::PORTABLE_MESH_SCHEMA_VERSION;
pub use time::Timestamp;
pub use time::TimeError;
pub use traits::ArtifactStore;
pub use traits::ArtifactStoreError;
pub use verdict::ActionKind;
pub use verdict::NextAction;
pub use verdict::Verdict;
pub use verdict::VerdictOutcome;
pub use verdict::VerdictReason;
pub use verdict::VERDICT_SCHEMA_VERSION;
pub use view::AuxiliaryPass;
pub use view::CameraMetadata;
pub use view::RenderMode;
pub use view::View;

/// Stable string for the `CONFIG_UNKNOWN_CATEGORY` hard failure (§6): a
/// category tag with no entry in the routing table.
pub const FAIL_CODE_CONFIG_UNKNOWN_CATEGORY: &str = "CONFIG_UNKNOWN_CATEGORY";

/// Stable string for the `CONFIG_INVALID` hard failure (§8): a `GateConfig`
/// that fails load-time validation.
pub const FAIL_CODE_CONFIG_INVALID: &str = "CONFIG_INVALID";

/// Stable string for the `ASSET_PROOF_INVALID` hard failure (§8): an
/// `AssetProof` that fails schema validation.
pub const FAIL_CODE_ASSET_PROOF_INVALID: &str = "ASSET_PROOF_INVALID";
