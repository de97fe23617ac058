// realism-gate-cli/src/error.rs
// ============================================================================
// Module: CLI Errors
// Description: The CLI's single error type: everything that aborts a run
//              before a `Verdict` could be produced.
// Purpose: Keep config-invalid, store-seal failure, and process-level
//          signals as the only abort paths; everything else becomes a
//          synthetic hard-fail report.
// Dependencies: thiserror
// ============================================================================

//! The CLI's single error type: everything that aborts a run before a
//! `Verdict` could be produced (SPEC_FULL §7: "only config-invalid,
//! artifact-store seal failure, and process-level signals abort a run
//! without producing a Verdict").

use thiserror::Error;

/// Errors that abort the CLI before a `Verdict` is produced.
#[derive(Debug, Error)]
pub enum CliError {
    /// A `GateConfig` (or routing table) could not be loaded or failed
    /// validation.
    #[error("config error: {0}")]
    Config(#[from] realism_gate_config::ConfigError),
    /// The asset directory's `asset_proof.json` could not be read or
    /// parsed.
    #[error("failed to read asset proof at {path}: {source}")]
    AssetProofIo {
        /// Path that could not be read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The asset proof document was not well-formed JSON.
    #[error("asset proof at {path} is not valid json: {source}")]
    AssetProofParse {
        /// Path that failed to parse.
        path: String,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
    /// The artifact store rejected a write or the final seal.
    #[error("artifact store error: {0}")]
    Store(#[from] realism_gate_core::ArtifactStoreError),
    /// The Critics Stack could not be assembled (a required critic was
    /// never registered; unreachable for `CriticRegistry::with_builtin_critics`).
    #[error("critics error: {0}")]
    Critic(#[from] realism_gate_critics::CriticError),
    /// The Gate Decision pipeline rejected the critic report.
    #[error("decision error: {0}")]
    Decision(#[from] realism_gate_decision::DecisionError),
    /// The Iteration Controller's lineage ledger could not be read or
    /// written.
    #[error("iteration controller error: {0}")]
    Controller(#[from] realism_gate_iteration::ControllerError),
    /// A rendered view's image bytes could not be decoded.
    #[error("failed to decode rendered view {view_id}: {source}")]
    ImageDecode {
        /// View whose image bytes failed to decode.
        view_id: String,
        /// Underlying decode error.
        #[source]
        source: image::ImageError,
    },
    /// The final summary could not be written to stdout.
    #[error("failed to write cli output: {0}")]
    Output(#[source] std::io::Error),
}
