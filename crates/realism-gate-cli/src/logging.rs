// realism-gate-cli/src/logging.rs
// ============================================================================
// Module: Run Logging
// Description: Accumulates canonical-JSON log lines for one `logs/*.log`
//              artifact, written in a single `ArtifactStore::write`.
// Purpose: Give every run a structured, human-readable progress record
//          without a process-wide logging framework.
// Dependencies: realism_gate_core, serde
// ============================================================================

//! Structured run logging (SPEC_FULL §10: "structured, human-readable
//! progress is ... written as canonical JSON lines to the run's `logs/`
//! artifact", rather than pulled in via `tracing`/`log`).

use realism_gate_core::ArtifactStore;
use realism_gate_core::ArtifactStoreError;
use serde::Serialize;

/// Accumulates canonical-JSON log lines for one `logs/*.log` artifact,
/// written in a single `ArtifactStore::write` once the run completes
/// (stores have no append operation; see §4.1).
#[derive(Default)]
pub struct RunLog {
    lines: Vec<String>,
}

impl RunLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes `event` as one canonical JSON line and appends it. A
    /// value that fails to canonicalize is recorded as a plain string
    /// rather than dropped, so a log write can never itself abort a run.
    pub fn record(&mut self, event: &impl Serialize) {
        let line = realism_gate_core::hashing::canonical_json_bytes(event)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .unwrap_or_else(|| "{\"event\":\"unserializable\"}".to_string());
        self.lines.push(line);
    }

    /// Writes every accumulated line, newline-separated, to `rel_path`.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactStoreError`] if the store rejects the write.
    pub fn flush(&self, store: &dyn ArtifactStore, rel_path: &str) -> Result<(), ArtifactStoreError> {
        let mut body = self.lines.join("\n");
        if !body.is_empty() {
            body.push('\n');
        }
        store.write(rel_path, body.as_bytes())
    }
}
