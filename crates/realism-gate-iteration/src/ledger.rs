// realism-gate-iteration/src/ledger.rs
// ============================================================================
// Module: SQLite Lineage Ledger
// Description: Durable, WAL-mode `IterationState` storage: every
//              transition is a transactional append, never a destructive
//              update.
// Purpose: Keep run lineage walkable across process restarts.
// Dependencies: rusqlite, serde_json, realism_gate_core
// ============================================================================

//! `SQLite`-backed lineage ledger for `IterationState` (§3, §4.5): every
//! transition is a single transactional append, never a destructive update,
//! so lineage stays walkable across iterations even if the process restarts
//! mid-run.

use std::path::Path;

use realism_gate_core::FailCode;
use realism_gate_core::IssueId;
use realism_gate_core::IterationHistoryEntry;
use realism_gate_core::IterationState;
use realism_gate_core::RunId;
use realism_gate_core::Timestamp;
use realism_gate_core::VerdictOutcome;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::params;

use crate::error::LedgerError;

/// `SQLite` schema version for the lineage ledger.
const SCHEMA_VERSION: i64 = 1;

/// Default busy timeout, matched against the durable-store convention used
/// elsewhere in this codebase's lineage.
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Persists and reconstructs [`IterationState`] for a work-item.
pub trait IterationStore {
    /// Loads the accumulated state for `issue_id`, or `None` if no iteration
    /// has ever been recorded for it.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the ledger cannot be read or a stored row
    /// fails to deserialize.
    fn load(&self, issue_id: &IssueId) -> Result<Option<IterationState>, LedgerError>;

    /// Appends one completed iteration's history entry, transactionally.
    /// `recorded_at` is supplied by the caller (rather than read from the
    /// system clock here) so the ledger itself stays deterministic and
    /// testable, matching the rest of this codebase's time-handling
    /// convention.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the append cannot be committed.
    fn append_entry(
        &self,
        issue_id: &IssueId,
        entry: &IterationHistoryEntry,
        max_iterations: u32,
        escalated: bool,
        recorded_at: Timestamp,
    ) -> Result<(), LedgerError>;
}

/// A `SQLite`, WAL-mode lineage ledger: one append-only row per completed
/// iteration, keyed by issue id.
pub struct SqliteIterationStore {
    connection: Connection,
}

impl SqliteIterationStore {
    /// Opens (creating if absent) a lineage ledger at `path`, applying the
    /// schema migration if the database is fresh.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the database cannot be opened or migrated.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let connection = Connection::open(path)?;
        Self::initialize(connection)
    }

    /// Opens an in-memory ledger, for tests and short-lived tooling.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the database cannot be initialized.
    pub fn open_in_memory() -> Result<Self, LedgerError> {
        let connection = Connection::open_in_memory()?;
        Self::initialize(connection)
    }

    fn initialize(connection: Connection) -> Result<Self, LedgerError> {
        connection.pragma_update(None, "journal_mode", "WAL")?;
        connection.busy_timeout(std::time::Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
        connection.execute_batch(
            "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);
             CREATE TABLE IF NOT EXISTS iteration_ledger (
                 seq INTEGER PRIMARY KEY AUTOINCREMENT,
                 issue_id TEXT NOT NULL,
                 iteration_index INTEGER NOT NULL,
                 run_id TEXT NOT NULL,
                 outcome TEXT NOT NULL,
                 hard_fail_codes TEXT NOT NULL,
                 max_iterations INTEGER NOT NULL,
                 escalated INTEGER NOT NULL,
                 recorded_at TEXT NOT NULL
             );
             CREATE INDEX IF NOT EXISTS iteration_ledger_issue_id_idx
                 ON iteration_ledger (issue_id, seq);",
        )?;
        let stamped: Option<i64> = connection
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| row.get(0))
            .optional()?;
        if stamped.is_none() {
            connection.execute("INSERT INTO schema_version (version) VALUES (?1)", params![SCHEMA_VERSION])?;
        }
        Ok(Self { connection })
    }
}

impl IterationStore for SqliteIterationStore {
    fn load(&self, issue_id: &IssueId) -> Result<Option<IterationState>, LedgerError> {
        let mut statement = self.connection.prepare(
            "SELECT iteration_index, run_id, outcome, hard_fail_codes, max_iterations, escalated
             FROM iteration_ledger WHERE issue_id = ?1 ORDER BY seq ASC",
        )?;
        let mut rows = statement.query(params![issue_id.as_str()])?;

        let mut history = Vec::new();
        let mut max_iterations = 0u32;
        let mut escalated = false;
        while let Some(row) = rows.next()? {
            let iteration_index: i64 = row.get(0)?;
            let run_id: String = row.get(1)?;
            let outcome_str: String = row.get(2)?;
            let hard_fail_codes_json: String = row.get(3)?;
            let max_iterations_row: i64 = row.get(4)?;
            let escalated_row: i64 = row.get(5)?;
            max_iterations = u32::try_from(max_iterations_row).unwrap_or(u32::MAX);
            escalated = escalated_row != 0;

            let outcome = decode_outcome(&outcome_str);
            let hard_fail_codes: Vec<FailCode> =
                serde_json::from_str(&hard_fail_codes_json).map_err(|source| LedgerError::Corrupt {
                    issue_id: issue_id.as_str().to_string(),
                    source,
                })?;
            history.push(IterationHistoryEntry {
                iteration_index: u32::try_from(iteration_index).unwrap_or(u32::MAX),
                run_id: RunId::new(run_id),
                outcome,
                hard_fail_codes,
            });
        }

        if history.is_empty() {
            return Ok(None);
        }

        let iteration_index = u32::try_from(history.len()).unwrap_or(u32::MAX);
        Ok(Some(IterationState {
            issue_id: issue_id.clone(),
            iteration_index,
            history,
            max_iterations,
            escalated,
        }))
    }

    fn append_entry(
        &self,
        issue_id: &IssueId,
        entry: &IterationHistoryEntry,
        max_iterations: u32,
        escalated: bool,
        recorded_at: Timestamp,
    ) -> Result<(), LedgerError> {
        let hard_fail_codes_json = serde_json::to_string(&entry.hard_fail_codes).map_err(|source| LedgerError::Corrupt {
            issue_id: issue_id.as_str().to_string(),
            source,
        })?;
        let recorded_at = recorded_at.to_rfc3339().unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"));
        self.connection.execute(
            "INSERT INTO iteration_ledger
                 (issue_id, iteration_index, run_id, outcome, hard_fail_codes, max_iterations, escalated, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                issue_id.as_str(),
                entry.iteration_index,
                entry.run_id.as_str(),
                encode_outcome(entry.outcome),
                hard_fail_codes_json,
                max_iterations,
                i64::from(escalated),
                recorded_at,
            ],
        )?;
        Ok(())
    }
}

/// Renders a [`VerdictOutcome`] the same way `serde`'s `rename_all =
/// "snake_case"` would, so ledger rows stay human-readable in a `sqlite3`
/// shell.
const fn encode_outcome(outcome: VerdictOutcome) -> &'static str {
    match outcome {
        VerdictOutcome::Pass => "pass",
        VerdictOutcome::Fail => "fail",
        VerdictOutcome::Escalate => "escalate",
    }
}

/// Inverse of [`encode_outcome`]; an unrecognized stored value is treated as
/// `fail` rather than panicking, since a corrupt outcome column should not
/// crash ledger replay.
fn decode_outcome(value: &str) -> VerdictOutcome {
    match value {
        "pass" => VerdictOutcome::Pass,
        "escalate" => VerdictOutcome::Escalate,
        _ => VerdictOutcome::Fail,
    }
}

#[cfg(test)]
mod tests {
    use realism_gate_core::FailCode;
    use realism_gate_core::IssueId;
    use realism_gate_core::IterationHistoryEntry;
    use realism_gate_core::RunId;
    use realism_gate_core::Timestamp;
    use realism_gate_core::VerdictOutcome;
    use time::macros::datetime;

    use super::IterationStore;
    use super::SqliteIterationStore;

    fn sample_time() -> Timestamp {
        Timestamp::new(datetime!(2026-07-28 09:05:03 UTC))
    }

    #[test]
    fn load_returns_none_for_an_unknown_issue() {
        let store = SqliteIterationStore::open_in_memory().expect("open ledger");
        let loaded = store.load(&IssueId::new("issue-1")).expect("load");
        assert!(loaded.is_none());
    }

    #[test]
    fn append_then_load_reconstructs_history_in_order() {
        let store = SqliteIterationStore::open_in_memory().expect("open ledger");
        let issue_id = IssueId::new("issue-1");
        let first = IterationHistoryEntry {
            iteration_index: 0,
            run_id: RunId::new("run-0"),
            outcome: VerdictOutcome::Fail,
            hard_fail_codes: vec![FailCode::new("CAT_NO_CAR_DETECTED")],
        };
        let second = IterationHistoryEntry {
            iteration_index: 1,
            run_id: RunId::new("run-1"),
            outcome: VerdictOutcome::Fail,
            hard_fail_codes: vec![FailCode::new("CAT_NO_CAR_DETECTED")],
        };
        store.append_entry(&issue_id, &first, 5, false, sample_time()).expect("append first");
        store.append_entry(&issue_id, &second, 5, true, sample_time()).expect("append second");

        let loaded = store.load(&issue_id).expect("load").expect("state present");
        assert_eq!(loaded.iteration_index, 2);
        assert_eq!(loaded.history.len(), 2);
        assert_eq!(loaded.history[0].run_id, RunId::new("run-0"));
        assert_eq!(loaded.history[1].run_id, RunId::new("run-1"));
        assert!(loaded.escalated);
        assert_eq!(loaded.max_iterations, 5);
    }

    #[test]
    fn rows_for_distinct_issues_do_not_cross_contaminate() {
        let store = SqliteIterationStore::open_in_memory().expect("open ledger");
        let entry = IterationHistoryEntry {
            iteration_index: 0,
            run_id: RunId::new("run-0"),
            outcome: VerdictOutcome::Pass,
            hard_fail_codes: Vec::new(),
        };
        store.append_entry(&IssueId::new("issue-a"), &entry, 5, false, sample_time()).expect("append a");

        let loaded_b = store.load(&IssueId::new("issue-b")).expect("load b");
        assert!(loaded_b.is_none());
    }
}
