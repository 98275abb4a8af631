//! Versioned JSON snapshots of ledger state plus its journal.
//!
//! Writes go to a `.tmp` sibling first and are renamed into place, so an
//! interrupted save never leaves a truncated snapshot behind.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::error::LedgerError;
use crate::journal::EventEnvelope;
use crate::ledger::LedgerState;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: u32,
    pub state: LedgerState,
    pub journal: Vec<EventEnvelope>,
}

impl LedgerSnapshot {
    pub fn new(state: LedgerState, journal: Vec<EventEnvelope>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            state,
            journal,
        }
    }

    pub fn to_json(&self) -> Result<String, LedgerError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| LedgerError::Snapshot(format!("serialization failed: {e}")))
    }

    /// Parse a snapshot, rejecting unknown versions.
    ///
    /// Chain and invariant checks happen when the snapshot is turned back
    /// into a ledger.
    pub fn from_json(json: &str) -> Result<Self, LedgerError> {
        let snapshot: Self = serde_json::from_str(json)
            .map_err(|e| LedgerError::Snapshot(format!("deserialization failed: {e}")))?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(LedgerError::Snapshot(format!(
                "unsupported snapshot version {} (expected {})",
                snapshot.version, SNAPSHOT_VERSION
            )));
        }
        Ok(snapshot)
    }

    pub fn save(&self, path: &Path) -> Result<(), LedgerError> {
        let json = self.to_json()?;
        let tmp_path = path.with_extension("tmp");
        std::fs::write(&tmp_path, json)
            .map_err(|e| LedgerError::Snapshot(format!("write {}: {e}", tmp_path.display())))?;
        std::fs::rename(&tmp_path, path)
            .map_err(|e| LedgerError::Snapshot(format!("rename into {}: {e}", path.display())))?;

        debug!(path = %path.display(), entries = self.journal.len(), "Snapshot saved");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, LedgerError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| LedgerError::Snapshot(format!("read {}: {e}", path.display())))?;
        Self::from_json(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");

        let snapshot = LedgerSnapshot::new(LedgerState::default(), Vec::new());
        snapshot.save(&path).unwrap();

        assert!(!path.with_extension("tmp").exists());
        assert_eq!(LedgerSnapshot::load(&path).unwrap(), snapshot);
    }

    #[test]
    fn rejects_unknown_version() {
        let mut snapshot = LedgerSnapshot::new(LedgerState::default(), Vec::new());
        snapshot.version = SNAPSHOT_VERSION + 1;
        let json = snapshot.to_json().unwrap();

        assert!(matches!(
            LedgerSnapshot::from_json(&json),
            Err(LedgerError::Snapshot(_))
        ));
    }

    #[test]
    fn missing_file_is_a_snapshot_error() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            LedgerSnapshot::load(&dir.path().join("absent.json")),
            Err(LedgerError::Snapshot(_))
        ));
    }
}
