//! Snapshot-backed ledger storage.

use pool_ledger::{AccessPolicy, LedgerConfig, LedgerSnapshot, RoleTable, SharedWalletLedger};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::error::CliResult;

pub struct LedgerStore {
    path: PathBuf,
    config: LedgerConfig,
}

impl LedgerStore {
    pub fn new(path: impl Into<PathBuf>, config: LedgerConfig) -> Self {
        Self {
            path: path.into(),
            config,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the ledger, or start an empty one when no snapshot exists yet.
    pub fn open(&self) -> CliResult<SharedWalletLedger> {
        let policy: Arc<dyn AccessPolicy> = Arc::new(RoleTable::from_config(&self.config));
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No snapshot, starting empty ledger");
            return Ok(SharedWalletLedger::with_policy(self.config.clone(), policy)?);
        }

        let snapshot = LedgerSnapshot::load(&self.path)?;
        Ok(SharedWalletLedger::from_snapshot(
            self.config.clone(),
            policy,
            snapshot,
        )?)
    }

    pub fn save(&self, ledger: &SharedWalletLedger) -> CliResult<()> {
        ledger.to_snapshot().save(&self.path)?;
        Ok(())
    }
}
