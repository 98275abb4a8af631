//! CLI command implementations

pub mod events;
pub mod participant;
pub mod query;
pub mod transfer;
pub mod wallet;

use pool_ledger::LedgerConfig;
use pool_types::AccountId;

use crate::error::{CliError, CliResult};
use crate::output::{print_info, print_success, OutputFormat};
use crate::store::LedgerStore;

/// Shared state for every command.
pub struct Context {
    pub store: LedgerStore,
    pub ledger_config: LedgerConfig,
    pub caller: Option<AccountId>,
    pub output: OutputFormat,
}

impl Context {
    /// Explicit `--caller`, else the first configured administrator.
    pub fn admin_caller(&self) -> CliResult<AccountId> {
        self.caller
            .clone()
            .or_else(|| self.ledger_config.administrators.first().cloned())
            .ok_or_else(|| CliError::InvalidInput("no --caller given and no administrator configured".to_string()))
    }

    /// Explicit `--caller`, else the configured token ledger.
    pub fn hook_caller(&self) -> AccountId {
        self.caller
            .clone()
            .unwrap_or_else(|| self.ledger_config.token_ledger.clone())
    }

    /// Status lines only accompany table output; JSON stays parseable.
    pub fn success(&self, message: &str) {
        if let OutputFormat::Table = self.output {
            print_success(message);
        }
    }

    pub fn info(&self, message: &str) {
        if let OutputFormat::Table = self.output {
            print_info(message);
        }
    }
}

pub(crate) fn parse_accounts(raw: &[String]) -> Vec<AccountId> {
    raw.iter().map(|s| AccountId::new(s.trim())).collect()
}
