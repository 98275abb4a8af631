//! Ledger configuration

use pool_types::AccountId;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Tunables and trusted identities for one ledger instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Upper bound on participants per wallet
    #[serde(default = "default_max_participants")]
    pub max_participants_per_wallet: u16,

    /// Granularity shares are rounded down to before the remainder is assigned
    #[serde(default = "default_accuracy_factor")]
    pub accuracy_factor: u64,

    /// The token ledger allowed to drive the transfer hook
    #[serde(default = "default_token_ledger")]
    pub token_ledger: AccountId,

    /// Callers allowed to run administrative operations
    #[serde(default = "default_administrators")]
    pub administrators: Vec<AccountId>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_participants_per_wallet: default_max_participants(),
            accuracy_factor: default_accuracy_factor(),
            token_ledger: default_token_ledger(),
            administrators: default_administrators(),
        }
    }
}

impl LedgerConfig {
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.max_participants_per_wallet == 0 {
            return Err(LedgerError::Config(
                "max_participants_per_wallet must be at least 1".to_string(),
            ));
        }
        if self.accuracy_factor == 0 {
            return Err(LedgerError::Config(
                "accuracy_factor must be at least 1".to_string(),
            ));
        }
        if self.token_ledger.is_zero() {
            return Err(LedgerError::Config(
                "token_ledger must not be the zero address".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_max_participants() -> u16 {
    100
}

fn default_accuracy_factor() -> u64 {
    1
}

fn default_token_ledger() -> AccountId {
    AccountId::new("token-ledger")
}

fn default_administrators() -> Vec<AccountId> {
    vec![AccountId::new("admin")]
}
