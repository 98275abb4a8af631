//! Access-control seam
//!
//! Who may call what is decided outside the ledger. The ledger only asks an
//! [`AccessPolicy`] before running an administrative operation or honoring a
//! transfer-hook notification.

use pool_types::AccountId;
use std::collections::BTreeSet;
use tracing::warn;

use crate::config::LedgerConfig;
use crate::error::LedgerError;

/// Capability required by an entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Wallet lifecycle and membership changes
    Administer,
    /// `before_transfer` / `after_transfer` notifications
    TransferHook,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Administer => write!(f, "administer wallets"),
            Self::TransferHook => write!(f, "drive the transfer hook"),
        }
    }
}

/// Pluggable authorization collaborator.
pub trait AccessPolicy: Send + Sync {
    fn authorize(&self, caller: &AccountId, action: Action) -> Result<(), LedgerError>;
}

/// Static role table: one trusted token ledger plus a set of administrators.
#[derive(Debug, Clone)]
pub struct RoleTable {
    token_ledger: AccountId,
    administrators: BTreeSet<AccountId>,
}

impl RoleTable {
    pub fn new(token_ledger: AccountId, administrators: impl IntoIterator<Item = AccountId>) -> Self {
        Self {
            token_ledger,
            administrators: administrators.into_iter().collect(),
        }
    }

    pub fn from_config(config: &LedgerConfig) -> Self {
        Self::new(
            config.token_ledger.clone(),
            config.administrators.iter().cloned(),
        )
    }

    pub fn token_ledger(&self) -> &AccountId {
        &self.token_ledger
    }

    pub fn is_administrator(&self, caller: &AccountId) -> bool {
        self.administrators.contains(caller)
    }
}

impl AccessPolicy for RoleTable {
    fn authorize(&self, caller: &AccountId, action: Action) -> Result<(), LedgerError> {
        let allowed = match action {
            Action::Administer => self.is_administrator(caller),
            Action::TransferHook => !caller.is_zero() && *caller == self.token_ledger,
        };

        if allowed {
            Ok(())
        } else {
            warn!(caller = %caller, action = %action, "Unauthorized call rejected");
            Err(LedgerError::Unauthorized {
                caller: caller.clone(),
                action,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RoleTable {
        RoleTable::new(AccountId::new("token"), [AccountId::new("admin")])
    }

    #[test]
    fn only_token_ledger_drives_hook() {
        let roles = table();
        assert!(roles
            .authorize(&AccountId::new("token"), Action::TransferHook)
            .is_ok());
        let err = roles
            .authorize(&AccountId::new("admin"), Action::TransferHook)
            .unwrap_err();
        assert!(matches!(err, LedgerError::Unauthorized { .. }));
    }

    #[test]
    fn only_administrators_administer() {
        let roles = table();
        assert!(roles
            .authorize(&AccountId::new("admin"), Action::Administer)
            .is_ok());
        assert!(roles
            .authorize(&AccountId::new("token"), Action::Administer)
            .is_err());
    }
}
