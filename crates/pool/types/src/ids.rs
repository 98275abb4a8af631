//! Account identifiers

use serde::{Deserialize, Serialize};

/// Identifier of an account known to the external token ledger.
///
/// The same identifier space covers wallets, participants and plain
/// counterparties. The all-zero address (`""`, `"0"`, `"0x000…"`) is the
/// "unset" sentinel and never names a real account.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The unset sentinel.
    pub fn zero() -> Self {
        Self(String::new())
    }

    pub fn is_zero(&self) -> bool {
        let raw = self.0.trim();
        let digits = raw
            .strip_prefix("0x")
            .or_else(|| raw.strip_prefix("0X"))
            .unwrap_or(raw);
        digits.chars().all(|c| c == '0')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for AccountId {
    fn from(value: String) -> Self {
        Self(value)
    }
}
