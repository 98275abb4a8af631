//! Lifecycle statuses

use serde::{Deserialize, Serialize};

/// Wallet lifecycle state.
///
/// `Nonexistent → Active ⇄ Suspended → Nonexistent`. Deletion is the only
/// way back to `Nonexistent` and leaves the address reusable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletStatus {
    #[default]
    Nonexistent,
    Active,
    Suspended,
}

impl WalletStatus {
    pub fn name(self) -> &'static str {
        match self {
            Self::Nonexistent => "nonexistent",
            Self::Active => "active",
            Self::Suspended => "suspended",
        }
    }

    pub fn exists(self) -> bool {
        !matches!(self, Self::Nonexistent)
    }
}

impl std::fmt::Display for WalletStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Membership of one participant in one wallet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantStatus {
    #[default]
    NotRegistered,
    Registered,
}

impl std::fmt::Display for ParticipantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotRegistered => write!(f, "not_registered"),
            Self::Registered => write!(f, "registered"),
        }
    }
}

/// Classification of a balance movement touching a wallet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferKind {
    /// A registered participant funds its own wallet.
    Deposit,
    /// A wallet pays out to one of its own registered participants.
    Withdrawal,
    /// Value arrives from a non-participant and is spread across participants.
    TransferIn,
    /// Value leaves to a non-participant and is taken from participants by weight.
    TransferOut,
}

impl TransferKind {
    pub fn is_credit(self) -> bool {
        matches!(self, Self::Deposit | Self::TransferIn)
    }
}

impl std::fmt::Display for TransferKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Deposit => "deposit",
            Self::Withdrawal => "withdrawal",
            Self::TransferIn => "transfer_in",
            Self::TransferOut => "transfer_out",
        };
        f.write_str(name)
    }
}
