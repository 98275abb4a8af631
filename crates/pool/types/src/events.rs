//! Notifications emitted by the ledger
//!
//! Balance-affecting notifications carry `(old, new)` pairs for both the
//! wallet and the participant, so the notification stream alone is enough to
//! rebuild every balance.

use crate::{AccountId, TransferKind};
use serde::{Deserialize, Serialize};

/// Before/after pair for one balance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceDelta {
    pub old: u64,
    pub new: u64,
}

impl BalanceDelta {
    pub fn new(old: u64, new: u64) -> Self {
        Self { old, new }
    }
}

/// One participant's share of a balance movement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceChange {
    pub wallet: AccountId,
    pub participant: AccountId,
    /// The other side of the token movement.
    pub counterparty: AccountId,
    /// Amount applied to this participant.
    pub amount: u64,
    pub participant_balance: BalanceDelta,
    pub wallet_balance: BalanceDelta,
}

/// Ledger notifications
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    // ═══════════════════════════════════════════════════════════════════
    // WALLET LIFECYCLE
    // ═══════════════════════════════════════════════════════════════════
    WalletCreated {
        wallet: AccountId,
        participants: Vec<AccountId>,
    },

    WalletSuspended {
        wallet: AccountId,
    },

    WalletResumed {
        wallet: AccountId,
    },

    WalletDeleted {
        wallet: AccountId,
    },

    // ═══════════════════════════════════════════════════════════════════
    // MEMBERSHIP
    // ═══════════════════════════════════════════════════════════════════
    ParticipantAdded {
        wallet: AccountId,
        participant: AccountId,
        index: u16,
    },

    ParticipantRemoved {
        wallet: AccountId,
        participant: AccountId,
    },

    // ═══════════════════════════════════════════════════════════════════
    // BALANCES
    // ═══════════════════════════════════════════════════════════════════
    Deposit(BalanceChange),

    Withdrawal(BalanceChange),

    TransferIn(BalanceChange),

    TransferOut(BalanceChange),
}

impl LedgerEvent {
    /// Wrap a balance change in the notification matching its kind.
    pub fn balance(kind: TransferKind, change: BalanceChange) -> Self {
        match kind {
            TransferKind::Deposit => Self::Deposit(change),
            TransferKind::Withdrawal => Self::Withdrawal(change),
            TransferKind::TransferIn => Self::TransferIn(change),
            TransferKind::TransferOut => Self::TransferOut(change),
        }
    }

    /// The wallet this notification concerns.
    pub fn wallet(&self) -> &AccountId {
        match self {
            Self::WalletCreated { wallet, .. }
            | Self::WalletSuspended { wallet }
            | Self::WalletResumed { wallet }
            | Self::WalletDeleted { wallet }
            | Self::ParticipantAdded { wallet, .. }
            | Self::ParticipantRemoved { wallet, .. } => wallet,
            Self::Deposit(change)
            | Self::Withdrawal(change)
            | Self::TransferIn(change)
            | Self::TransferOut(change) => &change.wallet,
        }
    }

    pub fn balance_change(&self) -> Option<(TransferKind, &BalanceChange)> {
        match self {
            Self::Deposit(change) => Some((TransferKind::Deposit, change)),
            Self::Withdrawal(change) => Some((TransferKind::Withdrawal, change)),
            Self::TransferIn(change) => Some((TransferKind::TransferIn, change)),
            Self::TransferOut(change) => Some((TransferKind::TransferOut, change)),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::WalletCreated { .. } => "WalletCreated",
            Self::WalletSuspended { .. } => "WalletSuspended",
            Self::WalletResumed { .. } => "WalletResumed",
            Self::WalletDeleted { .. } => "WalletDeleted",
            Self::ParticipantAdded { .. } => "ParticipantAdded",
            Self::ParticipantRemoved { .. } => "ParticipantRemoved",
            Self::Deposit(_) => "Deposit",
            Self::Withdrawal(_) => "Withdrawal",
            Self::TransferIn(_) => "TransferIn",
            Self::TransferOut(_) => "TransferOut",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change() -> BalanceChange {
        BalanceChange {
            wallet: AccountId::new("w"),
            participant: AccountId::new("p"),
            counterparty: AccountId::new("x"),
            amount: 5,
            participant_balance: BalanceDelta::new(0, 5),
            wallet_balance: BalanceDelta::new(10, 15),
        }
    }

    #[test]
    fn balance_constructor_matches_kind() {
        let event = LedgerEvent::balance(TransferKind::TransferIn, change());
        assert_eq!(event.name(), "TransferIn");
        let (kind, inner) = event.balance_change().unwrap();
        assert_eq!(kind, TransferKind::TransferIn);
        assert_eq!(inner.amount, 5);
        assert_eq!(event.wallet(), &AccountId::new("w"));
    }

    #[test]
    fn tagged_serialization() {
        let event = LedgerEvent::WalletSuspended {
            wallet: AccountId::new("w"),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "wallet_suspended");
        assert_eq!(json["wallet"], "w");
    }
}
