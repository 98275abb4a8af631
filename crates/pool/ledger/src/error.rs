use pool_types::{AccountId, WalletStatus};
use thiserror::Error;

use crate::access::Action;

/// Ledger errors. Every failure aborts the whole operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    // --- Validation ---
    #[error("wallet address is the zero address")]
    WalletAddressZero,

    #[error("participant address is the zero address")]
    ParticipantAddressZero,

    #[error("participant array is empty")]
    ParticipantArrayEmpty,

    #[error("query pair has both wallet and participant as wildcards")]
    WalletAndParticipantBothWildcard,

    // --- State machine ---
    #[error("wallet {0} already exists")]
    WalletAlreadyExists(AccountId),

    #[error("wallet {wallet} is {actual}, operation requires {expected}")]
    WalletStatusIncompatible {
        wallet: AccountId,
        expected: WalletStatus,
        actual: WalletStatus,
    },

    #[error("wallet {wallet} balance is {balance}, must be zero")]
    WalletBalanceNonzero { wallet: AccountId, balance: u64 },

    #[error("wallet {0} has no participants")]
    WalletHasNoParticipants(AccountId),

    #[error("address {0} is registered as a participant and cannot become a wallet")]
    WalletAddressIsParticipant(AccountId),

    #[error("participant {participant} already registered in wallet {wallet}")]
    ParticipantRegisteredAlready {
        wallet: AccountId,
        participant: AccountId,
    },

    #[error("participant {participant} is not registered in wallet {wallet}")]
    ParticipantNotRegistered {
        wallet: AccountId,
        participant: AccountId,
    },

    #[error("participant {0} is itself a shared wallet")]
    ParticipantIsSharedWallet(AccountId),

    #[error("participant {participant} is the initiator of wallet {wallet} and cannot be removed")]
    ParticipantUnremovable {
        wallet: AccountId,
        participant: AccountId,
    },

    #[error("participant {participant} in wallet {wallet} holds {balance}, must be zero")]
    ParticipantBalanceNonzero {
        wallet: AccountId,
        participant: AccountId,
        balance: u64,
    },

    // --- Capacity / invariants ---
    #[error("wallet {wallet} would exceed {max} participants")]
    ParticipantCountExcess { wallet: AccountId, max: u16 },

    #[error("wallet count would overflow")]
    WalletCountExcess,

    #[error("combined balance would overflow")]
    CombinedBalanceExcess,

    #[error("participant {participant} holds {available}, {required} required")]
    ParticipantBalanceInsufficient {
        participant: AccountId,
        available: u64,
        required: u64,
    },

    #[error("wallet {wallet} holds {available}, {required} required")]
    WalletBalanceInsufficient {
        wallet: AccountId,
        available: u64,
        required: u64,
    },

    #[error("computed share {share} exceeds balance {balance} of participant {participant}")]
    SharesCalculationIncorrect {
        participant: AccountId,
        share: u64,
        balance: u64,
    },

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    // --- Authorization ---
    #[error("caller {caller} is not authorized to {action}")]
    Unauthorized { caller: AccountId, action: Action },

    // --- Journal / persistence / config ---
    #[error("history discontinuity at sequence {sequence}: {message}")]
    HistoryDiscontinuity { sequence: u64, message: String },

    #[error("Journal error: {0}")]
    Journal(String),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Error taxonomy used by callers and auditors to group failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    StateMachine,
    Capacity,
    Authorization,
    Internal,
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::WalletAddressZero
            | Self::ParticipantAddressZero
            | Self::ParticipantArrayEmpty
            | Self::WalletAndParticipantBothWildcard => ErrorKind::Validation,

            Self::WalletAlreadyExists(_)
            | Self::WalletStatusIncompatible { .. }
            | Self::WalletBalanceNonzero { .. }
            | Self::WalletHasNoParticipants(_)
            | Self::WalletAddressIsParticipant(_)
            | Self::ParticipantRegisteredAlready { .. }
            | Self::ParticipantNotRegistered { .. }
            | Self::ParticipantIsSharedWallet(_)
            | Self::ParticipantUnremovable { .. }
            | Self::ParticipantBalanceNonzero { .. } => ErrorKind::StateMachine,

            Self::ParticipantCountExcess { .. }
            | Self::WalletCountExcess
            | Self::CombinedBalanceExcess
            | Self::ParticipantBalanceInsufficient { .. }
            | Self::WalletBalanceInsufficient { .. }
            | Self::SharesCalculationIncorrect { .. } => ErrorKind::Capacity,

            Self::Unauthorized { .. } => ErrorKind::Authorization,

            Self::InvariantViolation(_)
            | Self::HistoryDiscontinuity { .. }
            | Self::Journal(_)
            | Self::Snapshot(_)
            | Self::Config(_) => ErrorKind::Internal,
        }
    }

    pub fn status_incompatible(wallet: &AccountId, expected: WalletStatus, actual: WalletStatus) -> Self {
        Self::WalletStatusIncompatible {
            wallet: wallet.clone(),
            expected,
            actual,
        }
    }
}
