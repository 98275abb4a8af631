//! Read-side relationship reporting

use crate::{AccountId, ParticipantStatus, WalletStatus};
use serde::{Deserialize, Serialize};

/// A (wallet, participant) query where either side may be a wildcard.
///
/// `None` and the zero address both mean "any".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipQuery {
    pub wallet: Option<AccountId>,
    pub participant: Option<AccountId>,
}

impl RelationshipQuery {
    pub fn new(wallet: Option<AccountId>, participant: Option<AccountId>) -> Self {
        Self {
            wallet,
            participant,
        }
    }

    pub fn pair(wallet: impl Into<AccountId>, participant: impl Into<AccountId>) -> Self {
        Self::new(Some(wallet.into()), Some(participant.into()))
    }

    pub fn wallet(wallet: impl Into<AccountId>) -> Self {
        Self::new(Some(wallet.into()), None)
    }

    pub fn participant(participant: impl Into<AccountId>) -> Self {
        Self::new(None, Some(participant.into()))
    }

    /// Concrete wallet, if this side is not a wildcard.
    pub fn concrete_wallet(&self) -> Option<&AccountId> {
        self.wallet.as_ref().filter(|id| !id.is_zero())
    }

    /// Concrete participant, if this side is not a wildcard.
    pub fn concrete_participant(&self) -> Option<&AccountId> {
        self.participant.as_ref().filter(|id| !id.is_zero())
    }
}

/// A concrete (wallet, participant) pair.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RelationshipPair {
    pub wallet: AccountId,
    pub participant: AccountId,
}

/// Reporting row for one (wallet, participant) pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipOverview {
    pub wallet: AccountId,
    pub participant: AccountId,
    pub wallet_status: WalletStatus,
    pub wallet_balance: u64,
    pub participant_count: usize,
    pub participant_status: ParticipantStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant_index: Option<u16>,
    pub participant_balance: u64,
}
