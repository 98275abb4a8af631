//! Relationship reporting: wildcard pair expansion and overview rows.

use pool_types::{AccountId, ParticipantStatus, RelationshipOverview, RelationshipPair, RelationshipQuery, WalletStatus};
use tracing::debug;

use crate::error::LedgerError;
use crate::participant::ParticipantRegistry;
use crate::wallet::WalletRegistry;

/// Expands wildcard `(wallet, participant)` queries into concrete pairs.
///
/// - wallet wildcard: every wallet the participant belongs to
/// - participant wildcard: every participant of the wallet, in index order
/// - both concrete: passed through, whether or not the relationship exists
pub struct PairNormalizer<'a> {
    wallets: &'a WalletRegistry,
    members: &'a ParticipantRegistry,
}

impl<'a> PairNormalizer<'a> {
    pub fn new(wallets: &'a WalletRegistry, members: &'a ParticipantRegistry) -> Self {
        Self { wallets, members }
    }

    /// Concrete pairs in query order. Fails if any query is wild on both sides.
    pub fn normalize(&self, queries: &[RelationshipQuery]) -> Result<Vec<RelationshipPair>, LedgerError> {
        let mut pairs = Vec::new();
        for query in queries {
            match (query.concrete_wallet(), query.concrete_participant()) {
                (None, None) => return Err(LedgerError::WalletAndParticipantBothWildcard),
                (Some(wallet), Some(participant)) => pairs.push(RelationshipPair {
                    wallet: wallet.clone(),
                    participant: participant.clone(),
                }),
                (None, Some(participant)) => {
                    pairs.extend(self.members.wallets_of(participant).into_iter().map(|wallet| {
                        RelationshipPair {
                            wallet,
                            participant: participant.clone(),
                        }
                    }));
                }
                (Some(wallet), None) => {
                    if let Some(record) = self.wallets.get(wallet) {
                        pairs.extend(record.roster().participants().iter().map(|participant| {
                            RelationshipPair {
                                wallet: wallet.clone(),
                                participant: participant.clone(),
                            }
                        }));
                    }
                }
            }
        }

        debug!(queries = queries.len(), pairs = pairs.len(), "Relationship queries expanded");
        Ok(pairs)
    }

    /// Report row for one concrete pair.
    pub fn overview(&self, pair: &RelationshipPair) -> RelationshipOverview {
        overview_of(self.wallets, &pair.wallet, &pair.participant)
    }

    pub fn overviews(&self, queries: &[RelationshipQuery]) -> Result<Vec<RelationshipOverview>, LedgerError> {
        Ok(self
            .normalize(queries)?
            .iter()
            .map(|pair| self.overview(pair))
            .collect())
    }
}

fn overview_of(wallets: &WalletRegistry, wallet: &AccountId, participant: &AccountId) -> RelationshipOverview {
    match wallets.get(wallet) {
        Some(record) => {
            let state = record.roster().state(participant);
            RelationshipOverview {
                wallet: wallet.clone(),
                participant: participant.clone(),
                wallet_status: record.status(),
                wallet_balance: record.balance(),
                participant_count: record.participant_count(),
                participant_status: record.roster().status(participant),
                participant_index: state.map(|s| s.index),
                participant_balance: state.map(|s| s.balance).unwrap_or(0),
            }
        }
        None => RelationshipOverview {
            wallet: wallet.clone(),
            participant: participant.clone(),
            wallet_status: WalletStatus::Nonexistent,
            wallet_balance: 0,
            participant_count: 0,
            participant_status: ParticipantStatus::NotRegistered,
            participant_index: None,
            participant_balance: 0,
        },
    }
}
