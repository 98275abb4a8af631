//! Rebuild ledger balances from the notification stream alone.
//!
//! Each balance notification carries `(old, new)` for both the wallet and the
//! participant. Replay checks every `old` against what it has reconstructed
//! so far; any disagreement means the stream is incomplete or reordered.

use pool_types::{AccountId, LedgerEvent, WalletStatus};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::LedgerError;
use crate::journal::EventEnvelope;

/// Reconstructed view of one wallet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplayedWallet {
    pub status: WalletStatus,
    pub balance: u64,
    /// Participants in index order.
    pub participants: Vec<AccountId>,
    pub balances: BTreeMap<AccountId, u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BalanceHistory {
    wallets: BTreeMap<AccountId, ReplayedWallet>,
    combined_balance: u64,
    applied: u64,
}

impl BalanceHistory {
    /// Replay journal entries in sequence order.
    pub fn replay(entries: &[EventEnvelope]) -> Result<Self, LedgerError> {
        let mut history = Self::default();
        for entry in entries {
            if entry.sequence != history.applied {
                return Err(LedgerError::HistoryDiscontinuity {
                    sequence: entry.sequence,
                    message: format!("expected sequence {}", history.applied),
                });
            }
            history.apply(&entry.event)?;
        }
        Ok(history)
    }

    /// Replay bare notifications, numbering them from zero.
    pub fn replay_events<'a>(events: impl IntoIterator<Item = &'a LedgerEvent>) -> Result<Self, LedgerError> {
        let mut history = Self::default();
        for event in events {
            history.apply(event)?;
        }
        Ok(history)
    }

    pub fn wallets(&self) -> &BTreeMap<AccountId, ReplayedWallet> {
        &self.wallets
    }

    pub fn wallet(&self, wallet: &AccountId) -> Option<&ReplayedWallet> {
        self.wallets.get(wallet)
    }

    pub fn wallet_balance(&self, wallet: &AccountId) -> u64 {
        self.wallets.get(wallet).map(|w| w.balance).unwrap_or(0)
    }

    pub fn participant_balance(&self, wallet: &AccountId, participant: &AccountId) -> u64 {
        self.wallets
            .get(wallet)
            .and_then(|w| w.balances.get(participant).copied())
            .unwrap_or(0)
    }

    pub fn wallet_count(&self) -> usize {
        self.wallets.len()
    }

    pub fn combined_balance(&self) -> u64 {
        self.combined_balance
    }

    /// Number of notifications applied.
    pub fn applied(&self) -> u64 {
        self.applied
    }

    fn discontinuity(&self, message: String) -> LedgerError {
        LedgerError::HistoryDiscontinuity {
            sequence: self.applied,
            message,
        }
    }

    fn wallet_mut(&mut self, wallet: &AccountId) -> Result<&mut ReplayedWallet, LedgerError> {
        let sequence = self.applied;
        self.wallets
            .get_mut(wallet)
            .ok_or_else(|| LedgerError::HistoryDiscontinuity {
                sequence,
                message: format!("wallet {wallet} has not been created"),
            })
    }

    fn apply(&mut self, event: &LedgerEvent) -> Result<(), LedgerError> {
        match event {
            LedgerEvent::WalletCreated { wallet, .. } => {
                if self.wallets.contains_key(wallet) {
                    return Err(self.discontinuity(format!("wallet {wallet} created twice")));
                }
                self.wallets.insert(
                    wallet.clone(),
                    ReplayedWallet {
                        status: WalletStatus::Active,
                        ..Default::default()
                    },
                );
            }
            LedgerEvent::WalletSuspended { wallet } => {
                self.wallet_mut(wallet)?.status = WalletStatus::Suspended;
            }
            LedgerEvent::WalletResumed { wallet } => {
                self.wallet_mut(wallet)?.status = WalletStatus::Active;
            }
            LedgerEvent::WalletDeleted { wallet } => {
                let remaining = self.wallet_mut(wallet)?.participants.len();
                if remaining != 0 {
                    return Err(self.discontinuity(format!(
                        "wallet {wallet} deleted with {remaining} participants left"
                    )));
                }
                self.wallets.remove(wallet);
            }
            LedgerEvent::ParticipantAdded {
                wallet,
                participant,
                index,
            } => {
                let sequence = self.applied;
                let record = self.wallet_mut(wallet)?;
                if record.participants.len() != *index as usize || record.balances.contains_key(participant) {
                    return Err(LedgerError::HistoryDiscontinuity {
                        sequence,
                        message: format!("participant {participant} cannot take index {index}"),
                    });
                }
                record.participants.push(participant.clone());
                record.balances.insert(participant.clone(), 0);
            }
            LedgerEvent::ParticipantRemoved {
                wallet,
                participant,
            } => {
                let sequence = self.applied;
                let record = self.wallet_mut(wallet)?;
                let slot = record
                    .participants
                    .iter()
                    .position(|p| p == participant)
                    .ok_or_else(|| LedgerError::HistoryDiscontinuity {
                        sequence,
                        message: format!("participant {participant} is not in wallet {wallet}"),
                    })?;
                record.participants.swap_remove(slot);
                record.balances.remove(participant);
            }
            LedgerEvent::Deposit(change)
            | LedgerEvent::Withdrawal(change)
            | LedgerEvent::TransferIn(change)
            | LedgerEvent::TransferOut(change) => {
                let sequence = self.applied;
                let record = self.wallet_mut(&change.wallet)?;
                let participant_old = record.balances.get(&change.participant).copied();

                if record.balance != change.wallet_balance.old {
                    return Err(LedgerError::HistoryDiscontinuity {
                        sequence,
                        message: format!(
                            "wallet {} balance is {}, notification says {}",
                            change.wallet, record.balance, change.wallet_balance.old
                        ),
                    });
                }
                if participant_old != Some(change.participant_balance.old) {
                    return Err(LedgerError::HistoryDiscontinuity {
                        sequence,
                        message: format!(
                            "participant {} balance is {:?}, notification says {}",
                            change.participant, participant_old, change.participant_balance.old
                        ),
                    });
                }

                record.balance = change.wallet_balance.new;
                record
                    .balances
                    .insert(change.participant.clone(), change.participant_balance.new);

                let combined = if change.wallet_balance.new >= change.wallet_balance.old {
                    self.combined_balance
                        .checked_add(change.wallet_balance.new - change.wallet_balance.old)
                } else {
                    self.combined_balance
                        .checked_sub(change.wallet_balance.old - change.wallet_balance.new)
                };
                self.combined_balance = combined.ok_or_else(|| LedgerError::HistoryDiscontinuity {
                    sequence,
                    message: "combined balance out of range".to_string(),
                })?;
            }
        }

        self.applied += 1;
        Ok(())
    }
}
