//! Participant membership: the per-wallet roster and the reverse index.
//!
//! A [`Roster`] is a dense arena: `participants` has no holes and every
//! registered participant's stored `index` is its position in that array.
//! Removal swaps the last element into the vacated slot and patches the
//! moved participant's index, so both add and remove are O(1) apart from the
//! map update.

use pool_types::{AccountId, LedgerEvent, ParticipantStatus};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, info};

use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::wallet::WalletRegistry;

/// Per-wallet record for one registered participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantState {
    pub index: u16,
    pub balance: u64,
}

/// Ordered participants of one wallet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    participants: Vec<AccountId>,
    states: BTreeMap<AccountId, ParticipantState>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn participants(&self) -> &[AccountId] {
        &self.participants
    }

    /// The participant at index 0.
    pub fn initiator(&self) -> Option<&AccountId> {
        self.participants.first()
    }

    pub fn contains(&self, participant: &AccountId) -> bool {
        self.states.contains_key(participant)
    }

    pub fn state(&self, participant: &AccountId) -> Option<&ParticipantState> {
        self.states.get(participant)
    }

    pub fn status(&self, participant: &AccountId) -> ParticipantStatus {
        if self.contains(participant) {
            ParticipantStatus::Registered
        } else {
            ParticipantStatus::NotRegistered
        }
    }

    pub fn balance_of(&self, participant: &AccountId) -> u64 {
        self.states.get(participant).map(|s| s.balance).unwrap_or(0)
    }

    /// Participant balances in index order; the allocator's weights.
    pub fn weights(&self) -> Vec<u64> {
        self.participants
            .iter()
            .map(|p| self.balance_of(p))
            .collect()
    }

    pub fn total_balance(&self) -> u128 {
        self.states.values().map(|s| s.balance as u128).sum()
    }

    /// Append a participant at zero balance, returning its index.
    pub(crate) fn push(&mut self, participant: AccountId) -> Result<u16, LedgerError> {
        let index = u16::try_from(self.participants.len()).map_err(|_| {
            LedgerError::InvariantViolation("participant index exceeds u16 range".to_string())
        })?;
        self.states
            .insert(participant.clone(), ParticipantState { index, balance: 0 });
        self.participants.push(participant);
        Ok(index)
    }

    /// Swap-with-last removal.
    pub(crate) fn swap_remove(
        &mut self,
        participant: &AccountId,
    ) -> Result<ParticipantState, LedgerError> {
        let removed = self.states.remove(participant).ok_or_else(|| {
            LedgerError::InvariantViolation(format!("{participant} missing from roster"))
        })?;
        let slot = removed.index as usize;
        if self.participants.get(slot) != Some(participant) {
            return Err(LedgerError::InvariantViolation(format!(
                "{participant} recorded at index {slot} but not stored there"
            )));
        }

        self.participants.swap_remove(slot);
        if let Some(moved) = self.participants.get(slot) {
            if let Some(state) = self.states.get_mut(moved) {
                state.index = removed.index;
            }
        }
        Ok(removed)
    }

    pub(crate) fn set_balance(&mut self, participant: &AccountId, balance: u64) {
        if let Some(state) = self.states.get_mut(participant) {
            state.balance = balance;
        }
    }

    /// Every stored index points back at its participant, and nothing else is stored.
    pub fn check_consistency(&self) -> Result<(), LedgerError> {
        if self.participants.len() != self.states.len() {
            return Err(LedgerError::InvariantViolation(format!(
                "roster holds {} participants but {} states",
                self.participants.len(),
                self.states.len()
            )));
        }
        for (participant, state) in &self.states {
            if self.participants.get(state.index as usize) != Some(participant) {
                return Err(LedgerError::InvariantViolation(format!(
                    "participant {participant} stored index {} is stale",
                    state.index
                )));
            }
        }
        Ok(())
    }
}

/// Reverse index participant → wallets, kept in lockstep with the rosters.
///
/// This is a lookup aid for queries; rosters own membership.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantRegistry {
    memberships: BTreeMap<AccountId, BTreeSet<AccountId>>,
}

impl ParticipantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wallets_of(&self, participant: &AccountId) -> Vec<AccountId> {
        self.memberships
            .get(participant)
            .map(|wallets| wallets.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Whether the account is a participant of any wallet.
    pub fn is_member(&self, participant: &AccountId) -> bool {
        self.memberships
            .get(participant)
            .is_some_and(|wallets| !wallets.is_empty())
    }

    pub(crate) fn memberships(&self) -> &BTreeMap<AccountId, BTreeSet<AccountId>> {
        &self.memberships
    }

    /// Check that every candidate could be appended, in order, to `roster`.
    pub fn validate_admission(
        &self,
        wallets: &WalletRegistry,
        wallet: &AccountId,
        roster: &Roster,
        candidates: &[AccountId],
        config: &LedgerConfig,
    ) -> Result<(), LedgerError> {
        if candidates.is_empty() {
            return Err(LedgerError::ParticipantArrayEmpty);
        }

        let mut pending: HashSet<&AccountId> = HashSet::with_capacity(candidates.len());
        for (offset, candidate) in candidates.iter().enumerate() {
            if candidate.is_zero() {
                return Err(LedgerError::ParticipantAddressZero);
            }
            if roster.contains(candidate) || !pending.insert(candidate) {
                return Err(LedgerError::ParticipantRegisteredAlready {
                    wallet: wallet.clone(),
                    participant: candidate.clone(),
                });
            }
            if candidate == wallet || wallets.is_wallet(candidate) {
                return Err(LedgerError::ParticipantIsSharedWallet(candidate.clone()));
            }
            if roster.len() + offset + 1 > config.max_participants_per_wallet as usize {
                return Err(LedgerError::ParticipantCountExcess {
                    wallet: wallet.clone(),
                    max: config.max_participants_per_wallet,
                });
            }
        }
        Ok(())
    }

    /// Check that every candidate can be removed through an ordinary request.
    pub fn validate_removal(
        &self,
        wallet: &AccountId,
        roster: &Roster,
        candidates: &[AccountId],
    ) -> Result<(), LedgerError> {
        if candidates.is_empty() {
            return Err(LedgerError::ParticipantArrayEmpty);
        }

        let mut pending: HashSet<&AccountId> = HashSet::with_capacity(candidates.len());
        for candidate in candidates {
            let state = match roster.state(candidate) {
                Some(state) if pending.insert(candidate) => state,
                _ => {
                    return Err(LedgerError::ParticipantNotRegistered {
                        wallet: wallet.clone(),
                        participant: candidate.clone(),
                    })
                }
            };
            if roster.initiator() == Some(candidate) {
                return Err(LedgerError::ParticipantUnremovable {
                    wallet: wallet.clone(),
                    participant: candidate.clone(),
                });
            }
            if state.balance != 0 {
                return Err(LedgerError::ParticipantBalanceNonzero {
                    wallet: wallet.clone(),
                    participant: candidate.clone(),
                    balance: state.balance,
                });
            }
        }
        Ok(())
    }

    /// Register a validated participant.
    pub(crate) fn admit(
        &mut self,
        wallet: &AccountId,
        roster: &mut Roster,
        participant: &AccountId,
    ) -> Result<LedgerEvent, LedgerError> {
        let index = roster.push(participant.clone())?;
        self.memberships
            .entry(participant.clone())
            .or_default()
            .insert(wallet.clone());

        debug!(wallet = %wallet, participant = %participant, index, "Participant registered");
        Ok(LedgerEvent::ParticipantAdded {
            wallet: wallet.clone(),
            participant: participant.clone(),
            index,
        })
    }

    /// Deregister a validated participant.
    pub(crate) fn release(
        &mut self,
        wallet: &AccountId,
        roster: &mut Roster,
        participant: &AccountId,
    ) -> Result<LedgerEvent, LedgerError> {
        roster.swap_remove(participant)?;
        if let Some(wallets) = self.memberships.get_mut(participant) {
            wallets.remove(wallet);
            if wallets.is_empty() {
                self.memberships.remove(participant);
            }
        }

        debug!(wallet = %wallet, participant = %participant, "Participant deregistered");
        Ok(LedgerEvent::ParticipantRemoved {
            wallet: wallet.clone(),
            participant: participant.clone(),
        })
    }

    /// `addParticipants`: append each candidate to an existing wallet.
    pub fn add_participants(
        &mut self,
        wallets: &mut WalletRegistry,
        config: &LedgerConfig,
        wallet: &AccountId,
        candidates: &[AccountId],
    ) -> Result<Vec<LedgerEvent>, LedgerError> {
        let record = wallets.require_existing(wallet)?;
        self.validate_admission(wallets, wallet, &record.roster, candidates, config)?;

        let record = wallets.require_existing_mut(wallet)?;
        let mut events = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            events.push(self.admit(wallet, &mut record.roster, candidate)?);
        }

        info!(
            wallet = %wallet,
            added = candidates.len(),
            participants = record.roster.len(),
            "Participants added"
        );
        Ok(events)
    }

    /// `removeParticipants`: remove each candidate (zero balance, never the initiator).
    pub fn remove_participants(
        &mut self,
        wallets: &mut WalletRegistry,
        wallet: &AccountId,
        candidates: &[AccountId],
    ) -> Result<Vec<LedgerEvent>, LedgerError> {
        let record = wallets.require_existing(wallet)?;
        self.validate_removal(wallet, &record.roster, candidates)?;

        let record = wallets.require_existing_mut(wallet)?;
        let mut events = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            events.push(self.release(wallet, &mut record.roster, candidate)?);
        }

        info!(
            wallet = %wallet,
            removed = candidates.len(),
            participants = record.roster.len(),
            "Participants removed"
        );
        Ok(events)
    }
}
