//! Wallet lifecycle
//!
//! `Nonexistent → Active ⇄ Suspended → Nonexistent`. A wallet that is not
//! in the registry is `Nonexistent`; deleting a wallet drops its record so
//! the address is reusable from a pristine state.

use pool_types::{AccountId, LedgerEvent, WalletStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use crate::aggregate::AggregateLedger;
use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::participant::{ParticipantRegistry, Roster};

/// One live wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletRecord {
    pub(crate) status: WalletStatus,
    pub(crate) balance: u64,
    pub(crate) roster: Roster,
}

impl WalletRecord {
    fn new() -> Self {
        Self {
            status: WalletStatus::Active,
            balance: 0,
            roster: Roster::new(),
        }
    }

    pub fn status(&self) -> WalletStatus {
        self.status
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn participant_count(&self) -> usize {
        self.roster.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletRegistry {
    wallets: BTreeMap<AccountId, WalletRecord>,
}

impl WalletRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self, wallet: &AccountId) -> WalletStatus {
        self.wallets
            .get(wallet)
            .map(|record| record.status)
            .unwrap_or(WalletStatus::Nonexistent)
    }

    pub fn is_wallet(&self, account: &AccountId) -> bool {
        self.wallets.contains_key(account)
    }

    pub fn get(&self, wallet: &AccountId) -> Option<&WalletRecord> {
        self.wallets.get(wallet)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AccountId, &WalletRecord)> {
        self.wallets.iter()
    }

    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }

    pub(crate) fn require_existing(&self, wallet: &AccountId) -> Result<&WalletRecord, LedgerError> {
        self.wallets.get(wallet).ok_or_else(|| {
            LedgerError::status_incompatible(
                wallet,
                WalletStatus::Active,
                WalletStatus::Nonexistent,
            )
        })
    }

    pub(crate) fn require_existing_mut(
        &mut self,
        wallet: &AccountId,
    ) -> Result<&mut WalletRecord, LedgerError> {
        self.wallets.get_mut(wallet).ok_or_else(|| {
            LedgerError::status_incompatible(
                wallet,
                WalletStatus::Active,
                WalletStatus::Nonexistent,
            )
        })
    }

    fn require_status(
        &self,
        wallet: &AccountId,
        expected: WalletStatus,
    ) -> Result<&WalletRecord, LedgerError> {
        let actual = self.status(wallet);
        match self.wallets.get(wallet) {
            Some(record) if actual == expected => Ok(record),
            _ => Err(LedgerError::status_incompatible(wallet, expected, actual)),
        }
    }

    /// `createWallet`: Nonexistent → Active with an initial participant set.
    ///
    /// The first participant becomes the initiator.
    pub fn create(
        &mut self,
        members: &mut ParticipantRegistry,
        totals: &mut AggregateLedger,
        config: &LedgerConfig,
        wallet: &AccountId,
        participants: &[AccountId],
    ) -> Result<Vec<LedgerEvent>, LedgerError> {
        if wallet.is_zero() {
            return Err(LedgerError::WalletAddressZero);
        }
        if self.is_wallet(wallet) {
            return Err(LedgerError::WalletAlreadyExists(wallet.clone()));
        }
        if participants.is_empty() {
            return Err(LedgerError::ParticipantArrayEmpty);
        }
        if members.is_member(wallet) {
            return Err(LedgerError::WalletAddressIsParticipant(wallet.clone()));
        }
        totals.checked_wallet_increment()?;
        members.validate_admission(self, wallet, &Roster::new(), participants, config)?;

        let mut record = WalletRecord::new();
        let mut events = Vec::with_capacity(participants.len() + 1);
        events.push(LedgerEvent::WalletCreated {
            wallet: wallet.clone(),
            participants: participants.to_vec(),
        });
        for participant in participants {
            events.push(members.admit(wallet, &mut record.roster, participant)?);
        }
        self.wallets.insert(wallet.clone(), record);
        totals.increment_wallets()?;

        info!(
            wallet = %wallet,
            participants = participants.len(),
            wallet_count = totals.wallet_count(),
            "Wallet created"
        );
        Ok(events)
    }

    /// `suspendWallet`: Active → Suspended, only at zero balance.
    pub fn suspend(&mut self, wallet: &AccountId) -> Result<Vec<LedgerEvent>, LedgerError> {
        let record = self.require_status(wallet, WalletStatus::Active)?;
        if record.balance != 0 {
            return Err(LedgerError::WalletBalanceNonzero {
                wallet: wallet.clone(),
                balance: record.balance,
            });
        }

        self.set_status(wallet, WalletStatus::Suspended)?;
        info!(wallet = %wallet, "Wallet suspended");
        Ok(vec![LedgerEvent::WalletSuspended {
            wallet: wallet.clone(),
        }])
    }

    /// `resumeWallet`: Suspended → Active, only while participants remain.
    pub fn resume(&mut self, wallet: &AccountId) -> Result<Vec<LedgerEvent>, LedgerError> {
        let record = self.require_status(wallet, WalletStatus::Suspended)?;
        if record.roster.is_empty() {
            return Err(LedgerError::WalletHasNoParticipants(wallet.clone()));
        }

        self.set_status(wallet, WalletStatus::Active)?;
        info!(wallet = %wallet, "Wallet resumed");
        Ok(vec![LedgerEvent::WalletResumed {
            wallet: wallet.clone(),
        }])
    }

    /// `deleteWallet`: Suspended → Nonexistent.
    ///
    /// Every remaining participant, initiator included, is removed first;
    /// each must hold a zero balance.
    pub fn delete(
        &mut self,
        members: &mut ParticipantRegistry,
        totals: &mut AggregateLedger,
        wallet: &AccountId,
    ) -> Result<Vec<LedgerEvent>, LedgerError> {
        let record = self.require_status(wallet, WalletStatus::Suspended)?;
        if record.balance != 0 {
            return Err(LedgerError::WalletBalanceNonzero {
                wallet: wallet.clone(),
                balance: record.balance,
            });
        }
        for participant in record.roster.participants() {
            let balance = record.roster.balance_of(participant);
            if balance != 0 {
                return Err(LedgerError::ParticipantBalanceNonzero {
                    wallet: wallet.clone(),
                    participant: participant.clone(),
                    balance,
                });
            }
        }
        totals.checked_wallet_decrement()?;

        let mut record = self.wallets.remove(wallet).ok_or_else(|| {
            LedgerError::InvariantViolation(format!("wallet {wallet} vanished during delete"))
        })?;
        let mut events = Vec::with_capacity(record.roster.len() + 1);
        // Last-first, so every removal is a plain truncation.
        let remaining: Vec<AccountId> = record.roster.participants().iter().rev().cloned().collect();
        for participant in &remaining {
            events.push(members.release(wallet, &mut record.roster, participant)?);
        }
        totals.decrement_wallets()?;
        events.push(LedgerEvent::WalletDeleted {
            wallet: wallet.clone(),
        });

        info!(
            wallet = %wallet,
            removed = remaining.len(),
            wallet_count = totals.wallet_count(),
            "Wallet deleted"
        );
        Ok(events)
    }

    fn set_status(&mut self, wallet: &AccountId, status: WalletStatus) -> Result<(), LedgerError> {
        let record = self.require_existing_mut(wallet)?;
        record.status = status;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<AccountId> {
        names.iter().map(|n| AccountId::new(*n)).collect()
    }

    struct Fixture {
        wallets: WalletRegistry,
        members: ParticipantRegistry,
        totals: AggregateLedger,
        config: LedgerConfig,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                wallets: WalletRegistry::new(),
                members: ParticipantRegistry::new(),
                totals: AggregateLedger::new(),
                config: LedgerConfig::default(),
            }
        }

        fn create(&mut self, wallet: &str, participants: &[&str]) -> Result<Vec<LedgerEvent>, LedgerError> {
            self.wallets.create(
                &mut self.members,
                &mut self.totals,
                &self.config,
                &AccountId::new(wallet),
                &ids(participants),
            )
        }
    }

    #[test]
    fn create_registers_participants_in_order() {
        let mut fx = Fixture::new();
        let events = fx.create("w", &["p0", "p1", "p2"]).unwrap();

        let record = fx.wallets.get(&AccountId::new("w")).unwrap();
        assert_eq!(record.status(), WalletStatus::Active);
        assert_eq!(record.roster().participants(), ids(&["p0", "p1", "p2"]).as_slice());
        assert_eq!(fx.totals.wallet_count(), 1);
        assert_eq!(events.len(), 4);
        assert_eq!(events[0].name(), "WalletCreated");
    }

    #[test]
    fn create_rejects_existing_and_empty() {
        let mut fx = Fixture::new();
        fx.create("w", &["p0"]).unwrap();
        assert_eq!(
            fx.create("w", &["p1"]).unwrap_err(),
            LedgerError::WalletAlreadyExists(AccountId::new("w"))
        );
        assert_eq!(
            fx.create("w2", &[]).unwrap_err(),
            LedgerError::ParticipantArrayEmpty
        );
        assert_eq!(fx.totals.wallet_count(), 1);
    }

    #[test]
    fn create_rejects_wallets_as_participants_both_ways() {
        let mut fx = Fixture::new();
        fx.create("w1", &["p0"]).unwrap();

        assert_eq!(
            fx.create("w2", &["w1"]).unwrap_err(),
            LedgerError::ParticipantIsSharedWallet(AccountId::new("w1"))
        );
        assert_eq!(
            fx.create("w3", &["w3"]).unwrap_err(),
            LedgerError::ParticipantIsSharedWallet(AccountId::new("w3"))
        );
        assert_eq!(
            fx.create("p0", &["p9"]).unwrap_err(),
            LedgerError::WalletAddressIsParticipant(AccountId::new("p0"))
        );
    }

    #[test]
    fn failed_create_leaves_no_trace() {
        let mut fx = Fixture::new();
        let err = fx.create("w", &["p0", "0x0"]).unwrap_err();
        assert_eq!(err, LedgerError::ParticipantAddressZero);
        assert!(fx.wallets.is_empty());
        assert!(fx.members.wallets_of(&AccountId::new("p0")).is_empty());
        assert_eq!(fx.totals.wallet_count(), 0);
    }

    #[test]
    fn suspend_requires_active_and_zero_balance() {
        let mut fx = Fixture::new();
        fx.create("w", &["p0"]).unwrap();
        let wallet = AccountId::new("w");

        fx.wallets.wallets.get_mut(&wallet).unwrap().balance = 5;
        assert_eq!(
            fx.wallets.suspend(&wallet).unwrap_err(),
            LedgerError::WalletBalanceNonzero {
                wallet: wallet.clone(),
                balance: 5
            }
        );
        assert_eq!(fx.wallets.status(&wallet), WalletStatus::Active);

        fx.wallets.wallets.get_mut(&wallet).unwrap().balance = 0;
        fx.wallets.suspend(&wallet).unwrap();
        assert!(matches!(
            fx.wallets.suspend(&wallet),
            Err(LedgerError::WalletStatusIncompatible { .. })
        ));
    }

    #[test]
    fn resume_and_delete_transitions() {
        let mut fx = Fixture::new();
        fx.create("w", &["p0", "p1"]).unwrap();
        let wallet = AccountId::new("w");

        assert!(matches!(
            fx.wallets.delete(&mut fx.members, &mut fx.totals, &wallet),
            Err(LedgerError::WalletStatusIncompatible { .. })
        ));

        fx.wallets.suspend(&wallet).unwrap();
        fx.wallets.resume(&wallet).unwrap();
        fx.wallets.suspend(&wallet).unwrap();

        let events = fx
            .wallets
            .delete(&mut fx.members, &mut fx.totals, &wallet)
            .unwrap();
        assert_eq!(events.last().unwrap().name(), "WalletDeleted");
        assert_eq!(fx.wallets.status(&wallet), WalletStatus::Nonexistent);
        assert_eq!(fx.totals.wallet_count(), 0);
        assert!(!fx.members.is_member(&AccountId::new("p0")));

        // The address is reusable.
        fx.create("w", &["p1"]).unwrap();
        assert_eq!(fx.totals.wallet_count(), 1);
    }
}
