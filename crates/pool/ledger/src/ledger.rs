//! The shared-wallet ledger facade.
//!
//! [`SharedWalletLedger`] owns all state and is the only entry point for
//! mutations. Every operation is checked by the [`AccessPolicy`], validated in
//! full before any change is applied, and its notifications are journaled on
//! success. A rejected operation leaves state and journal untouched.

use pool_types::{AccountId, LedgerEvent, RelationshipOverview, RelationshipQuery, WalletStatus};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::access::{AccessPolicy, Action, RoleTable};
use crate::aggregate::AggregateLedger;
use crate::allocation::ShareAllocator;
use crate::classifier::TransferClassifier;
use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::history::BalanceHistory;
use crate::journal::{EventEnvelope, EventJournal};
use crate::participant::ParticipantRegistry;
use crate::query::PairNormalizer;
use crate::snapshot::{LedgerSnapshot, SNAPSHOT_VERSION};
use crate::wallet::{WalletRecord, WalletRegistry};

/// Everything the ledger persists apart from its journal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState {
    pub(crate) wallets: WalletRegistry,
    pub(crate) members: ParticipantRegistry,
    pub(crate) totals: AggregateLedger,
}

impl LedgerState {
    pub fn wallets(&self) -> &WalletRegistry {
        &self.wallets
    }

    pub fn members(&self) -> &ParticipantRegistry {
        &self.members
    }

    pub fn totals(&self) -> &AggregateLedger {
        &self.totals
    }

    /// Check every global invariant.
    pub fn check_invariants(&self, config: &LedgerConfig) -> Result<(), LedgerError> {
        let mut combined: u128 = 0;
        let mut expected_members: BTreeMap<AccountId, BTreeSet<AccountId>> = BTreeMap::new();

        for (wallet, record) in self.wallets.iter() {
            let roster = record.roster();
            roster.check_consistency()?;

            if !record.status().exists() {
                return Err(LedgerError::InvariantViolation(format!(
                    "wallet {wallet} is stored but nonexistent"
                )));
            }
            if roster.total_balance() != record.balance() as u128 {
                return Err(LedgerError::InvariantViolation(format!(
                    "wallet {wallet} balance {} differs from participant sum {}",
                    record.balance(),
                    roster.total_balance()
                )));
            }
            if roster.len() > config.max_participants_per_wallet as usize {
                return Err(LedgerError::InvariantViolation(format!(
                    "wallet {wallet} holds {} participants, limit is {}",
                    roster.len(),
                    config.max_participants_per_wallet
                )));
            }
            if record.status() == WalletStatus::Active && roster.is_empty() {
                return Err(LedgerError::InvariantViolation(format!(
                    "active wallet {wallet} has no participants"
                )));
            }

            for participant in roster.participants() {
                if self.wallets.is_wallet(participant) {
                    return Err(LedgerError::InvariantViolation(format!(
                        "wallet {participant} is a participant of {wallet}"
                    )));
                }
                expected_members
                    .entry(participant.clone())
                    .or_default()
                    .insert(wallet.clone());
            }
            combined += record.balance() as u128;
        }

        if combined != self.totals.combined_balance() as u128 {
            return Err(LedgerError::InvariantViolation(format!(
                "combined balance {} differs from wallet sum {combined}",
                self.totals.combined_balance()
            )));
        }
        if self.wallets.len() != self.totals.wallet_count() as usize {
            return Err(LedgerError::InvariantViolation(format!(
                "wallet count {} differs from {} stored wallets",
                self.totals.wallet_count(),
                self.wallets.len()
            )));
        }
        if &expected_members != self.members.memberships() {
            return Err(LedgerError::InvariantViolation(
                "participant index out of step with wallet rosters".to_string(),
            ));
        }
        Ok(())
    }
}

pub struct SharedWalletLedger {
    config: LedgerConfig,
    policy: Arc<dyn AccessPolicy>,
    classifier: TransferClassifier,
    state: LedgerState,
    journal: EventJournal,
}

impl std::fmt::Debug for SharedWalletLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedWalletLedger")
            .field("config", &self.config)
            .field("wallets", &self.state.wallets.len())
            .field("journal", &self.journal.len())
            .finish()
    }
}

impl SharedWalletLedger {
    /// Empty ledger guarded by a [`RoleTable`] built from `config`.
    pub fn new(config: LedgerConfig) -> Result<Self, LedgerError> {
        let policy = Arc::new(RoleTable::from_config(&config));
        Self::with_policy(config, policy)
    }

    /// Empty ledger guarded by a caller-supplied policy.
    pub fn with_policy(config: LedgerConfig, policy: Arc<dyn AccessPolicy>) -> Result<Self, LedgerError> {
        config.validate()?;
        let classifier = TransferClassifier::new(ShareAllocator::new(config.accuracy_factor));
        info!(
            max_participants = config.max_participants_per_wallet,
            accuracy_factor = config.accuracy_factor,
            token_ledger = %config.token_ledger,
            "Shared wallet ledger initialized"
        );
        Ok(Self {
            config,
            policy,
            classifier,
            state: LedgerState::default(),
            journal: EventJournal::new(),
        })
    }

    /// Restore a ledger, re-verifying the journal chain, the invariants and
    /// that replaying the journal reproduces the stored balances.
    pub fn from_snapshot(
        config: LedgerConfig,
        policy: Arc<dyn AccessPolicy>,
        snapshot: LedgerSnapshot,
    ) -> Result<Self, LedgerError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(LedgerError::Snapshot(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }
        let mut ledger = Self::with_policy(config, policy)?;
        ledger.journal = EventJournal::from_entries(snapshot.journal)?;
        ledger.state = snapshot.state;
        ledger.check_invariants()?;
        ledger.verify_history()?;

        info!(
            wallets = ledger.state.wallets.len(),
            entries = ledger.journal.len(),
            "Ledger restored from snapshot"
        );
        Ok(ledger)
    }

    pub fn to_snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot::new(self.state.clone(), self.journal.entries().to_vec())
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn journal(&self) -> &EventJournal {
        &self.journal
    }

    pub fn events(&self) -> &[EventEnvelope] {
        self.journal.entries()
    }

    fn authorize(&self, caller: &AccountId, action: Action) -> Result<(), LedgerError> {
        self.policy.authorize(caller, action)
    }

    fn record(&mut self, operation: &str, events: Vec<LedgerEvent>) -> Result<Vec<LedgerEvent>, LedgerError> {
        if !events.is_empty() {
            self.journal.append_all(operation, events.clone())?;
        }
        Ok(events)
    }

    // ═══════════════════════════════════════════════════════════════════
    // ADMINISTRATION
    // ═══════════════════════════════════════════════════════════════════

    pub fn create_wallet(
        &mut self,
        caller: &AccountId,
        wallet: &AccountId,
        participants: &[AccountId],
    ) -> Result<Vec<LedgerEvent>, LedgerError> {
        self.authorize(caller, Action::Administer)?;
        let LedgerState {
            wallets,
            members,
            totals,
        } = &mut self.state;
        let events = wallets
            .create(members, totals, &self.config, wallet, participants)
            .map_err(|e| rejected("create_wallet", e))?;
        self.record("create_wallet", events)
    }

    pub fn suspend_wallet(&mut self, caller: &AccountId, wallet: &AccountId) -> Result<Vec<LedgerEvent>, LedgerError> {
        self.authorize(caller, Action::Administer)?;
        let events = self
            .state
            .wallets
            .suspend(wallet)
            .map_err(|e| rejected("suspend_wallet", e))?;
        self.record("suspend_wallet", events)
    }

    pub fn resume_wallet(&mut self, caller: &AccountId, wallet: &AccountId) -> Result<Vec<LedgerEvent>, LedgerError> {
        self.authorize(caller, Action::Administer)?;
        let events = self
            .state
            .wallets
            .resume(wallet)
            .map_err(|e| rejected("resume_wallet", e))?;
        self.record("resume_wallet", events)
    }

    pub fn delete_wallet(&mut self, caller: &AccountId, wallet: &AccountId) -> Result<Vec<LedgerEvent>, LedgerError> {
        self.authorize(caller, Action::Administer)?;
        let LedgerState {
            wallets,
            members,
            totals,
        } = &mut self.state;
        let events = wallets
            .delete(members, totals, wallet)
            .map_err(|e| rejected("delete_wallet", e))?;
        self.record("delete_wallet", events)
    }

    pub fn add_participants(
        &mut self,
        caller: &AccountId,
        wallet: &AccountId,
        participants: &[AccountId],
    ) -> Result<Vec<LedgerEvent>, LedgerError> {
        self.authorize(caller, Action::Administer)?;
        let LedgerState { wallets, members, .. } = &mut self.state;
        let events = members
            .add_participants(wallets, &self.config, wallet, participants)
            .map_err(|e| rejected("add_participants", e))?;
        self.record("add_participants", events)
    }

    pub fn remove_participants(
        &mut self,
        caller: &AccountId,
        wallet: &AccountId,
        participants: &[AccountId],
    ) -> Result<Vec<LedgerEvent>, LedgerError> {
        self.authorize(caller, Action::Administer)?;
        let LedgerState { wallets, members, .. } = &mut self.state;
        let events = members
            .remove_participants(wallets, wallet, participants)
            .map_err(|e| rejected("remove_participants", e))?;
        self.record("remove_participants", events)
    }

    // ═══════════════════════════════════════════════════════════════════
    // TRANSFER HOOK
    // ═══════════════════════════════════════════════════════════════════

    /// Pre-transfer notification. Only the caller is checked.
    pub fn before_transfer(
        &self,
        caller: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: u64,
    ) -> Result<(), LedgerError> {
        self.authorize(caller, Action::TransferHook)?;
        debug!(from = %from, to = %to, amount, "Before-transfer hook");
        Ok(())
    }

    /// Post-transfer notification: book the movement against any wallet involved.
    pub fn after_transfer(
        &mut self,
        caller: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: u64,
    ) -> Result<Vec<LedgerEvent>, LedgerError> {
        self.authorize(caller, Action::TransferHook)?;
        let LedgerState { wallets, totals, .. } = &mut self.state;
        let events = self
            .classifier
            .settle(wallets, totals, from, to, amount)
            .map_err(|e| rejected("after_transfer", e))?;
        self.record("after_transfer", events)
    }

    // ═══════════════════════════════════════════════════════════════════
    // QUERIES
    // ═══════════════════════════════════════════════════════════════════

    pub fn wallet(&self, wallet: &AccountId) -> Option<&WalletRecord> {
        self.state.wallets.get(wallet)
    }

    pub fn wallet_status(&self, wallet: &AccountId) -> WalletStatus {
        self.state.wallets.status(wallet)
    }

    pub fn wallet_balance(&self, wallet: &AccountId) -> u64 {
        self.wallet(wallet).map(|record| record.balance()).unwrap_or(0)
    }

    pub fn is_participant(&self, wallet: &AccountId, participant: &AccountId) -> bool {
        self.wallet(wallet)
            .is_some_and(|record| record.roster().contains(participant))
    }

    /// Zero for unknown wallets and unregistered participants.
    pub fn participant_balance(&self, wallet: &AccountId, participant: &AccountId) -> u64 {
        self.wallet(wallet)
            .map(|record| record.roster().balance_of(participant))
            .unwrap_or(0)
    }

    pub fn participant_index(&self, wallet: &AccountId, participant: &AccountId) -> Option<u16> {
        self.wallet(wallet)
            .and_then(|record| record.roster().state(participant))
            .map(|state| state.index)
    }

    pub fn wallets_of(&self, participant: &AccountId) -> Vec<AccountId> {
        self.state.members.wallets_of(participant)
    }

    /// Participants in index order; empty for unknown wallets.
    pub fn participants_of(&self, wallet: &AccountId) -> Vec<AccountId> {
        self.wallet(wallet)
            .map(|record| record.roster().participants().to_vec())
            .unwrap_or_default()
    }

    pub fn wallet_count(&self) -> u32 {
        self.state.totals.wallet_count()
    }

    pub fn combined_balance(&self) -> u64 {
        self.state.totals.combined_balance()
    }

    pub fn relationship_overviews(
        &self,
        queries: &[RelationshipQuery],
    ) -> Result<Vec<RelationshipOverview>, LedgerError> {
        PairNormalizer::new(&self.state.wallets, &self.state.members).overviews(queries)
    }

    // ═══════════════════════════════════════════════════════════════════
    // AUDIT
    // ═══════════════════════════════════════════════════════════════════

    pub fn check_invariants(&self) -> Result<(), LedgerError> {
        self.state.check_invariants(&self.config)
    }

    /// Rebuild balances from the journal.
    pub fn replay(&self) -> Result<BalanceHistory, LedgerError> {
        BalanceHistory::replay(self.journal.entries())
    }

    /// Replay the journal and compare it with the live state.
    pub fn verify_history(&self) -> Result<BalanceHistory, LedgerError> {
        let history = self.replay()?;
        let sequence = history.applied();

        if history.wallet_count() != self.state.wallets.len() {
            return Err(LedgerError::HistoryDiscontinuity {
                sequence,
                message: format!(
                    "journal replays {} wallets, state holds {}",
                    history.wallet_count(),
                    self.state.wallets.len()
                ),
            });
        }
        for (wallet, record) in self.state.wallets.iter() {
            let replayed = history.wallet(wallet).ok_or_else(|| LedgerError::HistoryDiscontinuity {
                sequence,
                message: format!("wallet {wallet} missing from journal"),
            })?;
            let roster = record.roster();
            let balances_match = roster
                .participants()
                .iter()
                .all(|p| replayed.balances.get(p).copied() == Some(roster.balance_of(p)));
            if replayed.status != record.status()
                || replayed.balance != record.balance()
                || replayed.participants.as_slice() != roster.participants()
                || !balances_match
            {
                return Err(LedgerError::HistoryDiscontinuity {
                    sequence,
                    message: format!("wallet {wallet} differs from its journal"),
                });
            }
        }
        if history.combined_balance() != self.combined_balance() {
            return Err(LedgerError::HistoryDiscontinuity {
                sequence,
                message: "combined balance differs from journal".to_string(),
            });
        }
        Ok(history)
    }
}

fn rejected(operation: &str, error: LedgerError) -> LedgerError {
    warn!(operation, error = %error, kind = ?error.kind(), "Operation rejected");
    error
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> AccountId {
        AccountId::new(name)
    }

    fn ids(names: &[&str]) -> Vec<AccountId> {
        names.iter().map(|n| id(n)).collect()
    }

    fn ledger() -> SharedWalletLedger {
        SharedWalletLedger::new(LedgerConfig::default()).unwrap()
    }

    #[test]
    fn administrative_calls_require_role() {
        let mut ledger = ledger();
        let err = ledger
            .create_wallet(&id("mallory"), &id("w"), &ids(&["p0"]))
            .unwrap_err();
        assert!(matches!(err, LedgerError::Unauthorized { action: Action::Administer, .. }));
        assert_eq!(ledger.wallet_count(), 0);
        assert!(ledger.events().is_empty());
    }

    #[test]
    fn hook_requires_token_ledger() {
        let mut ledger = ledger();
        ledger.create_wallet(&id("admin"), &id("w"), &ids(&["p0"])).unwrap();

        assert!(matches!(
            ledger.after_transfer(&id("admin"), &id("p0"), &id("w"), 10),
            Err(LedgerError::Unauthorized { action: Action::TransferHook, .. })
        ));
        assert!(ledger.before_transfer(&id("token-ledger"), &id("p0"), &id("w"), 10).is_ok());
        ledger
            .after_transfer(&id("token-ledger"), &id("p0"), &id("w"), 10)
            .unwrap();
        assert_eq!(ledger.participant_balance(&id("w"), &id("p0")), 10);
    }

    #[test]
    fn failed_operations_journal_nothing() {
        let mut ledger = ledger();
        ledger.create_wallet(&id("admin"), &id("w"), &ids(&["p0"])).unwrap();
        let before = ledger.events().len();

        assert!(ledger.create_wallet(&id("admin"), &id("w"), &ids(&["p1"])).is_err());
        assert!(ledger
            .after_transfer(&id("token-ledger"), &id("w"), &id("x"), 1)
            .is_err());
        assert_eq!(ledger.events().len(), before);
    }

    #[test]
    fn journal_replays_to_live_state() {
        let mut ledger = ledger();
        let admin = id("admin");
        let token = id("token-ledger");
        ledger.create_wallet(&admin, &id("w"), &ids(&["p0", "p1", "p2"])).unwrap();
        ledger.after_transfer(&token, &id("x"), &id("w"), 100).unwrap();
        ledger.after_transfer(&token, &id("w"), &id("p1"), 33).unwrap();
        ledger.remove_participants(&admin, &id("w"), &ids(&["p1"])).unwrap();

        let history = ledger.verify_history().unwrap();
        assert_eq!(history.wallet_balance(&id("w")), 67);
        ledger.check_invariants().unwrap();
    }

    #[test]
    fn snapshot_restores_and_detects_tampering() {
        let mut ledger = ledger();
        ledger.create_wallet(&id("admin"), &id("w"), &ids(&["p0"])).unwrap();
        ledger
            .after_transfer(&id("token-ledger"), &id("p0"), &id("w"), 5)
            .unwrap();

        let policy: Arc<dyn AccessPolicy> = Arc::new(RoleTable::from_config(&LedgerConfig::default()));
        let restored =
            SharedWalletLedger::from_snapshot(LedgerConfig::default(), policy.clone(), ledger.to_snapshot()).unwrap();
        assert_eq!(restored.wallet_balance(&id("w")), 5);
        assert_eq!(restored.events().len(), ledger.events().len());

        let mut tampered = ledger.to_snapshot();
        tampered.state.totals = AggregateLedger::default();
        assert!(matches!(
            SharedWalletLedger::from_snapshot(LedgerConfig::default(), policy, tampered),
            Err(LedgerError::InvariantViolation(_))
        ));
    }

    #[test]
    fn overviews_go_through_the_normalizer() {
        let mut ledger = ledger();
        ledger.create_wallet(&id("admin"), &id("w"), &ids(&["p0", "p1"])).unwrap();

        let rows = ledger
            .relationship_overviews(&[RelationshipQuery::wallet("w")])
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].participant_index, Some(1));
        assert!(ledger
            .relationship_overviews(&[RelationshipQuery::default()])
            .is_err());
    }
}
