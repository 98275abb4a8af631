//! End-to-end scenarios through the ledger facade.

use pool_ledger::*;

fn id(name: &str) -> AccountId {
    AccountId::new(name)
}

fn ids(names: &[&str]) -> Vec<AccountId> {
    names.iter().map(|n| id(n)).collect()
}

struct Harness {
    ledger: SharedWalletLedger,
    admin: AccountId,
    token: AccountId,
}

impl Harness {
    fn new() -> Self {
        Self::with_config(LedgerConfig::default())
    }

    fn with_config(config: LedgerConfig) -> Self {
        Self {
            ledger: SharedWalletLedger::new(config).unwrap(),
            admin: id("admin"),
            token: id("token-ledger"),
        }
    }

    fn create(&mut self, wallet: &str, participants: &[&str]) {
        self.ledger
            .create_wallet(&self.admin, &id(wallet), &ids(participants))
            .unwrap();
    }

    fn transfer(&mut self, from: &str, to: &str, amount: u64) -> Result<Vec<LedgerEvent>, LedgerError> {
        self.ledger
            .before_transfer(&self.token, &id(from), &id(to), amount)?;
        self.ledger
            .after_transfer(&self.token, &id(from), &id(to), amount)
    }

    fn balance(&self, wallet: &str, participant: &str) -> u64 {
        self.ledger.participant_balance(&id(wallet), &id(participant))
    }
}

#[test]
fn create_wallet_registers_participants_in_order() {
    let mut h = Harness::new();
    h.create("w", &["p0", "p1", "p2"]);

    assert_eq!(h.ledger.participants_of(&id("w")), ids(&["p0", "p1", "p2"]));
    for (index, name) in ["p0", "p1", "p2"].iter().enumerate() {
        assert_eq!(h.ledger.participant_index(&id("w"), &id(name)), Some(index as u16));
        assert_eq!(h.balance("w", name), 0);
        assert!(h.ledger.is_participant(&id("w"), &id(name)));
    }
    assert_eq!(h.ledger.wallet_count(), 1);
    assert_eq!(h.ledger.wallet_status(&id("w")), WalletStatus::Active);
}

#[test]
fn transfer_in_to_empty_wallet_splits_equally() {
    let mut h = Harness::new();
    h.create("w", &["p0", "p1", "p2"]);

    let events = h.transfer("outsider", "w", 100).unwrap();
    assert_eq!(events.len(), 3);
    assert!(events.iter().all(|e| matches!(e, LedgerEvent::TransferIn(_))));

    let shares: Vec<u64> = ["p0", "p1", "p2"].iter().map(|p| h.balance("w", p)).collect();
    assert_eq!(shares, vec![34, 33, 33]);
    assert_eq!(shares.iter().sum::<u64>(), 100);
    assert_eq!(h.ledger.wallet_balance(&id("w")), 100);
    assert_eq!(h.ledger.combined_balance(), 100);
}

#[test]
fn deposit_only_credits_the_depositor() {
    let mut h = Harness::new();
    h.create("w", &["p0", "p1", "p2"]);
    h.transfer("outsider", "w", 30).unwrap();

    let events = h.transfer("p0", "w", 50).unwrap();
    assert_eq!(events.len(), 1);
    let (kind, change) = events[0].balance_change().unwrap();
    assert_eq!(kind, TransferKind::Deposit);
    assert_eq!(change.participant_balance, BalanceDelta::new(10, 60));
    assert_eq!(change.wallet_balance, BalanceDelta::new(30, 80));

    assert_eq!(h.balance("w", "p0"), 60);
    assert_eq!(h.balance("w", "p1"), 10);
    assert_eq!(h.balance("w", "p2"), 10);
}

#[test]
fn removing_a_middle_participant_moves_the_last_one_down() {
    let mut h = Harness::new();
    h.create("w", &["p0", "p1", "p2"]);

    let admin = h.admin.clone();
    h.ledger
        .remove_participants(&admin, &id("w"), &ids(&["p1"]))
        .unwrap();

    assert_eq!(h.ledger.participants_of(&id("w")), ids(&["p0", "p2"]));
    assert_eq!(h.ledger.participant_index(&id("w"), &id("p2")), Some(1));
    assert!(!h.ledger.is_participant(&id("w"), &id("p1")));
    assert!(h.ledger.wallets_of(&id("p1")).is_empty());
}

#[test]
fn suspending_a_funded_wallet_changes_nothing() {
    let mut h = Harness::new();
    h.create("w", &["p0"]);
    h.transfer("p0", "w", 5).unwrap();
    let journaled = h.ledger.events().len();

    let admin = h.admin.clone();
    let err = h.ledger.suspend_wallet(&admin, &id("w")).unwrap_err();
    assert_eq!(
        err,
        LedgerError::WalletBalanceNonzero {
            wallet: id("w"),
            balance: 5
        }
    );
    assert_eq!(h.ledger.wallet_status(&id("w")), WalletStatus::Active);
    assert_eq!(h.ledger.events().len(), journaled);
}

#[test]
fn full_lifecycle_restores_pristine_state() {
    let mut h = Harness::new();
    let admin = h.admin.clone();
    h.create("w", &["p0", "p1"]);
    h.transfer("p0", "w", 40).unwrap();
    h.transfer("w", "p0", 40).unwrap();

    h.ledger.suspend_wallet(&admin, &id("w")).unwrap();
    assert!(matches!(
        h.transfer("p0", "w", 1),
        Err(LedgerError::WalletStatusIncompatible { .. })
    ));
    h.ledger.delete_wallet(&admin, &id("w")).unwrap();

    assert_eq!(h.ledger.wallet_status(&id("w")), WalletStatus::Nonexistent);
    assert_eq!(h.ledger.wallet_count(), 0);
    assert!(h.ledger.participants_of(&id("w")).is_empty());
    assert!(h.ledger.wallets_of(&id("p0")).is_empty());

    // A deleted wallet's address can become a participant, and vice versa.
    h.create("p0", &["w"]);
    h.ledger.check_invariants().unwrap();
    h.ledger.verify_history().unwrap();
}

#[test]
fn transfer_out_spreads_loss_by_weight() {
    let mut h = Harness::new();
    h.create("w", &["p0", "p1", "p2"]);
    h.transfer("p0", "w", 50).unwrap();
    h.transfer("p1", "w", 30).unwrap();
    h.transfer("p2", "w", 20).unwrap();

    h.transfer("w", "merchant", 50).unwrap();
    assert_eq!(h.balance("w", "p0"), 25);
    assert_eq!(h.balance("w", "p1"), 15);
    assert_eq!(h.balance("w", "p2"), 10);

    assert!(matches!(
        h.transfer("w", "merchant", 51),
        Err(LedgerError::WalletBalanceInsufficient { .. })
    ));
}

#[test]
fn participant_in_two_wallets_is_booked_per_wallet() {
    let mut h = Harness::new();
    h.create("w1", &["alice", "bob"]);
    h.create("w2", &["bob", "carol"]);

    h.transfer("bob", "w1", 10).unwrap();
    h.transfer("bob", "w2", 7).unwrap();

    assert_eq!(h.balance("w1", "bob"), 10);
    assert_eq!(h.balance("w2", "bob"), 7);
    assert_eq!(h.ledger.wallets_of(&id("bob")), ids(&["w1", "w2"]));

    let rows = h
        .ledger
        .relationship_overviews(&[RelationshipQuery::participant("bob")])
        .unwrap();
    let balances: Vec<u64> = rows.iter().map(|r| r.participant_balance).collect();
    assert_eq!(balances, vec![10, 7]);
}

#[test]
fn capacity_is_enforced_across_batches() {
    let mut h = Harness::with_config(LedgerConfig {
        max_participants_per_wallet: 3,
        ..LedgerConfig::default()
    });
    let admin = h.admin.clone();
    h.create("w", &["p0", "p1"]);

    let err = h
        .ledger
        .add_participants(&admin, &id("w"), &ids(&["p2", "p3"]))
        .unwrap_err();
    assert!(matches!(err, LedgerError::ParticipantCountExcess { max: 3, .. }));
    assert_eq!(h.ledger.participants_of(&id("w")).len(), 2);

    h.ledger
        .add_participants(&admin, &id("w"), &ids(&["p2"]))
        .unwrap();
    assert_eq!(h.ledger.participants_of(&id("w")).len(), 3);
}

#[test]
fn initiator_cannot_be_removed() {
    let mut h = Harness::new();
    let admin = h.admin.clone();
    h.create("w", &["p0", "p1"]);

    assert!(matches!(
        h.ledger.remove_participants(&admin, &id("w"), &ids(&["p0"])),
        Err(LedgerError::ParticipantUnremovable { .. })
    ));
}

#[test]
fn combined_balance_overflow_is_rejected_without_side_effects() {
    let mut h = Harness::new();
    h.create("w", &["p0"]);
    h.create("v", &["q0", "q1"]);

    h.transfer("p0", "w", u64::MAX).unwrap();
    assert_eq!(h.ledger.combined_balance(), u64::MAX);

    let journaled = h.ledger.events().len();
    let before = h.ledger.state().clone();

    assert_eq!(
        h.transfer("outsider", "v", 1).unwrap_err(),
        LedgerError::CombinedBalanceExcess
    );
    assert_eq!(h.ledger.events().len(), journaled);
    assert_eq!(h.ledger.state(), &before);
    h.ledger.check_invariants().unwrap();
}

#[test]
fn wallet_to_wallet_move_of_full_supply_settles() {
    let mut h = Harness::new();
    h.create("w", &["p0"]);
    h.create("v", &["q0", "q1"]);
    h.transfer("p0", "w", u64::MAX).unwrap();

    let events = h.transfer("w", "v", u64::MAX).unwrap();
    assert!(matches!(events[0], LedgerEvent::TransferOut(_)));

    assert_eq!(h.ledger.wallet_balance(&id("w")), 0);
    assert_eq!(h.ledger.wallet_balance(&id("v")), u64::MAX);
    assert_eq!(h.balance("v", "q0"), 1u64 << 63);
    assert_eq!(h.balance("v", "q1"), (1u64 << 63) - 1);
    assert_eq!(h.ledger.combined_balance(), u64::MAX);
    h.ledger.check_invariants().unwrap();
}

#[test]
fn adding_a_wallet_as_participant_is_rejected() {
    let mut h = Harness::new();
    let admin = h.admin.clone();
    h.create("w", &["p0"]);
    h.create("v", &["q0"]);
    let journaled = h.ledger.events().len();

    assert_eq!(
        h.ledger
            .add_participants(&admin, &id("w"), &ids(&["p1", "v"]))
            .unwrap_err(),
        LedgerError::ParticipantIsSharedWallet(id("v"))
    );
    assert_eq!(
        h.ledger
            .add_participants(&admin, &id("w"), &ids(&["w"]))
            .unwrap_err(),
        LedgerError::ParticipantIsSharedWallet(id("w"))
    );

    assert_eq!(h.ledger.participants_of(&id("w")), ids(&["p0"]));
    assert!(!h.ledger.is_participant(&id("w"), &id("p1")));
    assert_eq!(h.ledger.events().len(), journaled);
    h.ledger.check_invariants().unwrap();
}

#[test]
fn zero_amount_is_a_no_op_even_for_suspended_wallets() {
    let mut h = Harness::new();
    let admin = h.admin.clone();
    h.create("w", &["p0"]);
    h.ledger.suspend_wallet(&admin, &id("w")).unwrap();
    let journaled = h.ledger.events().len();

    assert_eq!(h.transfer("outsider", "w", 0).unwrap(), Vec::new());
    assert!(matches!(
        h.transfer("w", "w", 5),
        Err(LedgerError::WalletStatusIncompatible { .. })
    ));
    assert_eq!(h.ledger.events().len(), journaled);
    assert_eq!(h.ledger.wallet_status(&id("w")), WalletStatus::Suspended);
}
