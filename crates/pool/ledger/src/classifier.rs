//! Transfer-hook accounting.
//!
//! One notification `(from, to, amount)` is looked at from both sides:
//!
//! | side | wallet status | counterparty is a participant | kind |
//! |------|---------------|-------------------------------|------|
//! | from | Active        | yes                           | Withdrawal |
//! | from | Active        | no                            | TransferOut |
//! | to   | Active        | yes                           | Deposit |
//! | to   | Active        | no                            | TransferIn |
//!
//! A suspended wallet on either side rejects the notification. Both sides are
//! planned against the current state and checked before anything is applied.

use pool_types::{AccountId, BalanceChange, BalanceDelta, LedgerEvent, TransferKind, WalletStatus};
use tracing::{debug, info};

use crate::aggregate::AggregateLedger;
use crate::allocation::ShareAllocator;
use crate::error::LedgerError;
use crate::wallet::WalletRegistry;

/// One wallet-side effect of a token movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movement {
    pub wallet: AccountId,
    pub kind: TransferKind,
    pub counterparty: AccountId,
}

#[derive(Debug, Clone)]
struct Leg {
    participant: AccountId,
    amount: u64,
    before: u64,
    after: u64,
}

/// Fully checked effect on one wallet, ready to apply.
#[derive(Debug, Clone)]
struct SidePlan {
    movement: Movement,
    amount: u64,
    wallet_before: u64,
    legs: Vec<Leg>,
}

#[derive(Debug, Clone, Copy)]
pub struct TransferClassifier {
    allocator: ShareAllocator,
}

impl TransferClassifier {
    pub fn new(allocator: ShareAllocator) -> Self {
        Self { allocator }
    }

    /// Decide which wallet-side effects a movement has.
    pub fn classify(
        &self,
        wallets: &WalletRegistry,
        from: &AccountId,
        to: &AccountId,
    ) -> Result<Vec<Movement>, LedgerError> {
        let outgoing = Self::side(wallets, from, to, TransferKind::Withdrawal, TransferKind::TransferOut)?;
        let incoming = Self::side(wallets, to, from, TransferKind::Deposit, TransferKind::TransferIn)?;

        if from == to {
            // Value never leaves the pool.
            return Ok(Vec::new());
        }
        Ok(outgoing.into_iter().chain(incoming).collect())
    }

    fn side(
        wallets: &WalletRegistry,
        wallet: &AccountId,
        counterparty: &AccountId,
        direct: TransferKind,
        distributed: TransferKind,
    ) -> Result<Option<Movement>, LedgerError> {
        let Some(record) = wallets.get(wallet) else {
            return Ok(None);
        };
        if record.status() != WalletStatus::Active {
            return Err(LedgerError::status_incompatible(
                wallet,
                WalletStatus::Active,
                record.status(),
            ));
        }

        let kind = if record.roster().contains(counterparty) {
            direct
        } else {
            distributed
        };
        Ok(Some(Movement {
            wallet: wallet.clone(),
            kind,
            counterparty: counterparty.clone(),
        }))
    }

    /// Apply an `afterTransfer` notification.
    pub fn settle(
        &self,
        wallets: &mut WalletRegistry,
        totals: &mut AggregateLedger,
        from: &AccountId,
        to: &AccountId,
        amount: u64,
    ) -> Result<Vec<LedgerEvent>, LedgerError> {
        if amount == 0 {
            return Ok(Vec::new());
        }

        let movements = self.classify(wallets, from, to)?;
        let plans = movements
            .into_iter()
            .map(|movement| self.plan(wallets, movement, amount))
            .collect::<Result<Vec<_>, _>>()?;

        let (debit, credit) = plans.iter().fold((0u64, 0u64), |(debit, credit), plan| {
            if plan.movement.kind.is_credit() {
                (debit, credit + plan.amount)
            } else {
                (debit + plan.amount, credit)
            }
        });
        totals.checked_combined(debit, credit)?;

        let mut events = Vec::new();
        for plan in &plans {
            events.extend(Self::apply(wallets, plan)?);
        }
        totals.apply_combined(debit, credit)?;

        Ok(events)
    }

    fn plan(
        &self,
        wallets: &WalletRegistry,
        movement: Movement,
        amount: u64,
    ) -> Result<SidePlan, LedgerError> {
        let record = wallets.require_existing(&movement.wallet)?;
        let roster = record.roster();
        let wallet_before = record.balance();

        let legs = match movement.kind {
            TransferKind::Withdrawal => {
                let before = roster.balance_of(&movement.counterparty);
                if before < amount {
                    return Err(LedgerError::ParticipantBalanceInsufficient {
                        participant: movement.counterparty.clone(),
                        available: before,
                        required: amount,
                    });
                }
                vec![Leg {
                    participant: movement.counterparty.clone(),
                    amount,
                    before,
                    after: before - amount,
                }]
            }
            TransferKind::Deposit => {
                let before = roster.balance_of(&movement.counterparty);
                let after = before
                    .checked_add(amount)
                    .ok_or(LedgerError::CombinedBalanceExcess)?;
                vec![Leg {
                    participant: movement.counterparty.clone(),
                    amount,
                    before,
                    after,
                }]
            }
            TransferKind::TransferOut => {
                if wallet_before < amount {
                    return Err(LedgerError::WalletBalanceInsufficient {
                        wallet: movement.wallet.clone(),
                        available: wallet_before,
                        required: amount,
                    });
                }
                let allocation = self.allocator.allocate(amount, wallet_before, &roster.weights())?;
                let mut legs = Vec::new();
                for (participant, share) in roster.participants().iter().zip(allocation.shares) {
                    if share == 0 {
                        continue;
                    }
                    let before = roster.balance_of(participant);
                    let after = before.checked_sub(share).ok_or_else(|| {
                        LedgerError::SharesCalculationIncorrect {
                            participant: participant.clone(),
                            share,
                            balance: before,
                        }
                    })?;
                    legs.push(Leg {
                        participant: participant.clone(),
                        amount: share,
                        before,
                        after,
                    });
                }
                legs
            }
            TransferKind::TransferIn => {
                let allocation = self.allocator.allocate(amount, wallet_before, &roster.weights())?;
                let mut legs = Vec::new();
                for (participant, share) in roster.participants().iter().zip(allocation.shares) {
                    if share == 0 {
                        continue;
                    }
                    let before = roster.balance_of(participant);
                    let after = before
                        .checked_add(share)
                        .ok_or(LedgerError::CombinedBalanceExcess)?;
                    legs.push(Leg {
                        participant: participant.clone(),
                        amount: share,
                        before,
                        after,
                    });
                }
                legs
            }
        };

        // Participant balances sum to the wallet balance, so debits are covered above.
        if movement.kind.is_credit() {
            wallet_before
                .checked_add(amount)
                .ok_or(LedgerError::CombinedBalanceExcess)?;
        }

        debug!(
            wallet = %movement.wallet,
            kind = %movement.kind,
            counterparty = %movement.counterparty,
            amount,
            legs = legs.len(),
            "Transfer planned"
        );
        Ok(SidePlan {
            movement,
            amount,
            wallet_before,
            legs,
        })
    }

    fn apply(wallets: &mut WalletRegistry, plan: &SidePlan) -> Result<Vec<LedgerEvent>, LedgerError> {
        let record = wallets.require_existing_mut(&plan.movement.wallet)?;
        let credit = plan.movement.kind.is_credit();

        let mut wallet_balance = plan.wallet_before;
        let mut events = Vec::with_capacity(plan.legs.len());
        for leg in &plan.legs {
            let wallet_after = if credit {
                wallet_balance + leg.amount
            } else {
                wallet_balance - leg.amount
            };
            record.roster.set_balance(&leg.participant, leg.after);
            events.push(LedgerEvent::balance(
                plan.movement.kind,
                BalanceChange {
                    wallet: plan.movement.wallet.clone(),
                    participant: leg.participant.clone(),
                    counterparty: plan.movement.counterparty.clone(),
                    amount: leg.amount,
                    participant_balance: BalanceDelta::new(leg.before, leg.after),
                    wallet_balance: BalanceDelta::new(wallet_balance, wallet_after),
                },
            ));
            wallet_balance = wallet_after;
        }
        record.balance = wallet_balance;

        info!(
            wallet = %plan.movement.wallet,
            kind = %plan.movement.kind,
            counterparty = %plan.movement.counterparty,
            amount = plan.amount,
            wallet_balance,
            "Transfer applied"
        );
        Ok(events)
    }
}
