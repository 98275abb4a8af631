//! Proportional share allocation
//!
//! Given an amount `A`, the wallet balance `B` and per-participant weights
//! (their current balances, in roster order):
//!
//! - `B > 0`: participant `i` receives `floor(A·w_i / B)`, rounded down to a
//!   multiple of the accuracy factor. Zero-weight participants receive 0.
//! - `B == 0`: every participant receives `floor(A / N)`, rounded the same way.
//!
//! The rounding shortfall `A − Σ share_i` is then assigned to a single
//! participant, so `Σ share_i == A` always holds:
//!
//! - `B > 0`: among non-zero-weight holders, the one with the strictly
//!   largest share, scanning from the highest index down. On ties the higher
//!   index keeps it. Zero-weight holders never receive the remainder.
//! - `B == 0`: the initiator (index 0).

use serde::Serialize;

use crate::error::LedgerError;

/// Result of one allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Allocation {
    /// Shares in roster order.
    pub shares: Vec<u64>,
    /// Rounding shortfall folded into one share.
    pub remainder: u64,
    /// Index that received the shortfall, if any.
    pub remainder_recipient: Option<usize>,
}

impl Allocation {
    pub fn total(&self) -> u128 {
        self.shares.iter().map(|s| *s as u128).sum()
    }
}

/// Pure share calculator. Never touches ledger state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShareAllocator {
    accuracy_factor: u64,
}

impl Default for ShareAllocator {
    fn default() -> Self {
        Self::new(1)
    }
}

impl ShareAllocator {
    pub fn new(accuracy_factor: u64) -> Self {
        Self {
            accuracy_factor: accuracy_factor.max(1),
        }
    }

    fn round_down(&self, value: u64) -> u64 {
        value - value % self.accuracy_factor
    }

    /// Split `amount` across `weights`, which must sum to `wallet_balance`.
    pub fn allocate(
        &self,
        amount: u64,
        wallet_balance: u64,
        weights: &[u64],
    ) -> Result<Allocation, LedgerError> {
        if weights.is_empty() {
            return Err(LedgerError::InvariantViolation(
                "cannot allocate across an empty roster".to_string(),
            ));
        }

        let mut shares = vec![0u64; weights.len()];
        let recipient = if wallet_balance > 0 {
            let total: u128 = weights.iter().map(|w| *w as u128).sum();
            if total != wallet_balance as u128 {
                return Err(LedgerError::InvariantViolation(format!(
                    "weights sum to {total}, wallet balance is {wallet_balance}"
                )));
            }

            for (share, weight) in shares.iter_mut().zip(weights) {
                if *weight == 0 {
                    continue;
                }
                let raw = (amount as u128 * *weight as u128) / wallet_balance as u128;
                // weight <= balance, so raw <= amount
                let raw = u64::try_from(raw).map_err(|_| {
                    LedgerError::InvariantViolation("share exceeds u64 range".to_string())
                })?;
                *share = self.round_down(raw);
            }

            let mut best: Option<usize> = None;
            for index in (0..weights.len()).rev() {
                if weights[index] == 0 {
                    continue;
                }
                match best {
                    Some(current) if shares[index] <= shares[current] => {}
                    _ => best = Some(index),
                }
            }
            best
        } else {
            let raw = amount / weights.len() as u64;
            let equal = self.round_down(raw);
            shares.iter_mut().for_each(|share| *share = equal);
            Some(0)
        };

        let distributed: u128 = shares.iter().map(|s| *s as u128).sum();
        let remainder = (amount as u128)
            .checked_sub(distributed)
            .and_then(|r| u64::try_from(r).ok())
            .ok_or_else(|| {
                LedgerError::InvariantViolation(format!(
                    "distributed {distributed} exceeds amount {amount}"
                ))
            })?;

        let remainder_recipient = if remainder > 0 { recipient } else { None };
        if let Some(index) = remainder_recipient {
            shares[index] += remainder;
        }

        Ok(Allocation {
            shares,
            remainder,
            remainder_recipient,
        })
    }
}
