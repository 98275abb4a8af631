//! Process-wide counters: live wallet count and combined balance.
//!
//! Both counters fail closed on overflow. The `checked_*` helpers compute a
//! candidate value without touching the counters so callers can validate a
//! whole operation before committing any of it.

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateLedger {
    wallet_count: u32,
    combined_balance: u64,
}

impl AggregateLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wallet_count(&self) -> u32 {
        self.wallet_count
    }

    pub fn combined_balance(&self) -> u64 {
        self.combined_balance
    }

    pub fn checked_wallet_increment(&self) -> Result<u32, LedgerError> {
        self.wallet_count
            .checked_add(1)
            .ok_or(LedgerError::WalletCountExcess)
    }

    pub fn checked_wallet_decrement(&self) -> Result<u32, LedgerError> {
        self.wallet_count.checked_sub(1).ok_or_else(|| {
            LedgerError::InvariantViolation("wallet count underflow".to_string())
        })
    }

    /// Combined balance after `debit` leaves and `credit` arrives.
    pub fn checked_combined(&self, debit: u64, credit: u64) -> Result<u64, LedgerError> {
        let after_debit = self.combined_balance.checked_sub(debit).ok_or_else(|| {
            LedgerError::InvariantViolation(format!(
                "combined balance {} cannot cover debit {}",
                self.combined_balance, debit
            ))
        })?;
        after_debit
            .checked_add(credit)
            .ok_or(LedgerError::CombinedBalanceExcess)
    }

    pub fn increment_wallets(&mut self) -> Result<(), LedgerError> {
        self.wallet_count = self.checked_wallet_increment()?;
        Ok(())
    }

    pub fn decrement_wallets(&mut self) -> Result<(), LedgerError> {
        self.wallet_count = self.checked_wallet_decrement()?;
        Ok(())
    }

    pub fn apply_combined(&mut self, debit: u64, credit: u64) -> Result<(), LedgerError> {
        self.combined_balance = self.checked_combined(debit, credit)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wallet_count_overflow_fails_closed() {
        let mut totals = AggregateLedger {
            wallet_count: u32::MAX,
            combined_balance: 0,
        };
        assert_eq!(
            totals.increment_wallets(),
            Err(LedgerError::WalletCountExcess)
        );
        assert_eq!(totals.wallet_count(), u32::MAX);
    }

    #[test]
    fn combined_balance_overflow_fails_closed() {
        let mut totals = AggregateLedger {
            wallet_count: 1,
            combined_balance: u64::MAX - 5,
        };
        assert_eq!(
            totals.apply_combined(0, 6),
            Err(LedgerError::CombinedBalanceExcess)
        );
        assert_eq!(totals.combined_balance(), u64::MAX - 5);
        // Debit first, so a simultaneous out-and-in movement fits.
        assert!(totals.apply_combined(6, 6).is_ok());
    }

    #[test]
    fn debit_beyond_total_is_an_invariant_violation() {
        let totals = AggregateLedger::new();
        assert!(matches!(
            totals.checked_combined(1, 0),
            Err(LedgerError::InvariantViolation(_))
        ));
    }
}
