use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// An account identifier. Opaque to the engine; callers supply whatever
/// addressing scheme their transport uses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(address: &str) -> Self {
        Self(address.to_string())
    }
}

/// Per-account credit balances plus the running total locked in games.
///
/// `deposit` and `withdraw` are the external boundary; `escrow` and
/// `release` are engine-internal and only ever run inside a game
/// transition, so no caller can observe a balance mid-move.
#[derive(Debug, Default)]
pub struct Ledger {
    balances: HashMap<Address, u64>,
    escrowed: u64,
    /// Sum of all balances plus `escrowed`. Capping this at `u64::MAX`
    /// on deposit means no individual balance, escrow move, or payout
    /// can ever overflow.
    total: u64,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance(&self, account: &Address) -> u64 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Total currently locked across all live games.
    pub fn total_escrowed(&self) -> u64 {
        self.escrowed
    }

    /// Credits `amount` to `account`. Returns the new balance.
    pub fn deposit(&mut self, account: &Address, amount: u64) -> Result<u64> {
        if amount == 0 {
            return Err(EngineError::InvalidAmount);
        }
        let total = self
            .total
            .checked_add(amount)
            .ok_or(EngineError::BalanceOverflow)?;
        self.total = total;
        let balance = self.balances.entry(account.clone()).or_insert(0);
        *balance += amount;
        Ok(*balance)
    }

    /// Debits `amount` from `account`. Returns the new balance.
    pub fn withdraw(&mut self, account: &Address, amount: u64) -> Result<u64> {
        let balance = self.balances.entry(account.clone()).or_insert(0);
        if *balance < amount {
            return Err(EngineError::insufficient_funds(amount, *balance));
        }
        *balance -= amount;
        self.total -= amount;
        Ok(*balance)
    }

    /// Moves `amount` from `account`'s balance into game escrow.
    pub(crate) fn escrow(&mut self, account: &Address, amount: u64) -> Result<()> {
        let balance = self.balances.entry(account.clone()).or_insert(0);
        if *balance < amount {
            return Err(EngineError::insufficient_funds(amount, *balance));
        }
        *balance -= amount;
        self.escrowed += amount;
        Ok(())
    }

    /// Returns `amount` of escrowed funds to `account`'s balance.
    pub(crate) fn release(&mut self, account: &Address, amount: u64) {
        debug_assert!(self.escrowed >= amount, "releasing more than is escrowed");
        self.escrowed -= amount;
        *self.balances.entry(account.clone()).or_insert(0) += amount;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Address {
        Address::from("alice")
    }

    fn bob() -> Address {
        Address::from("bob")
    }

    #[test]
    fn deposit_and_withdraw_round_trip() {
        let mut ledger = Ledger::new();
        assert_eq!(ledger.deposit(&alice(), 100).unwrap(), 100);
        assert_eq!(ledger.deposit(&alice(), 50).unwrap(), 150);
        assert_eq!(ledger.withdraw(&alice(), 120).unwrap(), 30);
        assert_eq!(ledger.balance(&alice()), 30);
    }

    #[test]
    fn zero_deposit_is_rejected() {
        let mut ledger = Ledger::new();
        assert!(matches!(
            ledger.deposit(&alice(), 0),
            Err(EngineError::InvalidAmount)
        ));
    }

    #[test]
    fn overdraft_is_rejected_without_mutation() {
        let mut ledger = Ledger::new();
        ledger.deposit(&alice(), 10).unwrap();
        match ledger.withdraw(&alice(), 25) {
            Err(EngineError::InsufficientFunds { need, available }) => {
                assert_eq!(need, 25);
                assert_eq!(available, 10);
            }
            other => panic!("expected InsufficientFunds, got {:?}", other),
        }
        assert_eq!(ledger.balance(&alice()), 10);
    }

    #[test]
    fn escrow_and_release_conserve_funds() {
        let mut ledger = Ledger::new();
        ledger.deposit(&alice(), 100).unwrap();
        ledger.deposit(&bob(), 100).unwrap();

        ledger.escrow(&alice(), 40).unwrap();
        ledger.escrow(&bob(), 40).unwrap();
        assert_eq!(ledger.balance(&alice()), 60);
        assert_eq!(ledger.total_escrowed(), 80);

        // Winner takes the pot.
        ledger.release(&bob(), 80);
        assert_eq!(ledger.balance(&bob()), 140);
        assert_eq!(ledger.total_escrowed(), 0);
        assert_eq!(ledger.balance(&alice()) + ledger.balance(&bob()), 200);
    }

    #[test]
    fn deposit_overflowing_the_ledger_is_rejected() {
        let mut ledger = Ledger::new();
        ledger.deposit(&alice(), u64::MAX).unwrap();
        assert!(matches!(
            ledger.deposit(&alice(), 1),
            Err(EngineError::BalanceOverflow)
        ));
        assert_eq!(ledger.balance(&alice()), u64::MAX);

        // The cap is ledger-wide, so a second account cannot push the
        // total past what payouts can represent.
        assert!(matches!(
            ledger.deposit(&bob(), 1),
            Err(EngineError::BalanceOverflow)
        ));
        assert_eq!(ledger.balance(&bob()), 0);

        // Withdrawals free up room again.
        ledger.withdraw(&alice(), 10).unwrap();
        assert_eq!(ledger.deposit(&bob(), 10).unwrap(), 10);
    }

    #[test]
    fn escrow_requires_sufficient_balance() {
        let mut ledger = Ledger::new();
        ledger.deposit(&alice(), 30).unwrap();
        assert!(ledger.escrow(&alice(), 31).is_err());
        assert_eq!(ledger.balance(&alice()), 30);
        assert_eq!(ledger.total_escrowed(), 0);
    }
}
