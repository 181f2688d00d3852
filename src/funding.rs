use std::collections::HashMap;

use crate::types::Identity;

/// External-balance port: answers "does `caller` have at least `amount`
/// available to pay a premium". The ledger never moves the funds — it only
/// refuses policies the oracle says the caller cannot cover.
pub trait FundingOracle {
    fn has_available(&self, caller: &Identity, amount: u64) -> bool;
}

/// Every caller is assumed to hold the same fixed ceiling. This is the
/// default oracle for a bare ledger; real deployments replace it with a
/// balance lookup against the external account system.
#[derive(Debug, Clone, Copy)]
pub struct FixedCeiling(pub u64);

impl FixedCeiling {
    /// Reference ceiling: 1,000,000 units per caller.
    pub const DEFAULT_CEILING: u64 = 1_000_000;

    pub fn reference() -> Self {
        FixedCeiling(Self::DEFAULT_CEILING)
    }
}

impl FundingOracle for FixedCeiling {
    fn has_available(&self, _caller: &Identity, amount: u64) -> bool {
        amount <= self.0
    }
}

/// Per-identity balance table. Used by tests and workloads that want
/// callers with distinct funding capacity; unknown identities have zero.
#[derive(Debug, Default)]
pub struct AccountBook {
    balances: HashMap<Identity, u64>,
}

impl AccountBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn credit(&mut self, who: Identity, amount: u64) {
        *self.balances.entry(who).or_insert(0) += amount;
    }
}

impl FundingOracle for AccountBook {
    fn has_available(&self, caller: &Identity, amount: u64) -> bool {
        self.balances.get(caller).copied().unwrap_or(0) >= amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_ceiling_accepts_up_to_limit() {
        let oracle = FixedCeiling::reference();
        let caller = Identity::from("user1");
        assert!(oracle.has_available(&caller, 0));
        assert!(oracle.has_available(&caller, 1_000_000));
        assert!(!oracle.has_available(&caller, 1_000_001));
    }

    #[test]
    fn fixed_ceiling_ignores_identity() {
        let oracle = FixedCeiling(500);
        assert!(oracle.has_available(&Identity::from("a"), 500));
        assert!(oracle.has_available(&Identity::from("b"), 500));
    }

    #[test]
    fn account_book_tracks_per_identity() {
        let mut book = AccountBook::new();
        book.credit(Identity::from("user1"), 70_000);
        assert!(book.has_available(&Identity::from("user1"), 70_000));
        assert!(!book.has_available(&Identity::from("user1"), 70_001));
        assert!(!book.has_available(&Identity::from("user2"), 1));
    }

    #[test]
    fn account_book_credit_accumulates() {
        let mut book = AccountBook::new();
        book.credit(Identity::from("user1"), 100);
        book.credit(Identity::from("user1"), 200);
        assert!(book.has_available(&Identity::from("user1"), 300));
    }
}
