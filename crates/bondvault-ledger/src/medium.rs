//! In-memory fungible token bound to a custody account.
//!
//! Implements [`ValueTransfer`] with ERC-20 style balances and allowances:
//! participants `approve` the custody account, which then pulls deposits with
//! `transfer_from` and pays out with `transfer`.

use std::collections::HashMap;

use bondvault_types::{Address, Amount, TransferFailure, ValueTransfer};

/// Token ledger used by simulations and tests.
#[derive(Debug, Clone)]
pub struct InMemoryToken {
    custody: Address,
    balances: HashMap<Address, Amount>,
    allowances: HashMap<(Address, Address), Amount>,
    /// While set, every transfer is rejected with this reason.
    halted: Option<String>,
}

impl InMemoryToken {
    /// Create an empty token whose transfers act for `custody`.
    #[must_use]
    pub fn new(custody: Address) -> Self {
        Self {
            custody,
            balances: HashMap::new(),
            allowances: HashMap::new(),
            halted: None,
        }
    }

    /// Credit `amount` to `to` out of thin air.
    ///
    /// Saturates at `u128::MAX`.
    pub fn mint(&mut self, to: Address, amount: Amount) {
        let entry = self.balances.entry(to).or_default();
        *entry = entry.checked_add(amount).unwrap_or(Amount::new(u128::MAX));
    }

    /// Let `spender` pull up to `amount` from `owner`.
    pub fn approve(&mut self, owner: Address, spender: Address, amount: Amount) {
        self.allowances.insert((owner, spender), amount);
    }

    #[must_use]
    pub fn allowance(&self, owner: Address, spender: Address) -> Amount {
        self.allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default()
    }

    /// Reject every transfer until [`Self::resume`] is called.
    pub fn halt(&mut self, reason: impl Into<String>) {
        self.halted = Some(reason.into());
    }

    pub fn resume(&mut self) {
        self.halted = None;
    }

    fn ensure_running(&self) -> Result<(), TransferFailure> {
        match &self.halted {
            Some(reason) => Err(TransferFailure::Rejected(reason.clone())),
            None => Ok(()),
        }
    }

    fn move_balance(&mut self, from: Address, to: Address, amount: Amount) -> Result<(), TransferFailure> {
        let available = self.balance_of(from);
        let remaining = available
            .checked_sub(amount)
            .ok_or(TransferFailure::InsufficientBalance {
                needed: amount,
                available,
            })?;
        if from == to {
            return Ok(());
        }
        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or_else(|| TransferFailure::Rejected("recipient balance overflow".into()))?;
        self.balances.insert(from, remaining);
        self.balances.insert(to, credited);
        Ok(())
    }
}

impl ValueTransfer for InMemoryToken {
    fn custody(&self) -> Address {
        self.custody
    }

    fn transfer(&mut self, to: Address, amount: Amount) -> Result<(), TransferFailure> {
        self.ensure_running()?;
        self.move_balance(self.custody, to, amount)
    }

    fn transfer_from(
        &mut self,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), TransferFailure> {
        self.ensure_running()?;
        let allowed = self.allowance(from, self.custody);
        let left = allowed
            .checked_sub(amount)
            .ok_or(TransferFailure::InsufficientAllowance {
                needed: amount,
                allowed,
            })?;
        self.move_balance(from, to, amount)?;
        self.allowances.insert((from, self.custody), left);
        Ok(())
    }

    fn balance_of(&self, who: Address) -> Amount {
        self.balances.get(&who).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use bondvault_types::fixtures::address;

    use super::*;

    fn token() -> InMemoryToken {
        let mut t = InMemoryToken::new(address(0xcc));
        t.mint(address(1), Amount::new(100));
        t
    }

    #[test]
    fn transfer_from_requires_allowance() {
        let mut t = token();
        let custody = t.custody();
        let err = t
            .transfer_from(address(1), custody, Amount::new(10))
            .unwrap_err();
        assert!(matches!(err, TransferFailure::InsufficientAllowance { .. }));

        t.approve(address(1), custody, Amount::new(50));
        t.transfer_from(address(1), custody, Amount::new(10)).unwrap();
        assert_eq!(t.balance_of(custody), Amount::new(10));
        assert_eq!(t.balance_of(address(1)), Amount::new(90));
        assert_eq!(t.allowance(address(1), custody), Amount::new(40));
    }

    #[test]
    fn transfer_from_requires_balance() {
        let mut t = token();
        let custody = t.custody();
        t.approve(address(1), custody, Amount::new(500));
        let err = t
            .transfer_from(address(1), custody, Amount::new(200))
            .unwrap_err();
        assert!(matches!(err, TransferFailure::InsufficientBalance { .. }));
        // Nothing moved, allowance intact.
        assert_eq!(t.balance_of(address(1)), Amount::new(100));
        assert_eq!(t.allowance(address(1), custody), Amount::new(500));
    }

    #[test]
    fn transfer_pays_out_of_custody() {
        let mut t = token();
        t.mint(t.custody(), Amount::new(30));
        t.transfer(address(2), Amount::new(30)).unwrap();
        assert_eq!(t.balance_of(address(2)), Amount::new(30));
        assert!(t.transfer(address(2), Amount::new(1)).is_err());
    }

    #[test]
    fn halted_token_rejects_everything() {
        let mut t = token();
        t.mint(t.custody(), Amount::new(30));
        t.halt("paused");
        let err = t.transfer(address(2), Amount::new(1)).unwrap_err();
        assert_eq!(err, TransferFailure::Rejected("paused".into()));
        t.resume();
        assert!(t.transfer(address(2), Amount::new(1)).is_ok());
    }

    #[test]
    fn self_transfer_preserves_balance() {
        let mut t = token();
        t.mint(t.custody(), Amount::new(30));
        let custody = t.custody();
        t.transfer(custody, Amount::new(10)).unwrap();
        assert_eq!(t.balance_of(custody), Amount::new(30));
    }
}
