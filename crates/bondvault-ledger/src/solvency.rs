//! Solvency invariant checker.
//!
//! Mathematical invariant enforced after every operation:
//! ```text
//! Σ(locked + withdrawing) + Σ(at stake) + Σ(undistributed pools) + slashed reserve
//!     == Σ(deposits) - Σ(withdrawals) - Σ(claims)
//! ```
//! and the custody balance in the transfer medium must cover the left-hand
//! side. If either breaks, value was created or lost somewhere.

use bondvault_types::{Amount, BondError, Result};
use serde::{Deserialize, Serialize};

/// Running totals of value entering and leaving custody.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolvencyTracker {
    deposited: Amount,
    withdrawn: Amount,
    claimed: Amount,
}

impl SolvencyTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted totals.
    #[must_use]
    pub fn from_totals(deposited: Amount, withdrawn: Amount, claimed: Amount) -> Self {
        Self {
            deposited,
            withdrawn,
            claimed,
        }
    }

    pub fn record_deposit(&mut self, amount: Amount) -> Result<()> {
        self.deposited = self
            .deposited
            .checked_add(amount)
            .ok_or(BondError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Record value leaving custody to a participant (immediate or timed).
    pub fn record_withdrawal(&mut self, amount: Amount) -> Result<()> {
        self.withdrawn = self
            .withdrawn
            .checked_add(amount)
            .ok_or(BondError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Record a reward paid out of a forfeited pool.
    pub fn record_claim(&mut self, amount: Amount) -> Result<()> {
        self.claimed = self
            .claimed
            .checked_add(amount)
            .ok_or(BondError::ArithmeticOverflow)?;
        Ok(())
    }

    #[must_use]
    pub fn total_deposited(&self) -> Amount {
        self.deposited
    }

    #[must_use]
    pub fn total_withdrawn(&self) -> Amount {
        self.withdrawn
    }

    #[must_use]
    pub fn total_claimed(&self) -> Amount {
        self.claimed
    }

    /// `deposits - withdrawals - claims`, or `None` if more left than entered.
    #[must_use]
    pub fn expected_liabilities(&self) -> Option<Amount> {
        self.deposited
            .checked_sub(self.withdrawn)?
            .checked_sub(self.claimed)
    }

    /// Verify that the ledger's bookkeeping matches the flow totals and is
    /// backed by custody.
    ///
    /// # Errors
    /// Returns [`BondError::SolvencyViolation`] on any mismatch.
    pub fn verify(&self, actual_liabilities: Amount, custody_balance: Amount) -> Result<()> {
        let expected = self
            .expected_liabilities()
            .ok_or_else(|| BondError::SolvencyViolation {
                reason: format!(
                    "outflows exceed deposits (deposits={}, withdrawals={}, claims={})",
                    self.deposited, self.withdrawn, self.claimed
                ),
            })?;
        if actual_liabilities != expected {
            return Err(BondError::SolvencyViolation {
                reason: format!(
                    "liabilities {actual_liabilities} != expected {expected} \
                     (deposits={}, withdrawals={}, claims={})",
                    self.deposited, self.withdrawn, self.claimed
                ),
            });
        }
        if custody_balance < actual_liabilities {
            return Err(BondError::SolvencyViolation {
                reason: format!(
                    "custody balance {custody_balance} does not back liabilities {actual_liabilities}"
                ),
            });
        }
        Ok(())
    }
}
