//! Bond and stake bookkeeping types.
//!
//! Every participant has a `locked` balance (free to back new stakes or to
//! withdraw immediately) and a `withdrawing` balance (in flight toward a
//! timed withdrawal, exposed to slashing until the proving window passes).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Address, Amount};

/// A participant's collateral position.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Bond {
    /// Available to back new stakes or for immediate withdrawal.
    pub locked: Amount,
    /// Moved out of `locked` by a withdrawal request; paid after the grace period.
    pub withdrawing: Amount,
    /// When the most recent withdrawal request was made.
    pub withdrawal_requested_at: Option<DateTime<Utc>>,
}

impl Bond {
    /// Create a zero bond.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `locked + withdrawing`, or `None` on overflow.
    #[must_use]
    pub fn total(&self) -> Option<Amount> {
        self.locked.checked_add(self.withdrawing)
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.locked.is_zero() && self.withdrawing.is_zero()
    }

    /// A withdrawal request is in flight and has not been slashed.
    #[must_use]
    pub fn has_pending_withdrawal(&self) -> bool {
        self.withdrawal_requested_at.is_some() && !self.withdrawing.is_zero()
    }

    /// A withdrawal was requested but its balance was zeroed by a slash.
    #[must_use]
    pub fn withdrawal_slashed(&self) -> bool {
        self.withdrawal_requested_at.is_some() && self.withdrawing.is_zero()
    }
}

/// Who staked a batch, and for how much.
///
/// `amount` is the required collateral at stake time; refunds and
/// forfeitures use it rather than the current policy value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StakeAssignment {
    pub staker: Address,
    pub amount: Amount,
    pub staked_at: DateTime<Utc>,
}

/// The adjudicator's verdict for a disputed commitment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    /// Fraud proven: the stake is forfeited to the witness providers.
    Fraud,
    /// No fraud: the stake is returned to the staker.
    NoFraud,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fraud => write!(f, "FRAUD"),
            Self::NoFraud => write!(f, "NO_FRAUD"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bond_default_is_zero() {
        let bond = Bond::default();
        assert!(bond.is_zero());
        assert_eq!(bond.total(), Some(Amount::ZERO));
        assert!(!bond.has_pending_withdrawal());
        assert!(!bond.withdrawal_slashed());
    }

    #[test]
    fn pending_versus_slashed() {
        let mut bond = Bond {
            locked: Amount::ZERO,
            withdrawing: Amount::new(10),
            withdrawal_requested_at: Some(Utc::now()),
        };
        assert!(bond.has_pending_withdrawal());
        assert!(!bond.withdrawal_slashed());

        bond.withdrawing = Amount::ZERO;
        assert!(!bond.has_pending_withdrawal());
        assert!(bond.withdrawal_slashed());
    }

    #[test]
    fn bond_serde_roundtrip() {
        let bond = Bond {
            locked: Amount::new(123),
            withdrawing: Amount::new(45),
            withdrawal_requested_at: DateTime::from_timestamp(1_700_000_000, 0),
        };
        let json = serde_json::to_string(&bond).unwrap();
        let back: Bond = serde_json::from_str(&json).unwrap();
        assert_eq!(bond, back);
    }

    #[test]
    fn verdict_display() {
        assert_eq!(Verdict::Fraud.to_string(), "FRAUD");
        assert_eq!(Verdict::NoFraud.to_string(), "NO_FRAUD");
    }
}
