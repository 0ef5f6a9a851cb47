//! Collateral policy: the owner-adjustable required collateral per stake.
//!
//! The value can only ratchet upwards. A new value applies to the next
//! `stake` call; stakes already taken keep the amount they locked.

use bondvault_types::{Address, Amount, BondError, LedgerConfig, Result};
use tracing::{info, warn};

/// Owner-adjustable collateral requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollateralPolicy {
    owner: Address,
    required: Amount,
    minimum: Amount,
}

impl CollateralPolicy {
    /// # Errors
    /// Returns [`BondError::Configuration`] if `initial` is below `minimum`
    /// or zero.
    pub fn new(owner: Address, initial: Amount, minimum: Amount) -> Result<Self> {
        if initial < minimum || initial.is_zero() {
            return Err(BondError::Configuration(format!(
                "initial required collateral {initial} below minimum {minimum}"
            )));
        }
        Ok(Self {
            owner,
            required: initial,
            minimum,
        })
    }

    pub fn from_config(config: &LedgerConfig) -> Result<Self> {
        Self::new(
            config.owner,
            config.required_collateral,
            config.min_required_collateral,
        )
    }

    /// Collateral every new stake must lock.
    #[must_use]
    pub fn required(&self) -> Amount {
        self.required
    }

    #[must_use]
    pub fn minimum(&self) -> Amount {
        self.minimum
    }

    #[must_use]
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Raise the required collateral. Returns the previous value.
    ///
    /// # Errors
    /// - `Unauthorized` if `caller` is not the owner
    /// - `InvalidCollateralChange` if `new_value` is not strictly greater
    pub fn set_required_collateral(&mut self, caller: Address, new_value: Amount) -> Result<Amount> {
        if caller != self.owner {
            warn!(caller = %caller, "Collateral change by non-owner rejected");
            return Err(BondError::Unauthorized {
                operation: "set_required_collateral",
                caller,
            });
        }
        if new_value <= self.required {
            return Err(BondError::InvalidCollateralChange {
                current: self.required,
                proposed: new_value,
            });
        }
        let previous = self.required;
        self.required = new_value;
        info!(from = %previous, to = %new_value, "Required collateral raised");
        Ok(previous)
    }
}
