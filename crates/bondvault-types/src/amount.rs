//! Collateral amounts in integer base units.
//!
//! All ledger arithmetic is integral: payouts are floor-divided and the
//! remainder stays in custody as dust. [`Decimal`] only appears at the edges,
//! when converting human token units from configuration or operator input.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{BondError, Result, constants};

/// A non-negative amount of the collateral token, in base units.
///
/// Serialized as a decimal string so values above 2^53 survive JSON tooling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct Amount(pub u128);

impl Amount {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn new(base_units: u128) -> Self {
        Self(base_units)
    }

    #[must_use]
    pub const fn get(self) -> u128 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    #[must_use]
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    /// `self * numerator / denominator`, rounded down.
    ///
    /// Returns `None` on overflow or when `denominator` is zero.
    #[must_use]
    pub fn mul_div_floor(self, numerator: u64, denominator: u64) -> Option<Self> {
        if denominator == 0 {
            return None;
        }
        self.0
            .checked_mul(u128::from(numerator))
            .map(|n| Self(n / u128::from(denominator)))
    }

    /// Convert whole token units (e.g. `1.5`) into base units.
    ///
    /// # Errors
    /// Returns [`BondError::Configuration`] if `units` is negative, carries
    /// more precision than `decimals`, or does not fit.
    pub fn from_units(units: Decimal, decimals: u32) -> Result<Self> {
        if decimals > constants::MAX_TOKEN_DECIMALS {
            return Err(BondError::Configuration(format!(
                "token decimals {decimals} exceed {}",
                constants::MAX_TOKEN_DECIMALS
            )));
        }
        if units.is_sign_negative() && !units.is_zero() {
            return Err(BondError::Configuration(format!(
                "negative amount {units}"
            )));
        }
        let scale = Decimal::from(10u64.pow(decimals));
        let scaled = units.checked_mul(scale).ok_or(BondError::ArithmeticOverflow)?;
        if !scaled.fract().is_zero() {
            return Err(BondError::Configuration(format!(
                "amount {units} has more than {decimals} decimal places"
            )));
        }
        scaled
            .trunc()
            .to_u128()
            .map(Self)
            .ok_or(BondError::ArithmeticOverflow)
    }

    /// Express this amount in whole token units.
    ///
    /// # Errors
    /// Returns [`BondError::ArithmeticOverflow`] if the value exceeds the
    /// 96-bit mantissa of [`Decimal`].
    pub fn to_units(self, decimals: u32) -> Result<Decimal> {
        let raw = i128::try_from(self.0).map_err(|_| BondError::ArithmeticOverflow)?;
        Decimal::try_from_i128_with_scale(raw, decimals)
            .map(|d| d.normalize())
            .map_err(|_| BondError::ArithmeticOverflow)
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = BondError;

    fn from_str(s: &str) -> Result<Self> {
        s.parse::<u128>()
            .map(Self)
            .map_err(|e| BondError::Serialization(format!("bad amount {s}: {e}")))
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
