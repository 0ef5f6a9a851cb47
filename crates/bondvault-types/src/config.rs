//! Ledger configuration.
//!
//! Loaded from JSON. Amounts are base-unit strings; operators who think in
//! whole tokens can use [`LedgerConfig::with_required_units`].

use std::path::Path;

use chrono::Duration;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Address, Amount, BondError, Result, constants};

/// Upper bound for configured windows (100 years), keeps durations in range.
const MAX_WINDOW_SECS: u64 = 100 * 365 * 24 * 60 * 60;

/// Configuration for one BondVault ledger instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerConfig {
    /// May raise the required collateral.
    pub owner: Address,
    /// Account holding all bonded value in the transfer medium.
    pub custody: Address,
    /// Resolver name of the party allowed to call `stake`.
    #[serde(default = "default_admission_authority_name")]
    pub admission_authority_name: String,
    /// Resolver name of the party allowed to call `finalize`.
    #[serde(default = "default_adjudicator_name")]
    pub adjudicator_name: String,
    /// Collateral locked per staked batch.
    #[serde(default = "default_required_collateral")]
    pub required_collateral: Amount,
    /// The initial required collateral may not be set below this.
    #[serde(default = "default_required_collateral")]
    pub min_required_collateral: Amount,
    /// Window after a withdrawal request in which a fraud verdict slashes it.
    #[serde(default = "default_proving_window_secs")]
    pub proving_window_secs: u64,
    /// Wait before a withdrawal may be finalized. Strictly above the proving window.
    #[serde(default = "default_grace_period_secs")]
    pub grace_period_secs: u64,
    /// Decimals of the collateral token, for unit conversion only.
    #[serde(default = "default_token_decimals")]
    pub token_decimals: u32,
}

fn default_admission_authority_name() -> String {
    constants::ADMISSION_AUTHORITY_NAME.to_string()
}

fn default_adjudicator_name() -> String {
    constants::ADJUDICATOR_NAME.to_string()
}

fn default_required_collateral() -> Amount {
    Amount::new(constants::MIN_REQUIRED_COLLATERAL)
}

fn default_proving_window_secs() -> u64 {
    constants::DEFAULT_PROVING_WINDOW_SECS
}

fn default_grace_period_secs() -> u64 {
    constants::DEFAULT_GRACE_PERIOD_SECS
}

fn default_token_decimals() -> u32 {
    constants::DEFAULT_TOKEN_DECIMALS
}

fn secs_to_duration(secs: u64) -> Duration {
    Duration::seconds(i64::try_from(secs.min(MAX_WINDOW_SECS)).unwrap_or(i64::MAX / 1000))
}

impl LedgerConfig {
    /// Configuration with default windows and collateral.
    #[must_use]
    pub fn new(owner: Address, custody: Address) -> Self {
        Self {
            owner,
            custody,
            admission_authority_name: default_admission_authority_name(),
            adjudicator_name: default_adjudicator_name(),
            required_collateral: default_required_collateral(),
            min_required_collateral: default_required_collateral(),
            proving_window_secs: default_proving_window_secs(),
            grace_period_secs: default_grace_period_secs(),
            token_decimals: default_token_decimals(),
        }
    }

    /// Set the required collateral in whole token units.
    ///
    /// # Errors
    /// Returns [`BondError::Configuration`] if `units` cannot be expressed
    /// in base units at `token_decimals`.
    pub fn with_required_units(mut self, units: Decimal) -> Result<Self> {
        self.required_collateral = Amount::from_units(units, self.token_decimals)?;
        Ok(self)
    }

    /// Check internal consistency.
    ///
    /// # Errors
    /// Returns [`BondError::Configuration`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.proving_window_secs == 0 {
            return Err(BondError::Configuration(
                "proving_window_secs must be positive".into(),
            ));
        }
        if self.grace_period_secs <= self.proving_window_secs {
            return Err(BondError::Configuration(format!(
                "grace_period_secs ({}) must exceed proving_window_secs ({})",
                self.grace_period_secs, self.proving_window_secs
            )));
        }
        if self.grace_period_secs > MAX_WINDOW_SECS {
            return Err(BondError::Configuration(format!(
                "grace_period_secs ({}) exceeds {MAX_WINDOW_SECS}",
                self.grace_period_secs
            )));
        }
        if self.required_collateral < self.min_required_collateral {
            return Err(BondError::Configuration(format!(
                "required_collateral ({}) below minimum ({})",
                self.required_collateral, self.min_required_collateral
            )));
        }
        if self.required_collateral.is_zero() {
            return Err(BondError::Configuration(
                "required_collateral must be positive".into(),
            ));
        }
        if self.token_decimals > constants::MAX_TOKEN_DECIMALS {
            return Err(BondError::Configuration(format!(
                "token_decimals ({}) exceeds {}",
                self.token_decimals,
                constants::MAX_TOKEN_DECIMALS
            )));
        }
        if self.admission_authority_name.is_empty() || self.adjudicator_name.is_empty() {
            return Err(BondError::Configuration(
                "authority names must not be empty".into(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn proving_window(&self) -> Duration {
        secs_to_duration(self.proving_window_secs)
    }

    #[must_use]
    pub fn grace_period(&self) -> Duration {
        secs_to_duration(self.grace_period_secs)
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
