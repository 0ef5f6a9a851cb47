//! Time-aware withdrawal window.
//!
//! A withdrawal request opens two intervals:
//!
//! ```text
//!   requested_at          + proving_window          + grace_period
//!        │◀──── slashable by a fraud verdict ───▶│               │
//!        │◀──────────────── funds held ─────────────────────────▶│ payable
//! ```
//!
//! The grace period is strictly longer than the proving window so that a
//! verdict landing near the proving boundary is observed before funds leave
//! custody. All comparisons use the caller-supplied clock.

use bondvault_types::{BondError, LedgerConfig, Result};
use chrono::{DateTime, Duration, Utc};

/// Proving window and grace period for timed withdrawals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawalWindow {
    proving_window: Duration,
    grace_period: Duration,
}

impl WithdrawalWindow {
    /// # Errors
    /// Returns [`BondError::Configuration`] unless
    /// `0 < proving_window < grace_period`.
    pub fn new(proving_window: Duration, grace_period: Duration) -> Result<Self> {
        if proving_window <= Duration::zero() || grace_period <= proving_window {
            return Err(BondError::Configuration(format!(
                "grace period ({grace_period}) must exceed a positive proving window ({proving_window})"
            )));
        }
        Ok(Self {
            proving_window,
            grace_period,
        })
    }

    pub fn from_config(config: &LedgerConfig) -> Result<Self> {
        Self::new(config.proving_window(), config.grace_period())
    }

    #[must_use]
    pub fn proving_window(&self) -> Duration {
        self.proving_window
    }

    #[must_use]
    pub fn grace_period(&self) -> Duration {
        self.grace_period
    }

    /// Earliest time a withdrawal requested at `requested_at` can be paid.
    #[must_use]
    pub fn ready_at(&self, requested_at: DateTime<Utc>) -> DateTime<Utc> {
        requested_at
            .checked_add_signed(self.grace_period)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Guard a withdrawal finalization attempt.
    ///
    /// # Errors
    /// Returns [`BondError::TooEarly`] if `now` is before [`Self::ready_at`].
    pub fn check_ready(&self, requested_at: DateTime<Utc>, now: DateTime<Utc>) -> Result<()> {
        let ready_at = self.ready_at(requested_at);
        if now < ready_at {
            return Err(BondError::TooEarly { ready_at });
        }
        Ok(())
    }

    /// Whether a fraud verdict with `dispute_timestamp` reaches a withdrawal
    /// requested at `requested_at`. The upper bound is inclusive.
    #[must_use]
    pub fn slashes(&self, requested_at: DateTime<Utc>, dispute_timestamp: DateTime<Utc>) -> bool {
        let deadline = requested_at
            .checked_add_signed(self.proving_window)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        dispute_timestamp <= deadline
    }
}

#[cfg(test)]
mod tests {
    use bondvault_types::fixtures::ts;

    use super::*;

    fn window() -> WithdrawalWindow {
        WithdrawalWindow::new(Duration::seconds(100), Duration::seconds(250)).unwrap()
    }

    #[test]
    fn rejects_grace_not_above_proving() {
        assert!(WithdrawalWindow::new(Duration::seconds(100), Duration::seconds(100)).is_err());
        assert!(WithdrawalWindow::new(Duration::zero(), Duration::seconds(100)).is_err());
    }

    #[test]
    fn ready_after_grace_period() {
        let w = window();
        let requested = ts(1_000);
        assert_eq!(w.ready_at(requested), ts(1_250));
        assert!(w.check_ready(requested, ts(1_249)).is_err());
        assert!(w.check_ready(requested, ts(1_250)).is_ok());
    }

    #[test]
    fn too_early_reports_ready_time() {
        let err = window().check_ready(ts(1_000), ts(1_001)).unwrap_err();
        assert!(matches!(err, BondError::TooEarly { ready_at } if ready_at == ts(1_250)));
    }

    #[test]
    fn proving_window_bound_is_inclusive() {
        let w = window();
        let requested = ts(1_000);
        assert!(w.slashes(requested, ts(1_000)));
        assert!(w.slashes(requested, ts(1_100)));
        assert!(!w.slashes(requested, ts(1_101)));
    }

    #[test]
    fn verdicts_predating_the_request_slash() {
        assert!(window().slashes(ts(1_000), ts(500)));
    }

    #[test]
    fn defaults_from_config() {
        let cfg = LedgerConfig::new(
            bondvault_types::fixtures::address(1),
            bondvault_types::fixtures::address(2),
        );
        let w = WithdrawalWindow::from_config(&cfg).unwrap();
        assert_eq!(w.proving_window(), Duration::days(7));
        assert_eq!(w.grace_period(), Duration::days(14));
    }
}
