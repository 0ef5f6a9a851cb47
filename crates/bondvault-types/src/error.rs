//! Error types for the BondVault ledger.
//!
//! All errors use the `BV_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Authorization errors
//! - 2xx: Balance errors
//! - 3xx: Collateral policy errors
//! - 4xx: Stake / finalization errors
//! - 5xx: Withdrawal errors
//! - 6xx: Dispute reward errors
//! - 7xx: Value-transfer errors
//! - 8xx: Invariant errors
//! - 9xx: General / internal errors

use thiserror::Error;

use crate::{Address, Amount, BatchIndex, CommitmentId};

/// Central error enum for all BondVault operations.
///
/// A failed operation never mutates ledger state.
#[derive(Debug, Error)]
pub enum BondError {
    // =================================================================
    // Authorization Errors (1xx)
    // =================================================================
    /// The caller is not the party authorized for this operation, or the
    /// authorized party could not be resolved.
    #[error("BV_ERR_100: Unauthorized caller {caller} for {operation}")]
    Unauthorized {
        operation: &'static str,
        caller: Address,
    },

    // =================================================================
    // Balance Errors (2xx)
    // =================================================================
    /// Locked balance is below the required collateral.
    #[error("BV_ERR_200: Insufficient collateral: need {required}, locked {locked}")]
    InsufficientCollateral { required: Amount, locked: Amount },

    /// Not enough locked balance for the requested withdrawal.
    #[error("BV_ERR_201: Insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Amount, available: Amount },

    // =================================================================
    // Collateral Policy Errors (3xx)
    // =================================================================
    /// Required collateral may only increase.
    #[error("BV_ERR_300: Invalid collateral change: {proposed} is not above {current}")]
    InvalidCollateralChange { current: Amount, proposed: Amount },

    // =================================================================
    // Stake / Finalization Errors (4xx)
    // =================================================================
    /// The batch already carries a stake.
    #[error("BV_ERR_400: Batch already staked: {0}")]
    BatchAlreadyStaked(BatchIndex),

    /// The batch stake was already consumed or the dispute already settled.
    #[error("BV_ERR_401: Already finalized: {batch} / {commitment}")]
    AlreadyFinalized {
        batch: BatchIndex,
        commitment: CommitmentId,
    },

    /// The staker named by the adjudicator does not own the batch stake.
    #[error("BV_ERR_402: Staker mismatch for {batch}: staked by {expected}, got {actual}")]
    StakerMismatch {
        batch: BatchIndex,
        expected: Address,
        actual: Address,
    },

    // =================================================================
    // Withdrawal Errors (5xx)
    // =================================================================
    /// The grace period since the withdrawal request has not elapsed.
    #[error("BV_ERR_500: Withdrawal too early: ready at {ready_at}")]
    TooEarly { ready_at: chrono::DateTime<chrono::Utc> },

    /// The pending withdrawal was zeroed by a fraud verdict.
    #[error("BV_ERR_501: Withdrawal slashed for {0}")]
    Slashed(Address),

    /// A withdrawal is already in flight for this participant.
    #[error("BV_ERR_502: Withdrawal already pending for {0}")]
    WithdrawalPending(Address),

    /// No withdrawal has been requested.
    #[error("BV_ERR_503: No withdrawal pending for {0}")]
    NoWithdrawalPending(Address),

    /// A withdrawal was requested with nothing locked.
    #[error("BV_ERR_504: Nothing to withdraw for {0}")]
    NothingToWithdraw(Address),

    // =================================================================
    // Dispute Reward Errors (6xx)
    // =================================================================
    /// Claims are only possible after a fraud verdict.
    #[error("BV_ERR_600: Dispute not claimable: {0}")]
    NotClaimable(CommitmentId),

    /// Evidence counts are frozen once the dispute is claimable.
    #[error("BV_ERR_601: Dispute closed to new evidence: {0}")]
    DisputeClosed(CommitmentId),

    // =================================================================
    // Value-Transfer Errors (7xx)
    // =================================================================
    /// The value-transfer medium rejected or failed the transfer.
    #[error("BV_ERR_700: Transfer failed: {reason}")]
    TransferFailed { reason: String },

    // =================================================================
    // Invariant Errors (8xx)
    // =================================================================
    /// Ledger liabilities do not match deposits, or custody does not back them.
    #[error("BV_ERR_800: Solvency invariant violation: {reason}")]
    SolvencyViolation { reason: String },

    /// An amount computation overflowed.
    #[error("BV_ERR_801: Arithmetic overflow")]
    ArithmeticOverflow,

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Configuration error (invalid config file, missing fields, etc.).
    #[error("BV_ERR_900: Configuration error: {0}")]
    Configuration(String),

    /// Serialization / deserialization error.
    #[error("BV_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// I/O error.
    #[error("BV_ERR_902: I/O error: {0}")]
    Io(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, BondError>;

impl From<std::io::Error> for BondError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for BondError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<crate::TransferFailure> for BondError {
    fn from(err: crate::TransferFailure) -> Self {
        Self::TransferFailed {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_contains_prefix() {
        let err = BondError::BatchAlreadyStaked(BatchIndex(7));
        let msg = format!("{err}");
        assert!(msg.starts_with("BV_ERR_400"), "Got: {msg}");
        assert!(msg.contains("batch:7"));
    }

    #[test]
    fn insufficient_collateral_display() {
        let err = BondError::InsufficientCollateral {
            required: Amount::new(100),
            locked: Amount::new(50),
        };
        let msg = format!("{err}");
        assert!(msg.contains("BV_ERR_200"));
        assert!(msg.contains("100"));
        assert!(msg.contains("50"));
    }

    #[test]
    fn transfer_failure_converts() {
        let err: BondError = crate::TransferFailure::InsufficientAllowance {
            needed: Amount::new(5),
            allowed: Amount::ZERO,
        }
        .into();
        assert!(matches!(err, BondError::TransferFailed { .. }));
        assert!(format!("{err}").starts_with("BV_ERR_700"));
    }

    #[test]
    fn all_errors_have_bv_err_prefix() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(BondError::Unauthorized {
                operation: "stake",
                caller: Address::ZERO,
            }),
            Box::new(BondError::Slashed(Address::ZERO)),
            Box::new(BondError::NotClaimable(CommitmentId([0; 32]))),
            Box::new(BondError::ArithmeticOverflow),
            Box::new(BondError::Configuration("test".into())),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with("BV_ERR_"),
                "Error missing BV_ERR_ prefix: {msg}"
            );
        }
    }
}
