//! # bondvault-disputes
//!
//! Dispute plane of the **BondVault** ledger.
//!
//! - [`DisputeRewardRegistry`]: evidence counts per commitment and
//!   proportional payout of forfeited stakes
//! - [`BondManager`]: facade over policy, collateral ledger and registry;
//!   applies adjudicator verdicts, tracks solvency, keeps the audit log
//! - [`LedgerSnapshot`]: canonical persisted state with a SHA-256 digest
//!
//! ## Dispute Lifecycle
//!
//! ```text
//!   stake(batch) ──▶ evidence recorded ──▶ finalize(Fraud) ──▶ claims paid
//!                                     └──▶ finalize(NoFraud) ──▶ stake refunded
//! ```

pub mod manager;
pub mod rewards;
pub mod snapshot;

pub use manager::BondManager;
pub use rewards::DisputeRewardRegistry;
pub use snapshot::LedgerSnapshot;
