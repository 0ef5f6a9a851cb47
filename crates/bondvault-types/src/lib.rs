//! # bondvault-types
//!
//! Shared types, errors, and configuration for the **BondVault** collateral
//! and dispute-reward ledger.
//!
//! This crate is the leaf dependency of the workspace. It defines:
//!
//! - **Identifiers**: [`Address`], [`BatchIndex`], [`CommitmentId`]
//! - **Amounts**: [`Amount`] (integer base units)
//! - **Bond model**: [`Bond`], [`StakeAssignment`], [`Verdict`]
//! - **Dispute model**: [`DisputeRecord`]
//! - **Collaborators**: [`Resolver`], [`ValueTransfer`], [`TransferFailure`]
//! - **Audit trail**: [`LedgerEvent`], [`EventLog`]
//! - **Configuration**: [`LedgerConfig`]
//! - **Errors**: [`BondError`] with `BV_ERR_` prefix codes
//! - **Constants**: defaults and resolver names

pub mod amount;
pub mod bond;
pub mod config;
pub mod constants;
pub mod dispute;
pub mod error;
pub mod event;
pub mod ids;
pub mod interfaces;

#[cfg(any(test, feature = "test-helpers"))]
pub mod fixtures;

pub use amount::*;
pub use bond::*;
pub use config::*;
pub use dispute::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use interfaces::*;

// Constants are accessed via `bondvault_types::constants::FOO`
// (not re-exported to avoid name collisions).
