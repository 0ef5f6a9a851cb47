//! # bondvault-ledger
//!
//! Collateral side of the **BondVault** ledger.
//!
//! - [`CollateralLedger`]: per-participant bonds, batch stakes, timed
//!   withdrawals and the slashed reserve
//! - [`CollateralPolicy`]: owner-controlled, monotonically non-decreasing
//!   required collateral
//! - [`WithdrawalWindow`]: proving window and grace period arithmetic
//! - [`SolvencyTracker`]: value-flow totals backing the solvency check
//! - [`access`]: fail-closed caller authorization through a [`Resolver`]
//! - [`NameRegistry`], [`InMemoryToken`]: in-process collaborators
//!
//! ## Atomicity
//!
//! Every operation validates first, then calls the transfer medium, and only
//! then commits. Any error leaves the ledger exactly as it was.
//!
//! [`Resolver`]: bondvault_types::Resolver

pub mod access;
pub mod collateral;
pub mod medium;
pub mod policy;
pub mod resolver;
pub mod solvency;
pub mod window;

pub use collateral::{CollateralLedger, StakeSettlement};
pub use medium::InMemoryToken;
pub use policy::CollateralPolicy;
pub use resolver::NameRegistry;
pub use solvency::SolvencyTracker;
pub use window::WithdrawalWindow;
