//! Collaborator interfaces consumed by the ledger.
//!
//! The ledger never reaches for ambient context: who may call what is looked
//! up through a [`Resolver`], and every movement of value goes through a
//! [`ValueTransfer`] handle bound to the custody account.

use thiserror::Error;

use crate::{Address, Amount, CommitmentId};

/// Resolves symbolic names to account addresses.
///
/// `None` means "no valid authorized caller"; every authorization check
/// against an unresolved name fails closed.
pub trait Resolver {
    /// Address registered under `name`.
    fn resolve(&self, name: &str) -> Option<Address>;

    /// The adjudication agent currently allowed to record evidence for
    /// `commitment`.
    fn evidence_recorder(&self, commitment: &CommitmentId) -> Option<Address>;
}

/// Why the value-transfer medium refused a transfer.
///
/// Rejections and outright failures of the medium are collapsed into this
/// single signal at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferFailure {
    #[error("insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Amount, available: Amount },

    #[error("insufficient allowance: need {needed}, allowed {allowed}")]
    InsufficientAllowance { needed: Amount, allowed: Amount },

    #[error("transfer rejected: {0}")]
    Rejected(String),
}

/// Handle on the fungible-value medium, acting on behalf of the custody
/// account.
pub trait ValueTransfer {
    /// The custody account this handle moves funds for.
    fn custody(&self) -> Address;

    /// Move `amount` out of custody to `to`.
    fn transfer(&mut self, to: Address, amount: Amount) -> Result<(), TransferFailure>;

    /// Pull `amount` from `from` into `to` using an allowance granted to
    /// custody.
    fn transfer_from(
        &mut self,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), TransferFailure>;

    /// Current balance of `who` in the medium.
    fn balance_of(&self, who: Address) -> Amount;
}

impl<R: Resolver + ?Sized> Resolver for &R {
    fn resolve(&self, name: &str) -> Option<Address> {
        (**self).resolve(name)
    }

    fn evidence_recorder(&self, commitment: &CommitmentId) -> Option<Address> {
        (**self).evidence_recorder(commitment)
    }
}
