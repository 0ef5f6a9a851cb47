//! Caller authorization against resolved names.
//!
//! Fail-closed: an unresolved name, or one resolving to the zero address,
//! authorizes nobody.

use bondvault_types::{Address, BondError, CommitmentId, Resolver, Result};
use tracing::warn;

fn check(expected: Option<Address>, caller: Address, operation: &'static str) -> Result<()> {
    match expected {
        Some(authorized) if authorized == caller && authorized != Address::ZERO => Ok(()),
        _ => {
            warn!(caller = %caller, operation, "Unauthorized caller rejected");
            Err(BondError::Unauthorized { operation, caller })
        }
    }
}

/// Require `caller` to be the address registered under `name`.
///
/// # Errors
/// Returns [`BondError::Unauthorized`] otherwise.
pub fn authorize<R: Resolver + ?Sized>(
    resolver: &R,
    name: &str,
    caller: Address,
    operation: &'static str,
) -> Result<()> {
    check(resolver.resolve(name), caller, operation)
}

/// Require `caller` to be the evidence recorder assigned to `commitment`.
///
/// # Errors
/// Returns [`BondError::Unauthorized`] otherwise.
pub fn authorize_recorder<R: Resolver + ?Sized>(
    resolver: &R,
    commitment: &CommitmentId,
    caller: Address,
) -> Result<()> {
    check(
        resolver.evidence_recorder(commitment),
        caller,
        "record_evidence",
    )
}
