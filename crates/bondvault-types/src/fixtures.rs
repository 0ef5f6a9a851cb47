//! Fixture constructors for tests. **Never use in production.**

use chrono::{DateTime, Utc};

use crate::{Address, Amount, constants};

/// A random participant address.
#[must_use]
pub fn random_address() -> Address {
    Address(rand::random::<[u8; 20]>())
}

/// A deterministic address whose bytes are all `byte`.
#[must_use]
pub fn address(byte: u8) -> Address {
    Address([byte; 20])
}

/// A fixed point in time, `secs` seconds after the Unix epoch.
///
/// # Panics
/// Panics if `secs` is outside chrono's representable range.
#[must_use]
pub fn ts(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).expect("timestamp in range")
}

/// `n` whole tokens at the default decimals.
#[must_use]
pub fn tokens(n: u128) -> Amount {
    Amount::new(n * constants::ONE_TOKEN)
}
