//! System-wide constants for the BondVault ledger.

/// Decimals of the default collateral token.
pub const DEFAULT_TOKEN_DECIMALS: u32 = 18;

/// Largest decimals value accepted for unit conversion.
pub const MAX_TOKEN_DECIMALS: u32 = 18;

/// One whole token in base units at the default decimals.
pub const ONE_TOKEN: u128 = 1_000_000_000_000_000_000;

/// Floor for the required collateral: one whole token.
pub const MIN_REQUIRED_COLLATERAL: u128 = ONE_TOKEN;

/// Default proving window: a fraud verdict with a dispute timestamp within
/// this many seconds of a withdrawal request slashes it (7 days).
pub const DEFAULT_PROVING_WINDOW_SECS: u64 = 7 * 24 * 60 * 60;

/// Default grace period before a withdrawal can be finalized (14 days).
/// Must exceed the proving window.
pub const DEFAULT_GRACE_PERIOD_SECS: u64 = 14 * 24 * 60 * 60;

/// Resolver name of the batch admission authority.
pub const ADMISSION_AUTHORITY_NAME: &str = "batch_admission";

/// Resolver name of the fraud adjudicator.
pub const ADJUDICATOR_NAME: &str = "fraud_adjudicator";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "BondVault";
