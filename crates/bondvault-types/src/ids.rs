//! Identifiers used throughout BondVault.
//!
//! Participants are 20-byte account addresses, batches are indexed by a
//! monotonically increasing `u64`, and disputed state commitments are
//! 32-byte hashes.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// Account identifier for participants, authorities and the custody account.
///
/// Serialized as a `0x`-prefixed hex string so it can key JSON maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The all-zero address. Never a valid caller.
    pub const ZERO: Self = Self([0u8; 20]);

    #[must_use]
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Parse a hex address, with or without a `0x` prefix.
    ///
    /// # Errors
    /// Returns [`crate::BondError::Configuration`] if the string is not
    /// exactly 20 hex-encoded bytes.
    pub fn from_hex(s: &str) -> crate::Result<Self> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(raw)
            .map_err(|e| crate::BondError::Configuration(format!("bad address {s}: {e}")))?;
        let bytes: [u8; 20] = bytes.try_into().map_err(|_| {
            crate::BondError::Configuration(format!("address {s} is not 20 bytes"))
        })?;
        Ok(Self(bytes))
    }

    /// Short form for log lines.
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// BatchIndex
// ---------------------------------------------------------------------------

/// Position of a batch in the canonical chain. Each index backs at most one
/// stake at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct BatchIndex(pub u64);

impl BatchIndex {
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for BatchIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "batch:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// CommitmentId
// ---------------------------------------------------------------------------

/// Identifier of a disputed state commitment (typically the pre-state root).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct CommitmentId(pub [u8; 32]);

impl CommitmentId {
    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Domain-separated commitment for a state root observed at a batch.
    ///
    /// Every node derives the same identifier for the same
    /// `(state_root, batch)` pair.
    #[must_use]
    pub fn derive(state_root: &[u8], batch: BatchIndex) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"bondvault:commitment:v1:");
        hasher.update(state_root);
        hasher.update(batch.0.to_le_bytes());
        let mut out = [0u8; 32];
        out.copy_from_slice(&hasher.finalize());
        Self(out)
    }

    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Full hex encoding (64 characters, no prefix).
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// # Errors
    /// Returns [`crate::BondError::Serialization`] unless `s` is 32 hex bytes.
    pub fn from_hex(s: &str) -> crate::Result<Self> {
        let bytes = hex::decode(s.strip_prefix("0x").unwrap_or(s))
            .map_err(|e| crate::BondError::Serialization(format!("bad commitment {s}: {e}")))?;
        let bytes: [u8; 32] = bytes.try_into().map_err(|_| {
            crate::BondError::Serialization(format!("commitment {s} is not 32 bytes"))
        })?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for CommitmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "commit:{}", hex::encode(&self.0[..8]))
    }
}

impl Serialize for CommitmentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for CommitmentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
