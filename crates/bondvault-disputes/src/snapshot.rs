//! Persisted ledger state.
//!
//! All tables are `BTreeMap`s so that the JSON encoding, and with it
//! [`LedgerSnapshot::digest`], is canonical: two replicas holding the same
//! state produce byte-identical snapshots.

use std::collections::BTreeMap;

use bondvault_ledger::SolvencyTracker;
use bondvault_types::{
    Address, Amount, BatchIndex, Bond, CommitmentId, DisputeRecord, Result, StakeAssignment,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Complete state of a bond manager, minus its collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Engine version that wrote the snapshot.
    pub version: String,
    pub required_collateral: Amount,
    pub bonds: BTreeMap<Address, Bond>,
    pub stakes: BTreeMap<BatchIndex, StakeAssignment>,
    pub disputes: BTreeMap<CommitmentId, DisputeRecord>,
    pub slashed_reserve: Amount,
    pub solvency: SolvencyTracker,
    /// Event chain head at the time of the snapshot (hex).
    pub event_head: String,
}

impl LedgerSnapshot {
    /// SHA-256 over the canonical JSON encoding, hex-encoded.
    ///
    /// # Errors
    /// Returns [`bondvault_types::BondError::Serialization`] if encoding fails.
    pub fn digest(&self) -> Result<String> {
        let bytes = serde_json::to_vec(self)?;
        let mut hasher = Sha256::new();
        hasher.update(b"bondvault:snapshot:v1:");
        hasher.update(&bytes);
        Ok(hex::encode(hasher.finalize()))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use bondvault_types::fixtures::{address, ts};

    use super::*;

    fn sample() -> LedgerSnapshot {
        let mut bonds = BTreeMap::new();
        bonds.insert(
            address(1),
            Bond {
                locked: Amount::new(10),
                withdrawing: Amount::new(5),
                withdrawal_requested_at: Some(ts(100)),
            },
        );
        let mut stakes = BTreeMap::new();
        stakes.insert(
            BatchIndex(3),
            StakeAssignment {
                staker: address(1),
                amount: Amount::new(7),
                staked_at: ts(50),
            },
        );
        let mut disputes = BTreeMap::new();
        let mut record = DisputeRecord::new();
        record.total_evidence = 1;
        record.claims_by_participant.insert(address(2), 1);
        disputes.insert(CommitmentId([4; 32]), record);

        LedgerSnapshot {
            version: "0.1.0".into(),
            required_collateral: Amount::new(7),
            bonds,
            stakes,
            disputes,
            slashed_reserve: Amount::ZERO,
            solvency: SolvencyTracker::from_totals(Amount::new(22), Amount::ZERO, Amount::ZERO),
            event_head: hex::encode([0u8; 32]),
        }
    }

    #[test]
    fn json_survives_map_keys() {
        let snap = sample();
        let json = snap.to_json().unwrap();
        assert!(json.contains("\"0x0101010101010101010101010101010101010101\""));
        assert_eq!(LedgerSnapshot::from_json(&json).unwrap(), snap);
    }

    #[test]
    fn digest_is_stable_and_sensitive() {
        let snap = sample();
        assert_eq!(snap.digest().unwrap(), sample().digest().unwrap());
        assert_eq!(snap.digest().unwrap().len(), 64);

        let mut changed = sample();
        changed.slashed_reserve = Amount::new(1);
        assert_ne!(snap.digest().unwrap(), changed.digest().unwrap());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(LedgerSnapshot::from_json("{\"version\": 1}").is_err());
    }
}
