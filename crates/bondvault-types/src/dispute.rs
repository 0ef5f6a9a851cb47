//! Per-commitment dispute record.
//!
//! ## Lifecycle
//!
//! ```text
//!   first evidence          fraud finalized            claims paid
//!   ──────────────▶ OPEN ─────────────────▶ CLAIMABLE ─────────────▶ (counts zeroed)
//!                  counts grow              counts frozen
//! ```
//!
//! The record is never deleted. Zero-count entries left behind by paid
//! claims are harmless.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Address, Amount};

/// Evidence tally and forfeited pool for one disputed commitment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DisputeRecord {
    /// Set once a fraud verdict is finalized. Irreversible.
    pub claimable: bool,
    /// Number of evidence submissions recorded while open.
    pub total_evidence: u64,
    /// Outstanding evidence count per claimant. Zeroed when paid.
    pub claims_by_participant: BTreeMap<Address, u64>,
    /// Stake forfeited into this pool when the record became claimable.
    pub forfeited: Amount,
    /// Sum of all payouts made from the pool.
    pub paid_out: Amount,
}

impl DisputeRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Outstanding count for `participant` (zero if absent or already paid).
    #[must_use]
    pub fn claims_of(&self, participant: &Address) -> u64 {
        self.claims_by_participant
            .get(participant)
            .copied()
            .unwrap_or(0)
    }

    /// Pool balance not yet paid out, including floor-division dust.
    #[must_use]
    pub fn undistributed(&self) -> Amount {
        self.forfeited
            .checked_sub(self.paid_out)
            .unwrap_or(Amount::ZERO)
    }

    /// The share owed for `count` evidence submissions, rounded down.
    ///
    /// Always zero when no evidence was recorded, so an unwitnessed pool stays
    /// in custody.
    #[must_use]
    pub fn share_for(&self, count: u64) -> Option<Amount> {
        if self.total_evidence == 0 {
            return Some(Amount::ZERO);
        }
        self.forfeited.mul_div_floor(count, self.total_evidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with(counts: &[(Address, u64)], forfeited: u128) -> DisputeRecord {
        let mut record = DisputeRecord::new();
        for (who, n) in counts {
            record.claims_by_participant.insert(*who, *n);
            record.total_evidence += n;
        }
        record.forfeited = Amount::new(forfeited);
        record.claimable = true;
        record
    }

    #[test]
    fn shares_partition_pool_with_dust() {
        let a = Address([1; 20]);
        let b = Address([2; 20]);
        let record = record_with(&[(a, 2), (b, 1)], 100);

        let share_a = record.share_for(record.claims_of(&a)).unwrap();
        let share_b = record.share_for(record.claims_of(&b)).unwrap();
        assert_eq!(share_a, Amount::new(66));
        assert_eq!(share_b, Amount::new(33));
        assert!(share_a.get() + share_b.get() <= 100);
    }

    #[test]
    fn share_is_zero_without_evidence() {
        let record = record_with(&[], 100);
        assert_eq!(record.share_for(0), Some(Amount::ZERO));
    }

    #[test]
    fn undistributed_tracks_payouts() {
        let mut record = record_with(&[(Address([1; 20]), 1)], 100);
        assert_eq!(record.undistributed(), Amount::new(100));
        record.paid_out = Amount::new(99);
        assert_eq!(record.undistributed(), Amount::new(1));
    }

    #[test]
    fn unknown_claimant_has_zero_claims() {
        let record = DisputeRecord::new();
        assert_eq!(record.claims_of(&Address([9; 20])), 0);
    }
}
