//! Dispute reward registry.
//!
//! Counts evidence submissions per disputed commitment while the dispute is
//! open, and once a fraud verdict makes it claimable, splits the forfeited
//! stake between submitters in proportion to their counts:
//!
//! ```text
//! payout(claimant) = floor(forfeited * count(claimant) / total_evidence)
//! ```
//!
//! Rounding dust and pools with no evidence stay in custody.

use std::collections::HashMap;

use bondvault_ledger::access::authorize_recorder;
use bondvault_types::{
    Address, Amount, BondError, CommitmentId, DisputeRecord, Resolver, Result, ValueTransfer,
};
use tracing::{debug, info};

/// Per-commitment evidence counts and forfeited pools.
#[derive(Debug, Clone, Default)]
pub struct DisputeRewardRegistry {
    records: HashMap<CommitmentId, DisputeRecord>,
}

impl DisputeRewardRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted records.
    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = (CommitmentId, DisputeRecord)>) -> Self {
        Self {
            records: records.into_iter().collect(),
        }
    }

    /// Credit one evidence submission to `submitter`.
    ///
    /// Returns the submitter's new count.
    ///
    /// # Errors
    /// - `Unauthorized` unless `caller` is the recorder assigned to `commitment`
    /// - `DisputeClosed` once the dispute is claimable
    pub fn record_evidence<R: Resolver + ?Sized>(
        &mut self,
        resolver: &R,
        caller: Address,
        commitment: CommitmentId,
        submitter: Address,
    ) -> Result<u64> {
        authorize_recorder(resolver, &commitment, caller)?;

        let (count, total) = match self.records.get(&commitment) {
            Some(record) if record.claimable => {
                return Err(BondError::DisputeClosed(commitment));
            }
            Some(record) => (record.claims_of(&submitter), record.total_evidence),
            None => (0, 0),
        };
        let count = count.checked_add(1).ok_or(BondError::ArithmeticOverflow)?;
        let total = total.checked_add(1).ok_or(BondError::ArithmeticOverflow)?;

        let record = self.records.entry(commitment).or_default();
        record.claims_by_participant.insert(submitter, count);
        record.total_evidence = total;
        debug!(
            commitment = %commitment,
            submitter = %submitter,
            count,
            total,
            "Evidence recorded"
        );
        Ok(count)
    }

    /// Whether a fraud verdict already made `commitment` claimable.
    #[must_use]
    pub fn is_claimable(&self, commitment: &CommitmentId) -> bool {
        self.records.get(commitment).is_some_and(|r| r.claimable)
    }

    /// Freeze evidence for `commitment` and fund its pool with `forfeited`.
    ///
    /// # Errors
    /// `DisputeClosed` if the dispute is already claimable.
    pub fn open_claims(&mut self, commitment: CommitmentId, forfeited: Amount) -> Result<()> {
        if self.is_claimable(&commitment) {
            return Err(BondError::DisputeClosed(commitment));
        }
        let record = self.records.entry(commitment).or_default();
        record.claimable = true;
        record.forfeited = forfeited;
        info!(
            commitment = %commitment,
            pool = %forfeited,
            total_evidence = record.total_evidence,
            "Dispute claimable"
        );
        Ok(())
    }

    /// Pay `claimant` their share of the pool for `commitment`.
    ///
    /// A claimant with nothing outstanding gets zero and no transfer is made.
    ///
    /// # Errors
    /// - `NotClaimable` before a fraud verdict
    /// - `TransferFailed` if the medium refuses the payout (count kept)
    pub fn claim<T: ValueTransfer + ?Sized>(
        &mut self,
        medium: &mut T,
        commitment: CommitmentId,
        claimant: Address,
    ) -> Result<Amount> {
        let record = self
            .records
            .get(&commitment)
            .filter(|r| r.claimable)
            .ok_or(BondError::NotClaimable(commitment))?;

        let count = record.claims_of(&claimant);
        let payout = record
            .share_for(count)
            .ok_or(BondError::ArithmeticOverflow)?;
        let paid_out = record
            .paid_out
            .checked_add(payout)
            .ok_or(BondError::ArithmeticOverflow)?;

        if !payout.is_zero() {
            medium.transfer(claimant, payout)?;
        }

        if let Some(record) = self.records.get_mut(&commitment) {
            if count > 0 {
                record.claims_by_participant.insert(claimant, 0);
            }
            record.paid_out = paid_out;
        }
        info!(
            commitment = %commitment,
            claimant = %claimant,
            count,
            payout = %payout,
            "Reward claimed"
        );
        Ok(payout)
    }

    #[must_use]
    pub fn dispute(&self, commitment: &CommitmentId) -> Option<&DisputeRecord> {
        self.records.get(commitment)
    }

    /// Outstanding evidence count of `participant` for `commitment`.
    #[must_use]
    pub fn claims_of(&self, commitment: &CommitmentId, participant: &Address) -> u64 {
        self.records
            .get(commitment)
            .map_or(0, |r| r.claims_of(participant))
    }

    /// Forfeited value not yet paid out, over all claimable disputes.
    /// `None` on overflow.
    #[must_use]
    pub fn undistributed(&self) -> Option<Amount> {
        self.records
            .values()
            .filter(|r| r.claimable)
            .try_fold(Amount::ZERO, |acc, r| acc.checked_add(r.undistributed()))
    }

    pub fn records(&self) -> impl Iterator<Item = (&CommitmentId, &DisputeRecord)> {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use bondvault_ledger::{InMemoryToken, NameRegistry};
    use bondvault_types::fixtures::address;

    use super::*;

    fn recorder() -> Address {
        address(0xad)
    }

    fn commitment() -> CommitmentId {
        CommitmentId([7; 32])
    }

    fn setup() -> (DisputeRewardRegistry, NameRegistry, InMemoryToken) {
        let mut resolver = NameRegistry::new();
        resolver.assign_recorder(commitment(), recorder());
        let mut token = InMemoryToken::new(address(0xcc));
        token.mint(address(0xcc), Amount::new(1_000));
        (DisputeRewardRegistry::new(), resolver, token)
    }

    #[test]
    fn evidence_counts_accumulate() {
        let (mut reg, resolver, _) = setup();
        let c = commitment();
        assert_eq!(reg.record_evidence(&resolver, recorder(), c, address(1)).unwrap(), 1);
        assert_eq!(reg.record_evidence(&resolver, recorder(), c, address(1)).unwrap(), 2);
        assert_eq!(reg.record_evidence(&resolver, recorder(), c, address(2)).unwrap(), 1);
        let record = reg.dispute(&c).unwrap();
        assert_eq!(record.total_evidence, 3);
        assert_eq!(reg.claims_of(&c, &address(1)), 2);
        assert!(!record.claimable);
    }

    #[test]
    fn evidence_requires_assigned_recorder() {
        let (mut reg, resolver, _) = setup();
        let err = reg
            .record_evidence(&resolver, address(1), commitment(), address(1))
            .unwrap_err();
        assert!(matches!(err, BondError::Unauthorized { .. }));
        assert!(reg.dispute(&commitment()).is_none());
    }

    #[test]
    fn evidence_rejected_once_claimable() {
        let (mut reg, resolver, _) = setup();
        let c = commitment();
        reg.record_evidence(&resolver, recorder(), c, address(1)).unwrap();
        reg.open_claims(c, Amount::new(100)).unwrap();
        let err = reg
            .record_evidence(&resolver, recorder(), c, address(2))
            .unwrap_err();
        assert!(matches!(err, BondError::DisputeClosed(_)));
        assert_eq!(reg.dispute(&c).unwrap().total_evidence, 1);
    }

    #[test]
    fn claim_before_verdict_rejected() {
        let (mut reg, resolver, mut token) = setup();
        let c = commitment();
        let err = reg.claim(&mut token, c, address(1)).unwrap_err();
        assert!(matches!(err, BondError::NotClaimable(_)));

        reg.record_evidence(&resolver, recorder(), c, address(1)).unwrap();
        let err = reg.claim(&mut token, c, address(1)).unwrap_err();
        assert!(matches!(err, BondError::NotClaimable(_)));
    }

    #[test]
    fn proportional_split_and_idempotent_claim() {
        let (mut reg, resolver, mut token) = setup();
        let c = commitment();
        reg.record_evidence(&resolver, recorder(), c, address(1)).unwrap();
        reg.record_evidence(&resolver, recorder(), c, address(1)).unwrap();
        reg.record_evidence(&resolver, recorder(), c, address(2)).unwrap();
        reg.open_claims(c, Amount::new(100)).unwrap();

        assert_eq!(reg.claim(&mut token, c, address(1)).unwrap(), Amount::new(66));
        assert_eq!(reg.claim(&mut token, c, address(2)).unwrap(), Amount::new(33));
        assert_eq!(reg.claim(&mut token, c, address(1)).unwrap(), Amount::ZERO);
        assert_eq!(reg.claim(&mut token, c, address(9)).unwrap(), Amount::ZERO);

        assert_eq!(token.balance_of(address(1)), Amount::new(66));
        assert_eq!(token.balance_of(address(2)), Amount::new(33));
        // One unit of dust stays in the pool.
        assert_eq!(reg.undistributed(), Some(Amount::new(1)));
    }

    #[test]
    fn failed_transfer_keeps_count() {
        let (mut reg, resolver, mut token) = setup();
        let c = commitment();
        reg.record_evidence(&resolver, recorder(), c, address(1)).unwrap();
        reg.open_claims(c, Amount::new(100)).unwrap();

        token.halt("custody frozen");
        let err = reg.claim(&mut token, c, address(1)).unwrap_err();
        assert!(matches!(err, BondError::TransferFailed { .. }));
        assert_eq!(reg.claims_of(&c, &address(1)), 1);
        assert_eq!(reg.undistributed(), Some(Amount::new(100)));

        token.resume();
        assert_eq!(reg.claim(&mut token, c, address(1)).unwrap(), Amount::new(100));
        assert_eq!(reg.undistributed(), Some(Amount::ZERO));
    }

    #[test]
    fn pool_without_evidence_pays_nothing() {
        let (mut reg, _, mut token) = setup();
        let c = commitment();
        reg.open_claims(c, Amount::new(100)).unwrap();
        assert_eq!(reg.claim(&mut token, c, address(1)).unwrap(), Amount::ZERO);
        assert_eq!(reg.undistributed(), Some(Amount::new(100)));
    }

    #[test]
    fn claims_open_only_once() {
        let (mut reg, _, _) = setup();
        reg.open_claims(commitment(), Amount::new(100)).unwrap();
        assert!(reg.is_claimable(&commitment()));
        let err = reg.open_claims(commitment(), Amount::new(5)).unwrap_err();
        assert!(matches!(err, BondError::DisputeClosed(_)));
        assert_eq!(reg.dispute(&commitment()).unwrap().forfeited, Amount::new(100));
    }
}
