//! Bond manager: the single entry point that ties policy, collateral ledger
//! and reward registry together.
//!
//! Every operation follows the same three steps:
//! 1. Validate (authorization, state preconditions, arithmetic)
//! 2. Call the value-transfer medium, if value moves
//! 3. Commit state, update solvency totals, append an audit event
//!
//! A failure at step 1 or 2 leaves every component untouched.

use bondvault_ledger::access::authorize;
use bondvault_ledger::{
    CollateralLedger, CollateralPolicy, SolvencyTracker, StakeSettlement, WithdrawalWindow,
};
use bondvault_types::constants::VERSION;
use bondvault_types::{
    Address, Amount, BatchIndex, Bond, BondError, CommitmentId, DisputeRecord, EventLog,
    LedgerConfig, LedgerEvent, Resolver, Result, ValueTransfer, Verdict,
};
use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::rewards::DisputeRewardRegistry;
use crate::snapshot::LedgerSnapshot;

/// Collateral and dispute-reward ledger bound to its collaborators.
#[derive(Debug)]
pub struct BondManager<R: Resolver, T: ValueTransfer> {
    config: LedgerConfig,
    policy: CollateralPolicy,
    ledger: CollateralLedger,
    registry: DisputeRewardRegistry,
    solvency: SolvencyTracker,
    events: EventLog,
    resolver: R,
    medium: T,
}

impl<R: Resolver, T: ValueTransfer> BondManager<R, T> {
    /// Create an empty ledger.
    ///
    /// # Errors
    /// `Configuration` if the config is invalid or names a custody account
    /// other than the medium's.
    pub fn new(config: LedgerConfig, resolver: R, medium: T) -> Result<Self> {
        config.validate()?;
        check_custody(&config, &medium)?;
        let window = WithdrawalWindow::from_config(&config)?;
        let policy = CollateralPolicy::from_config(&config)?;
        let ledger = CollateralLedger::new(window, config.admission_authority_name.clone());
        info!(
            owner = %config.owner,
            custody = %config.custody,
            required = %policy.required(),
            version = VERSION,
            "Bond manager started"
        );
        Ok(Self {
            config,
            policy,
            ledger,
            registry: DisputeRewardRegistry::new(),
            solvency: SolvencyTracker::new(),
            events: EventLog::new(),
            resolver,
            medium,
        })
    }

    /// Rebuild a manager from a snapshot and re-check solvency against the
    /// medium.
    ///
    /// # Errors
    /// - `Configuration` on an invalid config, a mismatched custody account,
    ///   a required collateral below the configured minimum, or a bad event head
    /// - `SolvencyViolation` if the snapshot is not backed by custody
    pub fn restore(config: LedgerConfig, snapshot: LedgerSnapshot, resolver: R, medium: T) -> Result<Self> {
        config.validate()?;
        check_custody(&config, &medium)?;
        let window = WithdrawalWindow::from_config(&config)?;
        let policy = CollateralPolicy::new(
            config.owner,
            snapshot.required_collateral,
            config.min_required_collateral,
        )?;
        let ledger = CollateralLedger::from_parts(
            window,
            config.admission_authority_name.clone(),
            snapshot.bonds,
            snapshot.stakes,
            snapshot.slashed_reserve,
        );
        let manager = Self {
            events: EventLog::resume(&snapshot.event_head)?,
            registry: DisputeRewardRegistry::from_records(snapshot.disputes),
            solvency: snapshot.solvency,
            config,
            policy,
            ledger,
            resolver,
            medium,
        };
        manager.verify_solvency()?;
        info!(
            version = %snapshot.version,
            event_head = %manager.events.head_hex(),
            "Bond manager restored"
        );
        Ok(manager)
    }

    // ------------------------------------------------------------------
    // Collateral
    // ------------------------------------------------------------------

    /// Lock `amount` pulled from `participant`.
    pub fn deposit(&mut self, participant: Address, amount: Amount) -> Result<()> {
        let mut solvency = self.solvency;
        solvency.record_deposit(amount)?;
        self.ledger.deposit(&mut self.medium, participant, amount)?;
        self.solvency = solvency;
        if !amount.is_zero() {
            self.events.record(LedgerEvent::Deposited {
                participant,
                amount,
            });
        }
        Ok(())
    }

    /// Back `batch` with the required collateral of `staker`.
    pub fn stake(
        &mut self,
        caller: Address,
        staker: Address,
        batch: BatchIndex,
        now: DateTime<Utc>,
    ) -> Result<Amount> {
        let amount = self
            .ledger
            .stake(&self.resolver, &self.policy, caller, staker, batch, now)?;
        self.events.record(LedgerEvent::Staked {
            staker,
            batch,
            amount,
        });
        Ok(amount)
    }

    /// Withdraw unstaked collateral immediately.
    pub fn withdraw(&mut self, participant: Address, amount: Amount) -> Result<()> {
        let mut solvency = self.solvency;
        solvency.record_withdrawal(amount)?;
        self.ledger.withdraw(&mut self.medium, participant, amount)?;
        self.solvency = solvency;
        if !amount.is_zero() {
            self.events.record(LedgerEvent::Withdrawn {
                participant,
                amount,
            });
        }
        Ok(())
    }

    pub fn start_withdrawal(&mut self, participant: Address, now: DateTime<Utc>) -> Result<Amount> {
        let amount = self.ledger.start_withdrawal(participant, now)?;
        self.events.record(LedgerEvent::WithdrawalStarted {
            participant,
            amount,
            requested_at: now,
        });
        Ok(amount)
    }

    pub fn finalize_withdrawal(&mut self, participant: Address, now: DateTime<Utc>) -> Result<Amount> {
        let pending = self.ledger.bond(participant).withdrawing;
        let mut solvency = self.solvency;
        solvency.record_withdrawal(pending)?;
        let amount = self
            .ledger
            .finalize_withdrawal(&mut self.medium, participant, now)?;
        self.solvency = solvency;
        self.events.record(LedgerEvent::WithdrawalFinalized {
            participant,
            amount,
        });
        Ok(amount)
    }

    // ------------------------------------------------------------------
    // Disputes
    // ------------------------------------------------------------------

    /// Apply the adjudicator's verdict for `batch`.
    ///
    /// On `Fraud` the stake is forfeited into the reward pool of
    /// `commitment` and a pending withdrawal of the staker may be slashed.
    /// On `NoFraud` the stake returns to the staker's locked balance.
    ///
    /// # Errors
    /// - `Unauthorized` unless `caller` resolves as the adjudicator
    /// - `AlreadyFinalized` if the batch has no stake or the dispute is
    ///   already claimable
    /// - `StakerMismatch` if `staker` did not stake `batch`
    pub fn finalize(
        &mut self,
        caller: Address,
        commitment: CommitmentId,
        batch: BatchIndex,
        staker: Address,
        dispute_timestamp: DateTime<Utc>,
        verdict: Verdict,
    ) -> Result<StakeSettlement> {
        authorize(&self.resolver, &self.config.adjudicator_name, caller, "finalize")?;
        if self.registry.is_claimable(&commitment) {
            return Err(BondError::AlreadyFinalized { batch, commitment });
        }

        let settlement =
            self.ledger
                .settle_stake(commitment, batch, staker, dispute_timestamp, verdict)?;
        if verdict == Verdict::Fraud {
            // Claimability was checked above, so the pool always opens.
            self.registry.open_claims(commitment, settlement.stake)?;
        }

        self.events.record(LedgerEvent::BatchFinalized {
            batch,
            commitment,
            staker,
            verdict,
            amount: settlement.stake,
        });
        if !settlement.slashed.is_zero() {
            self.events.record(LedgerEvent::BondSlashed {
                participant: staker,
                amount: settlement.slashed,
            });
        }
        Ok(settlement)
    }

    /// Count one evidence submission by `submitter` for `commitment`.
    pub fn record_evidence(
        &mut self,
        caller: Address,
        commitment: CommitmentId,
        submitter: Address,
    ) -> Result<u64> {
        let count = self
            .registry
            .record_evidence(&self.resolver, caller, commitment, submitter)?;
        self.events.record(LedgerEvent::EvidenceRecorded {
            commitment,
            submitter,
        });
        Ok(count)
    }

    /// Pay `claimant` their share of the forfeited pool.
    pub fn claim(&mut self, commitment: CommitmentId, claimant: Address) -> Result<Amount> {
        let owed = self
            .registry
            .dispute(&commitment)
            .and_then(|r| r.share_for(r.claims_of(&claimant)))
            .unwrap_or(Amount::ZERO);
        let mut solvency = self.solvency;
        solvency.record_claim(owed)?;
        let amount = self.registry.claim(&mut self.medium, commitment, claimant)?;
        self.solvency = solvency;
        self.events.record(LedgerEvent::RewardClaimed {
            commitment,
            claimant,
            amount,
        });
        Ok(amount)
    }

    // ------------------------------------------------------------------
    // Policy
    // ------------------------------------------------------------------

    /// Raise the collateral required for future stakes.
    pub fn set_required_collateral(&mut self, caller: Address, new_value: Amount) -> Result<Amount> {
        let previous = self.policy.set_required_collateral(caller, new_value)?;
        self.events.record(LedgerEvent::CollateralRaised {
            from: previous,
            to: new_value,
        });
        Ok(previous)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    #[must_use]
    pub fn bond(&self, participant: Address) -> Bond {
        self.ledger.bond(participant)
    }

    #[must_use]
    pub fn stake_owner(&self, batch: BatchIndex) -> Option<Address> {
        self.ledger.stake_owner(batch)
    }

    #[must_use]
    pub fn is_collateralized(&self, participant: Address) -> bool {
        self.ledger.is_collateralized(participant, &self.policy)
    }

    #[must_use]
    pub fn required_collateral(&self) -> Amount {
        self.policy.required()
    }

    #[must_use]
    pub fn dispute(&self, commitment: &CommitmentId) -> Option<&DisputeRecord> {
        self.registry.dispute(commitment)
    }

    #[must_use]
    pub fn claims_of(&self, commitment: &CommitmentId, participant: &Address) -> u64 {
        self.registry.claims_of(commitment, participant)
    }

    #[must_use]
    pub fn slashed_reserve(&self) -> Amount {
        self.ledger.slashed_reserve()
    }

    #[must_use]
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    #[must_use]
    pub fn ledger(&self) -> &CollateralLedger {
        &self.ledger
    }

    #[must_use]
    pub fn registry(&self) -> &DisputeRewardRegistry {
        &self.registry
    }

    #[must_use]
    pub fn solvency(&self) -> &SolvencyTracker {
        &self.solvency
    }

    #[must_use]
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    #[must_use]
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Mutable access for re-pointing names and assigning recorders.
    pub fn resolver_mut(&mut self) -> &mut R {
        &mut self.resolver
    }

    #[must_use]
    pub fn medium(&self) -> &T {
        &self.medium
    }

    pub fn medium_mut(&mut self) -> &mut T {
        &mut self.medium
    }

    /// Total owed to participants and claimants. `None` on overflow.
    #[must_use]
    pub fn liabilities(&self) -> Option<Amount> {
        self.ledger
            .liabilities()?
            .checked_add(self.registry.undistributed()?)
    }

    /// Check bookkeeping against value flows and the custody balance.
    ///
    /// # Errors
    /// Returns [`BondError::SolvencyViolation`] on any mismatch.
    pub fn verify_solvency(&self) -> Result<()> {
        let liabilities = self.liabilities().ok_or(BondError::ArithmeticOverflow)?;
        let custody = self.medium.balance_of(self.medium.custody());
        self.solvency.verify(liabilities, custody).inspect_err(|e| {
            error!(error = %e, "Solvency check failed");
        })
    }

    /// Export the full state with deterministic ordering.
    #[must_use]
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            version: VERSION.to_string(),
            required_collateral: self.policy.required(),
            bonds: self.ledger.bonds().map(|(a, b)| (*a, b.clone())).collect(),
            stakes: self.ledger.stakes().map(|(i, s)| (*i, *s)).collect(),
            disputes: self
                .registry
                .records()
                .map(|(c, r)| (*c, r.clone()))
                .collect(),
            slashed_reserve: self.ledger.slashed_reserve(),
            solvency: self.solvency,
            event_head: self.events.head_hex(),
        }
    }
}

fn check_custody<T: ValueTransfer>(config: &LedgerConfig, medium: &T) -> Result<()> {
    if medium.custody() == config.custody {
        Ok(())
    } else {
        Err(BondError::Configuration(format!(
            "medium custody {} does not match configured custody {}",
            medium.custody(),
            config.custody
        )))
    }
}

#[cfg(test)]
mod tests {
    use bondvault_ledger::{InMemoryToken, NameRegistry};
    use bondvault_types::constants::{ADJUDICATOR_NAME, ADMISSION_AUTHORITY_NAME};
    use bondvault_types::fixtures::{address, tokens, ts};

    use super::*;

    type Manager = BondManager<NameRegistry, InMemoryToken>;

    const OWNER: u8 = 0xee;
    const CUSTODY: u8 = 0xcc;
    const ADMISSION: u8 = 0xa0;
    const ADJUDICATOR: u8 = 0xa1;
    const RECORDER: u8 = 0xa2;

    fn commitment() -> CommitmentId {
        CommitmentId([9; 32])
    }

    fn manager() -> Manager {
        let config = LedgerConfig::new(address(OWNER), address(CUSTODY));
        let mut resolver = NameRegistry::new()
            .with(ADMISSION_AUTHORITY_NAME, address(ADMISSION))
            .with(ADJUDICATOR_NAME, address(ADJUDICATOR));
        resolver.assign_recorder(commitment(), address(RECORDER));
        BondManager::new(config, resolver, InMemoryToken::new(address(CUSTODY))).unwrap()
    }

    fn fund(m: &mut Manager, who: Address, n: u128) {
        let custody = m.medium().custody();
        m.medium_mut().mint(who, tokens(n));
        m.medium_mut().approve(who, custody, tokens(n));
        m.deposit(who, tokens(n)).unwrap();
    }

    #[test]
    fn rejects_mismatched_custody() {
        let config = LedgerConfig::new(address(OWNER), address(CUSTODY));
        let err = BondManager::new(config, NameRegistry::new(), InMemoryToken::new(address(1)))
            .unwrap_err();
        assert!(matches!(err, BondError::Configuration(_)));
    }

    #[test]
    fn deposit_updates_totals_and_events() {
        let mut m = manager();
        fund(&mut m, address(1), 3);
        m.deposit(address(1), Amount::ZERO).unwrap();
        assert_eq!(m.solvency().total_deposited(), tokens(3));
        assert_eq!(m.events().len(), 1);
        m.verify_solvency().unwrap();
    }

    #[test]
    fn failed_deposit_leaves_totals() {
        let mut m = manager();
        m.medium_mut().mint(address(1), tokens(1));
        assert!(m.deposit(address(1), tokens(1)).is_err());
        assert_eq!(m.solvency().total_deposited(), Amount::ZERO);
        assert!(m.events().is_empty());
    }

    #[test]
    fn finalize_requires_adjudicator() {
        let mut m = manager();
        fund(&mut m, address(1), 1);
        m.stake(address(ADMISSION), address(1), BatchIndex(1), ts(0))
            .unwrap();
        let err = m
            .finalize(
                address(ADMISSION),
                commitment(),
                BatchIndex(1),
                address(1),
                ts(0),
                Verdict::Fraud,
            )
            .unwrap_err();
        assert!(matches!(err, BondError::Unauthorized { .. }));
        assert_eq!(m.stake_owner(BatchIndex(1)), Some(address(1)));
    }

    #[test]
    fn fraud_opens_pool_once() {
        let mut m = manager();
        fund(&mut m, address(1), 2);
        m.stake(address(ADMISSION), address(1), BatchIndex(1), ts(0))
            .unwrap();
        m.stake(address(ADMISSION), address(1), BatchIndex(2), ts(0))
            .unwrap();
        m.finalize(
            address(ADJUDICATOR),
            commitment(),
            BatchIndex(1),
            address(1),
            ts(0),
            Verdict::Fraud,
        )
        .unwrap();
        assert!(m.dispute(&commitment()).unwrap().claimable);

        // Same commitment, different batch: the dispute is already settled.
        let err = m
            .finalize(
                address(ADJUDICATOR),
                commitment(),
                BatchIndex(2),
                address(1),
                ts(0),
                Verdict::Fraud,
            )
            .unwrap_err();
        assert!(matches!(err, BondError::AlreadyFinalized { .. }));
        assert_eq!(m.stake_owner(BatchIndex(2)), Some(address(1)));
        m.verify_solvency().unwrap();
    }

    #[test]
    fn collateral_raise_is_owner_only_and_logged() {
        let mut m = manager();
        let err = m
            .set_required_collateral(address(1), tokens(2))
            .unwrap_err();
        assert!(matches!(err, BondError::Unauthorized { .. }));
        assert_eq!(
            m.set_required_collateral(address(OWNER), tokens(2)).unwrap(),
            tokens(1)
        );
        assert_eq!(m.required_collateral(), tokens(2));
        assert_eq!(m.events().len(), 1);
    }

    #[test]
    fn snapshot_restore_preserves_state() {
        let mut m = manager();
        fund(&mut m, address(1), 3);
        m.stake(address(ADMISSION), address(1), BatchIndex(1), ts(0))
            .unwrap();
        m.record_evidence(address(RECORDER), commitment(), address(2))
            .unwrap();
        m.start_withdrawal(address(1), ts(10)).unwrap();

        let snap = m.snapshot();
        let digest = snap.digest().unwrap();
        let head = m.events().head_hex();
        let restored = BondManager::restore(
            m.config().clone(),
            snap,
            m.resolver().clone(),
            m.medium().clone(),
        )
        .unwrap();

        assert_eq!(restored.snapshot().digest().unwrap(), digest);
        assert_eq!(restored.events().head_hex(), head);
        assert_eq!(restored.bond(address(1)), m.bond(address(1)));
        assert_eq!(restored.claims_of(&commitment(), &address(2)), 1);
    }

    #[test]
    fn restore_detects_unbacked_snapshot() {
        let mut m = manager();
        fund(&mut m, address(1), 3);
        let snap = m.snapshot();
        let err = BondManager::restore(
            m.config().clone(),
            snap,
            m.resolver().clone(),
            InMemoryToken::new(address(CUSTODY)),
        )
        .unwrap_err();
        assert!(matches!(err, BondError::SolvencyViolation { .. }));
    }
}
