//! Collateral ledger: bonds, batch stakes and timed withdrawals.
//!
//! Tracks per-participant `locked`/`withdrawing` balances, which participant
//! staked each batch, and the slashed reserve. All mutations are atomic:
//! every check and every collaborator call happens before state is touched,
//! so a failed call leaves the ledger unchanged.
//!
//! ## Bond lifecycle
//!
//! ```text
//!   deposit ──▶ locked ──stake──▶ at stake ──finalize(NoFraud)──▶ locked
//!                 │                   └──────finalize(Fraud)────▶ dispute pool
//!                 │ start_withdrawal
//!                 ▼
//!            withdrawing ──finalize_withdrawal──▶ paid out
//!                 └──────fraud within proving window──▶ slashed reserve
//! ```

use std::collections::HashMap;

use bondvault_types::{
    Address, Amount, BatchIndex, Bond, BondError, CommitmentId, Resolver, Result,
    StakeAssignment, ValueTransfer, Verdict,
};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::access::authorize;
use crate::policy::CollateralPolicy;
use crate::window::WithdrawalWindow;

/// What `settle_stake` did to the staker's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StakeSettlement {
    pub staker: Address,
    pub verdict: Verdict,
    /// The stake amount: refunded to `locked` on `NoFraud`, forfeited on `Fraud`.
    pub stake: Amount,
    /// Pending withdrawal zeroed by the verdict (always zero on `NoFraud`).
    pub slashed: Amount,
}

/// Source of truth for bonded collateral.
#[derive(Debug, Clone)]
pub struct CollateralLedger {
    /// Per-participant bonds, created on first deposit.
    bonds: HashMap<Address, Bond>,
    /// Batch index → stake. Removed by finalization.
    stakes: HashMap<BatchIndex, StakeAssignment>,
    /// Withdrawing balances zeroed by fraud verdicts, held in custody.
    slashed_reserve: Amount,
    window: WithdrawalWindow,
    /// Resolver name of the party allowed to call `stake`.
    admission_authority: String,
}

impl CollateralLedger {
    #[must_use]
    pub fn new(window: WithdrawalWindow, admission_authority: impl Into<String>) -> Self {
        Self {
            bonds: HashMap::new(),
            stakes: HashMap::new(),
            slashed_reserve: Amount::ZERO,
            window,
            admission_authority: admission_authority.into(),
        }
    }

    /// Rebuild a ledger from persisted tables.
    #[must_use]
    pub fn from_parts(
        window: WithdrawalWindow,
        admission_authority: impl Into<String>,
        bonds: impl IntoIterator<Item = (Address, Bond)>,
        stakes: impl IntoIterator<Item = (BatchIndex, StakeAssignment)>,
        slashed_reserve: Amount,
    ) -> Self {
        Self {
            bonds: bonds.into_iter().collect(),
            stakes: stakes.into_iter().collect(),
            slashed_reserve,
            window,
            admission_authority: admission_authority.into(),
        }
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// Pull `amount` from `participant` into custody and lock it.
    ///
    /// A zero amount is a no-op.
    ///
    /// # Errors
    /// `TransferFailed` if the medium refuses the pull.
    pub fn deposit<T: ValueTransfer + ?Sized>(
        &mut self,
        medium: &mut T,
        participant: Address,
        amount: Amount,
    ) -> Result<()> {
        if amount.is_zero() {
            return Ok(());
        }
        let locked = self
            .bond(participant)
            .locked
            .checked_add(amount)
            .ok_or(BondError::ArithmeticOverflow)?;

        let custody = medium.custody();
        medium.transfer_from(participant, custody, amount)?;

        self.bonds.entry(participant).or_default().locked = locked;
        info!(participant = %participant, amount = %amount, "Collateral deposited");
        Ok(())
    }

    /// Lock the required collateral of `staker` behind `batch`.
    ///
    /// Returns the amount locked.
    ///
    /// # Errors
    /// - `Unauthorized` unless `caller` resolves as the admission authority
    /// - `BatchAlreadyStaked` if `batch` already carries a stake
    /// - `InsufficientCollateral` if `locked < required`
    pub fn stake<R: Resolver + ?Sized>(
        &mut self,
        resolver: &R,
        policy: &CollateralPolicy,
        caller: Address,
        staker: Address,
        batch: BatchIndex,
        now: DateTime<Utc>,
    ) -> Result<Amount> {
        authorize(resolver, &self.admission_authority, caller, "stake")?;

        if self.stakes.contains_key(&batch) {
            return Err(BondError::BatchAlreadyStaked(batch));
        }

        let required = policy.required();
        let locked = self.bond(staker).locked;
        let remaining = locked
            .checked_sub(required)
            .ok_or(BondError::InsufficientCollateral { required, locked })?;

        self.bonds.entry(staker).or_default().locked = remaining;
        self.stakes.insert(
            batch,
            StakeAssignment {
                staker,
                amount: required,
                staked_at: now,
            },
        );
        debug!(staker = %staker, batch = batch.0, amount = %required, "Batch staked");
        Ok(required)
    }

    /// Withdraw `amount` of unstaked collateral immediately.
    ///
    /// # Errors
    /// - `InsufficientBalance` if `amount > locked`
    /// - `TransferFailed` if the medium refuses the payout
    pub fn withdraw<T: ValueTransfer + ?Sized>(
        &mut self,
        medium: &mut T,
        participant: Address,
        amount: Amount,
    ) -> Result<()> {
        let available = self.bond(participant).locked;
        let remaining = available
            .checked_sub(amount)
            .ok_or(BondError::InsufficientBalance {
                needed: amount,
                available,
            })?;
        if amount.is_zero() {
            return Ok(());
        }

        medium.transfer(participant, amount)?;

        if let Some(bond) = self.bonds.get_mut(&participant) {
            bond.locked = remaining;
        }
        info!(participant = %participant, amount = %amount, "Collateral withdrawn");
        Ok(())
    }

    /// Move the whole locked balance into `withdrawing` and start the timer.
    ///
    /// Returns the amount now withdrawing.
    ///
    /// # Errors
    /// - `WithdrawalPending` while an unslashed request is in flight
    /// - `NothingToWithdraw` if nothing is locked
    pub fn start_withdrawal(&mut self, participant: Address, now: DateTime<Utc>) -> Result<Amount> {
        let bond = self
            .bonds
            .get_mut(&participant)
            .ok_or(BondError::NothingToWithdraw(participant))?;
        if bond.has_pending_withdrawal() {
            return Err(BondError::WithdrawalPending(participant));
        }
        if bond.locked.is_zero() {
            return Err(BondError::NothingToWithdraw(participant));
        }

        let amount = bond.locked;
        bond.withdrawing = amount;
        bond.locked = Amount::ZERO;
        bond.withdrawal_requested_at = Some(now);
        info!(
            participant = %participant,
            amount = %amount,
            ready_at = %self.window.ready_at(now),
            "Withdrawal started"
        );
        Ok(amount)
    }

    /// Pay out a pending withdrawal once the grace period has elapsed.
    ///
    /// Returns the amount paid.
    ///
    /// # Errors
    /// - `NoWithdrawalPending` if no request exists
    /// - `TooEarly` before `requested_at + grace_period`
    /// - `Slashed` if a fraud verdict zeroed the request
    /// - `TransferFailed` if the medium refuses the payout
    pub fn finalize_withdrawal<T: ValueTransfer + ?Sized>(
        &mut self,
        medium: &mut T,
        participant: Address,
        now: DateTime<Utc>,
    ) -> Result<Amount> {
        let bond = self.bond(participant);
        let requested_at = bond
            .withdrawal_requested_at
            .ok_or(BondError::NoWithdrawalPending(participant))?;
        self.window.check_ready(requested_at, now)?;
        if bond.withdrawal_slashed() {
            return Err(BondError::Slashed(participant));
        }

        let amount = bond.withdrawing;
        medium.transfer(participant, amount)?;

        if let Some(bond) = self.bonds.get_mut(&participant) {
            bond.withdrawing = Amount::ZERO;
            bond.withdrawal_requested_at = None;
        }
        info!(participant = %participant, amount = %amount, "Withdrawal finalized");
        Ok(amount)
    }

    /// Ledger side of dispute finalization: consume the batch stake and
    /// apply the verdict to the staker's bond.
    ///
    /// Authorization and dispute-record checks are the caller's job.
    ///
    /// # Errors
    /// - `AlreadyFinalized` if `batch` has no stake
    /// - `StakerMismatch` if the stake belongs to someone else
    pub fn settle_stake(
        &mut self,
        commitment: CommitmentId,
        batch: BatchIndex,
        staker: Address,
        dispute_timestamp: DateTime<Utc>,
        verdict: Verdict,
    ) -> Result<StakeSettlement> {
        let assignment = *self
            .stakes
            .get(&batch)
            .ok_or(BondError::AlreadyFinalized { batch, commitment })?;
        if assignment.staker != staker {
            return Err(BondError::StakerMismatch {
                batch,
                expected: assignment.staker,
                actual: staker,
            });
        }

        let bond = self.bond(staker);
        let settlement = match verdict {
            Verdict::Fraud => {
                let slashed = match bond.withdrawal_requested_at {
                    Some(requested_at)
                        if bond.has_pending_withdrawal()
                            && self.window.slashes(requested_at, dispute_timestamp) =>
                    {
                        bond.withdrawing
                    }
                    _ => Amount::ZERO,
                };
                let reserve = self
                    .slashed_reserve
                    .checked_add(slashed)
                    .ok_or(BondError::ArithmeticOverflow)?;

                if !slashed.is_zero() {
                    if let Some(bond) = self.bonds.get_mut(&staker) {
                        bond.withdrawing = Amount::ZERO;
                    }
                    self.slashed_reserve = reserve;
                    warn!(
                        staker = %staker,
                        amount = %slashed,
                        commitment = %commitment,
                        "Pending withdrawal slashed"
                    );
                }
                StakeSettlement {
                    staker,
                    verdict,
                    stake: assignment.amount,
                    slashed,
                }
            }
            Verdict::NoFraud => {
                let locked = bond
                    .locked
                    .checked_add(assignment.amount)
                    .ok_or(BondError::ArithmeticOverflow)?;
                self.bonds.entry(staker).or_default().locked = locked;
                StakeSettlement {
                    staker,
                    verdict,
                    stake: assignment.amount,
                    slashed: Amount::ZERO,
                }
            }
        };

        self.stakes.remove(&batch);
        info!(
            batch = batch.0,
            staker = %staker,
            verdict = %verdict,
            stake = %assignment.amount,
            "Batch stake settled"
        );
        Ok(settlement)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// The bond of `participant` (zero if unknown).
    #[must_use]
    pub fn bond(&self, participant: Address) -> Bond {
        self.bonds.get(&participant).cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn stake_of(&self, batch: BatchIndex) -> Option<&StakeAssignment> {
        self.stakes.get(&batch)
    }

    /// Who staked `batch`, if it is still assigned.
    #[must_use]
    pub fn stake_owner(&self, batch: BatchIndex) -> Option<Address> {
        self.stakes.get(&batch).map(|s| s.staker)
    }

    /// Whether `participant` could back one more batch right now.
    #[must_use]
    pub fn is_collateralized(&self, participant: Address, policy: &CollateralPolicy) -> bool {
        self.bond(participant).locked >= policy.required()
    }

    #[must_use]
    pub fn window(&self) -> &WithdrawalWindow {
        &self.window
    }

    #[must_use]
    pub fn slashed_reserve(&self) -> Amount {
        self.slashed_reserve
    }

    pub fn bonds(&self) -> impl Iterator<Item = (&Address, &Bond)> {
        self.bonds.iter()
    }

    pub fn stakes(&self) -> impl Iterator<Item = (&BatchIndex, &StakeAssignment)> {
        self.stakes.iter()
    }

    /// Everything the ledger owes: bonds, stakes in flight and the slashed
    /// reserve. `None` on overflow.
    #[must_use]
    pub fn liabilities(&self) -> Option<Amount> {
        let bonds = self
            .bonds
            .values()
            .try_fold(Amount::ZERO, |acc, b| acc.checked_add(b.total()?))?;
        let staked = self
            .stakes
            .values()
            .try_fold(Amount::ZERO, |acc, s| acc.checked_add(s.amount))?;
        bonds.checked_add(staked)?.checked_add(self.slashed_reserve)
    }
}
