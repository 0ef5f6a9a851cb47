//! Audit trail for ledger state changes.
//!
//! Every successful operation appends a [`LedgerEvent`] to an [`EventLog`].
//! The log is hash-chained: two replicas that applied the same operations in
//! the same order report the same [`EventLog::head_hex`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{Address, Amount, BatchIndex, BondError, CommitmentId, Result, Verdict};

/// The category of a ledger event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Deposited,
    Withdrawn,
    Staked,
    WithdrawalStarted,
    WithdrawalFinalized,
    BatchFinalized,
    BondSlashed,
    EvidenceRecorded,
    RewardClaimed,
    CollateralRaised,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deposited => write!(f, "DEPOSITED"),
            Self::Withdrawn => write!(f, "WITHDRAWN"),
            Self::Staked => write!(f, "STAKED"),
            Self::WithdrawalStarted => write!(f, "WITHDRAWAL_STARTED"),
            Self::WithdrawalFinalized => write!(f, "WITHDRAWAL_FINALIZED"),
            Self::BatchFinalized => write!(f, "BATCH_FINALIZED"),
            Self::BondSlashed => write!(f, "BOND_SLASHED"),
            Self::EvidenceRecorded => write!(f, "EVIDENCE_RECORDED"),
            Self::RewardClaimed => write!(f, "REWARD_CLAIMED"),
            Self::CollateralRaised => write!(f, "COLLATERAL_RAISED"),
        }
    }
}

/// A single successful state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    Deposited {
        participant: Address,
        amount: Amount,
    },
    Withdrawn {
        participant: Address,
        amount: Amount,
    },
    Staked {
        staker: Address,
        batch: BatchIndex,
        amount: Amount,
    },
    WithdrawalStarted {
        participant: Address,
        amount: Amount,
        requested_at: DateTime<Utc>,
    },
    WithdrawalFinalized {
        participant: Address,
        amount: Amount,
    },
    BatchFinalized {
        batch: BatchIndex,
        commitment: CommitmentId,
        staker: Address,
        verdict: Verdict,
        /// Refunded on `NoFraud`, forfeited to the pool on `Fraud`.
        amount: Amount,
    },
    BondSlashed {
        participant: Address,
        amount: Amount,
    },
    EvidenceRecorded {
        commitment: CommitmentId,
        submitter: Address,
    },
    RewardClaimed {
        commitment: CommitmentId,
        claimant: Address,
        amount: Amount,
    },
    CollateralRaised {
        from: Amount,
        to: Amount,
    },
}

impl LedgerEvent {
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Deposited { .. } => EventKind::Deposited,
            Self::Withdrawn { .. } => EventKind::Withdrawn,
            Self::Staked { .. } => EventKind::Staked,
            Self::WithdrawalStarted { .. } => EventKind::WithdrawalStarted,
            Self::WithdrawalFinalized { .. } => EventKind::WithdrawalFinalized,
            Self::BatchFinalized { .. } => EventKind::BatchFinalized,
            Self::BondSlashed { .. } => EventKind::BondSlashed,
            Self::EvidenceRecorded { .. } => EventKind::EvidenceRecorded,
            Self::RewardClaimed { .. } => EventKind::RewardClaimed,
            Self::CollateralRaised { .. } => EventKind::CollateralRaised,
        }
    }
}

/// Append-only, hash-chained event log.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<LedgerEvent>,
    head: [u8; 32],
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue a chain from a previously reported head.
    ///
    /// # Errors
    /// Returns [`BondError::Configuration`] unless `head_hex` is 32 hex bytes.
    pub fn resume(head_hex: &str) -> Result<Self> {
        let bytes = hex::decode(head_hex)
            .map_err(|e| BondError::Configuration(format!("bad event head: {e}")))?;
        let head: [u8; 32] = bytes
            .try_into()
            .map_err(|_| BondError::Configuration("event head must be 32 bytes".into()))?;
        Ok(Self {
            events: Vec::new(),
            head,
        })
    }

    /// Append an event and advance the chain head:
    /// `head' = SHA-256("bondvault:event:v1:" || head || json(event))`.
    pub fn record(&mut self, event: LedgerEvent) {
        let mut hasher = Sha256::new();
        hasher.update(b"bondvault:event:v1:");
        hasher.update(self.head);
        // Events contain only plain data; encoding cannot fail.
        if let Ok(bytes) = serde_json::to_vec(&event) {
            hasher.update(&bytes);
        }
        self.head.copy_from_slice(&hasher.finalize());
        self.events.push(event);
    }

    #[must_use]
    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[must_use]
    pub fn head(&self) -> [u8; 32] {
        self.head
    }

    #[must_use]
    pub fn head_hex(&self) -> String {
        hex::encode(self.head)
    }

    /// Events of one kind, in order.
    pub fn of_kind(&self, kind: EventKind) -> impl Iterator<Item = &LedgerEvent> {
        self.events.iter().filter(move |e| e.kind() == kind)
    }
}
