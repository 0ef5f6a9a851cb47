//! Static name registry implementing [`Resolver`].

use std::collections::HashMap;

use bondvault_types::{Address, CommitmentId, Resolver};

/// Fixed table of named authorities plus per-commitment evidence recorders.
#[derive(Debug, Clone, Default)]
pub struct NameRegistry {
    names: HashMap<String, Address>,
    recorders: HashMap<CommitmentId, Address>,
}

impl NameRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Self::register`].
    #[must_use]
    pub fn with(mut self, name: &str, address: Address) -> Self {
        self.register(name, address);
        self
    }

    pub fn register(&mut self, name: &str, address: Address) {
        self.names.insert(name.to_string(), address);
    }

    pub fn unregister(&mut self, name: &str) -> Option<Address> {
        self.names.remove(name)
    }

    /// Assign the adjudication agent for `commitment`, replacing any previous one.
    pub fn assign_recorder(&mut self, commitment: CommitmentId, recorder: Address) {
        self.recorders.insert(commitment, recorder);
    }
}

impl Resolver for NameRegistry {
    fn resolve(&self, name: &str) -> Option<Address> {
        self.names.get(name).copied()
    }

    fn evidence_recorder(&self, commitment: &CommitmentId) -> Option<Address> {
        self.recorders.get(commitment).copied()
    }
}
