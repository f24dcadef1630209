//! Registry sizes and quorum arithmetic.

use crate::{NodeId, Role};
use serde::{Deserialize, Serialize};

/// How many nodes of each role a simulation provisions.
///
/// Single source of truth for "who do I broadcast to" and "is this a
/// majority". Clients are created on demand and are not counted here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    proposers: u32,
    acceptors: u32,
    learners: u32,
}

impl Topology {
    pub fn new(proposers: u32, acceptors: u32, learners: u32) -> Self {
        Self {
            proposers,
            acceptors,
            learners,
        }
    }

    pub fn num_proposers(&self) -> u32 {
        self.proposers
    }

    pub fn num_acceptors(&self) -> u32 {
        self.acceptors
    }

    pub fn num_learners(&self) -> u32 {
        self.learners
    }

    /// Number of provisioned nodes for a role. Always 0 for clients.
    pub fn count(&self, role: Role) -> u32 {
        match role {
            Role::Proposer => self.proposers,
            Role::Acceptor => self.acceptors,
            Role::Learner => self.learners,
            Role::Client => 0,
        }
    }

    /// Whether `id` names a provisioned proposer, acceptor or learner.
    pub fn contains(&self, id: NodeId) -> bool {
        id.number >= 1 && id.number <= self.count(id.role)
    }

    pub fn proposers(&self) -> impl Iterator<Item = NodeId> {
        (1..=self.proposers).map(NodeId::proposer)
    }

    pub fn acceptors(&self) -> impl Iterator<Item = NodeId> {
        (1..=self.acceptors).map(NodeId::acceptor)
    }

    pub fn learners(&self) -> impl Iterator<Item = NodeId> {
        (1..=self.learners).map(NodeId::learner)
    }

    // Quorum arithmetic

    /// `floor(A / 2)`: the largest response count that is not yet a majority.
    pub fn majority_floor(&self) -> u32 {
        self.acceptors / 2
    }

    /// Check if `count` acceptor responses form a majority (`count > floor(A / 2)`).
    ///
    /// For an even acceptor count this needs strictly more than half, e.g. 3 of 4.
    pub fn is_majority(&self, count: u32) -> bool {
        count > self.majority_floor()
    }

    /// Smallest majority: `floor(A / 2) + 1`.
    pub fn quorum_size(&self) -> u32 {
        self.majority_floor() + 1
    }
}
