//! Counters shared between the nodes of one simulation.
//!
//! Each simulation creates its own allocators and hands clones to the nodes
//! that need them, so two simulations never observe each other's numbers.

use crate::{Ballot, NodeId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Monotonic counter with shared ownership.
///
/// Clones refer to the same counter.
#[derive(Debug, Clone, Default)]
pub struct SharedCounter(Arc<AtomicU64>);

impl SharedCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the counter and return the new value. The first call returns 1.
    pub fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// The most recently returned value, or 0 if none was issued.
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Issues ballots that are unique and strictly increasing across every
/// proposer holding a clone of this allocator.
#[derive(Debug, Clone, Default)]
pub struct BallotAllocator(SharedCounter);

impl BallotAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> Ballot {
        Ballot(self.0.next())
    }

    /// Highest ballot issued so far ([`Ballot::ZERO`] if none).
    pub fn last_issued(&self) -> Ballot {
        Ballot(self.0.current())
    }
}

/// Numbers the clients that learners spawn to receive predictions.
///
/// Numbering starts at 1; [`NodeId::SCRIPT_CLIENT`] keeps number 0.
#[derive(Debug, Clone, Default)]
pub struct ClientIds(SharedCounter);

impl ClientIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next client id, or `None` once client numbers are exhausted.
    pub fn next(&self) -> Option<NodeId> {
        u32::try_from(self.0.next()).ok().map(NodeId::client)
    }
}
