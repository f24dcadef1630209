//! Core types for the Paxos simulator.
//!
//! Everything in here is plain data: node identities, ballot numbers, opaque
//! proposal values, and the [`Topology`] that answers quorum questions. The
//! state machines and the scheduler build on these types but nothing in this
//! crate knows about messages or delivery.

mod allocator;
mod identifiers;
mod topology;
mod value;

pub use allocator::{BallotAllocator, ClientIds, SharedCounter};
pub use identifiers::{Ballot, NodeId, Role, UnknownRole};
pub use topology::Topology;
pub use value::Value;
