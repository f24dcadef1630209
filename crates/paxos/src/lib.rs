//! Single-decree Paxos state machines.
//!
//! This crate provides the protocol roles as synchronous state machines that
//! can be driven by any scheduler.
//!
//! # Architecture
//!
//! Every role reacts to one delivered message at a time:
//!
//! - Proposer: `PROPOSE` → broadcast `PREPARE`; `PROMISE` → `ACCEPT`;
//!   majority of `ACCEPTED` → broadcast `SUCCESS` to learners; majority of
//!   `REJECTED` → retry with a fresh ballot
//! - Acceptor: `PREPARE` → `PROMISE` (or silence); `ACCEPT` → `ACCEPTED` or `REJECTED`
//! - Learner: `SUCCESS` → predict the next value and send `PREDICTED` to a new client
//! - Client: `PREDICTED` → ask for a round reset
//!
//! All I/O is performed by the scheduler via the returned `Action`s. Roles are
//! variants of one [`Node`] type.

mod acceptor;
mod client;
mod config;
mod learner;
mod node;
mod proposer;

pub use acceptor::{AcceptorState, Promised};
pub use client::ClientState;
pub use config::{PromisePolicy, ProtocolConfig};
pub use learner::LearnerState;
pub use node::{Node, NodeRole};
pub use proposer::{Decision, ProposerPhase, ProposerState};
