//! Deterministic simulation runner.
//!
//! This crate drives the Paxos state machines tick by tick. Given the same
//! script, it produces identical traces every run.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                     Simulation                          │
//! │                                                         │
//! │  ┌────────────────────────┐  ┌────────────────────────┐ │
//! │  │ Script                 │  │ NetworkQueue (FIFO)    │ │
//! │  │ records ordered by     │  │ skips messages to or   │ │
//! │  │ tick: FAIL, RECOVER,   │  │ from failed nodes      │ │
//! │  │ PROPOSE                │  │                        │ │
//! │  └───────────┬────────────┘  └───────────┬────────────┘ │
//! │              │  one message per tick     │              │
//! │              └─────────────┬─────────────┘              │
//! │                            ▼                            │
//! │  ┌────────────────────────────────────────────────────┐ │
//! │  │  NodeRegistry: proposers, acceptors, learners,     │ │
//! │  │  clients. Each handles messages sequentially       │ │
//! │  └────────────────────────┬───────────────────────────┘ │
//! │                           ▼                             │
//! │  ┌────────────────────────────────────────────────────┐ │
//! │  │  Actions → enqueue messages / reset round          │ │
//! │  └────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod network;
mod registry;
mod runner;
mod script;
mod trace;

pub use config::SimulationConfig;
pub use error::SimulationError;
pub use network::NetworkQueue;
pub use registry::NodeRegistry;
pub use runner::{ProposerOutcome, Simulation, SimulationReport, SimulationStats};
pub use script::{Script, ScriptEvent, ScriptRecord, ScriptedProposal};
pub use trace::{Trace, TraceEntry, TraceEvent};
