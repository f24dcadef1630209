//! PROPOSE event generator.

use crate::workload::WorkloadGenerator;
use paxsim_simulation::ScriptEvent;
use paxsim_types::{NodeId, Value};

/// Generates PROPOSE events for random proposers.
///
/// Proposals land in the first half of the tick budget so that the protocol
/// has room to finish before `tmax`.
#[derive(Debug, Clone)]
pub struct ProposalWorkload {
    proposers: u32,
    tmax: u64,
    count: usize,

    /// Proposed values are drawn from `1..=max_value`.
    max_value: i64,
}

impl ProposalWorkload {
    /// Create a new proposal generator.
    pub fn new(proposers: u32, tmax: u64, count: usize) -> Self {
        Self {
            proposers,
            tmax,
            count,
            max_value: 100,
        }
    }

    /// Set the largest proposed value.
    pub fn with_max_value(mut self, max_value: i64) -> Self {
        self.max_value = max_value.max(1);
        self
    }
}

impl WorkloadGenerator for ProposalWorkload {
    fn generate_batch(&mut self, rng: &mut impl rand::Rng) -> Vec<(u64, ScriptEvent)> {
        if self.proposers == 0 || self.tmax == 0 {
            return vec![];
        }

        let horizon = (self.tmax / 2).max(1);
        (0..self.count)
            .map(|_| {
                let tick = rng.gen_range(0..horizon);
                let proposer = NodeId::proposer(rng.gen_range(1..=self.proposers));
                let value = Value::from(rng.gen_range(1..=self.max_value));
                (tick, ScriptEvent::Propose { proposer, value })
            })
            .collect()
    }
}
