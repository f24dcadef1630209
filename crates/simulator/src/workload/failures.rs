//! FAIL/RECOVER event generator.

use crate::workload::WorkloadGenerator;
use paxsim_simulation::ScriptEvent;
use paxsim_types::NodeId;

/// Generates outages: a FAIL followed by a RECOVER of the same node.
///
/// The RECOVER is dropped when it would fall at or beyond `tmax`, leaving the
/// node down for the rest of the run.
#[derive(Debug, Clone)]
pub struct FailureWorkload {
    proposers: u32,
    acceptors: u32,
    tmax: u64,
    count: usize,

    /// Longest outage, in ticks.
    max_outage: u64,

    /// Probability that an outage hits a proposer rather than an acceptor.
    proposer_ratio: f64,
}

impl FailureWorkload {
    /// Create a new failure generator.
    pub fn new(proposers: u32, acceptors: u32, tmax: u64, count: usize) -> Self {
        Self {
            proposers,
            acceptors,
            tmax,
            count,
            max_outage: 20,
            proposer_ratio: 0.2,
        }
    }

    /// Set the longest outage.
    pub fn with_max_outage(mut self, ticks: u64) -> Self {
        self.max_outage = ticks.max(1);
        self
    }

    /// Set the probability of proposer outages.
    pub fn with_proposer_ratio(mut self, ratio: f64) -> Self {
        self.proposer_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    fn pick_node(&self, rng: &mut impl rand::Rng) -> Option<NodeId> {
        let proposer = match (self.proposers, self.acceptors) {
            (0, 0) => return None,
            (0, _) => false,
            (_, 0) => true,
            _ => rng.gen_bool(self.proposer_ratio),
        };
        Some(if proposer {
            NodeId::proposer(rng.gen_range(1..=self.proposers))
        } else {
            NodeId::acceptor(rng.gen_range(1..=self.acceptors))
        })
    }
}

impl WorkloadGenerator for FailureWorkload {
    fn generate_batch(&mut self, rng: &mut impl rand::Rng) -> Vec<(u64, ScriptEvent)> {
        if self.tmax == 0 {
            return vec![];
        }

        let mut events = Vec::with_capacity(self.count * 2);
        for _ in 0..self.count {
            let Some(node) = self.pick_node(rng) else {
                break;
            };
            let down = rng.gen_range(0..self.tmax);
            let up = down + rng.gen_range(1..=self.max_outage);

            events.push((down, ScriptEvent::Fail(node)));
            if up < self.tmax {
                events.push((up, ScriptEvent::Recover(node)));
            }
        }
        events
    }
}
