//! Configuration types for a simulation run.

use paxsim_paxos::ProtocolConfig;
use paxsim_types::Topology;

/// Configuration for a simulation run.
#[derive(Clone, Debug)]
pub struct SimulationConfig {
    /// Number of proposers.
    pub proposers: u32,

    /// Number of acceptors.
    pub acceptors: u32,

    /// Number of learners.
    pub learners: u32,

    /// Tick budget. Ticks `0..tmax` are simulated at most.
    pub tmax: u64,

    /// Protocol options shared by all nodes.
    pub protocol: ProtocolConfig,
}

impl SimulationConfig {
    /// Create a new simulation configuration.
    pub fn new(proposers: u32, acceptors: u32, learners: u32, tmax: u64) -> Self {
        Self {
            proposers,
            acceptors,
            learners,
            tmax,
            protocol: ProtocolConfig::default(),
        }
    }

    /// Set the tick budget.
    pub fn with_tmax(mut self, tmax: u64) -> Self {
        self.tmax = tmax;
        self
    }

    /// Set the protocol options.
    pub fn with_protocol(mut self, protocol: ProtocolConfig) -> Self {
        self.protocol = protocol;
        self
    }

    /// Registry sizes as a [`Topology`].
    pub fn topology(&self) -> Topology {
        Topology::new(self.proposers, self.acceptors, self.learners)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::new(1, 3, 0, 50)
    }
}
