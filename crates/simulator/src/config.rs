//! Configuration types for the simulator.

use crate::ConfigError;
use paxsim_paxos::{PromisePolicy, ProtocolConfig};
use paxsim_simulation::SimulationConfig;
use serde::Deserialize;
use std::path::Path;

/// Configuration for generating a random script.
#[derive(Clone, Debug)]
pub struct SimulatorConfig {
    /// Number of proposers.
    pub proposers: u32,

    /// Number of acceptors.
    pub acceptors: u32,

    /// Number of learners.
    pub learners: u32,

    /// Tick budget written into the script header.
    pub tmax: u64,

    /// Workload configuration.
    pub workload: WorkloadConfig,

    /// Random seed for deterministic generation.
    pub seed: u64,
}

impl SimulatorConfig {
    /// Create a new simulator configuration.
    pub fn new(proposers: u32, acceptors: u32, learners: u32) -> Self {
        Self {
            proposers,
            acceptors,
            learners,
            tmax: 100,
            workload: WorkloadConfig::default(),
            seed: 12345,
        }
    }

    /// Set the tick budget.
    pub fn with_tmax(mut self, tmax: u64) -> Self {
        self.tmax = tmax;
        self
    }

    /// Set the workload configuration.
    pub fn with_workload(mut self, workload: WorkloadConfig) -> Self {
        self.workload = workload;
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Convert to a SimulationConfig for the underlying simulation.
    pub fn to_simulation_config(&self) -> SimulationConfig {
        SimulationConfig::new(self.proposers, self.acceptors, self.learners, self.tmax)
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self::new(2, 3, 1)
    }
}

/// Workload configuration.
#[derive(Clone, Debug)]
pub struct WorkloadConfig {
    /// Number of PROPOSE events.
    pub proposals: usize,

    /// Number of fail/recover pairs.
    pub failures: usize,

    /// Longest outage, in ticks.
    pub max_outage: u64,

    /// Share of failures that hit a proposer rather than an acceptor (0.0 to 1.0).
    pub proposer_failure_ratio: f64,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            proposals: 2,
            failures: 1,
            max_outage: 20,
            proposer_failure_ratio: 0.2,
        }
    }
}

impl WorkloadConfig {
    /// Set the number of proposals.
    pub fn with_proposals(mut self, proposals: usize) -> Self {
        self.proposals = proposals;
        self
    }

    /// Set the number of fail/recover pairs.
    pub fn with_failures(mut self, failures: usize) -> Self {
        self.failures = failures;
        self
    }

    /// Set the longest outage.
    pub fn with_max_outage(mut self, ticks: u64) -> Self {
        self.max_outage = ticks.max(1);
        self
    }

    /// Set the share of proposer failures.
    pub fn with_proposer_failure_ratio(mut self, ratio: f64) -> Self {
        self.proposer_failure_ratio = ratio.clamp(0.0, 1.0);
        self
    }
}

/// Optional settings read from a TOML file and laid over a script's own
/// configuration.
///
/// ```toml
/// strict_promises = true
/// tmax = 200
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverlay {
    /// Use the strict promise policy.
    pub strict_promises: Option<bool>,

    /// Replace the script's tick budget.
    pub tmax: Option<u64>,
}

impl ConfigOverlay {
    /// Parse an overlay from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse an overlay file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Apply the overlay; unset fields leave `config` untouched.
    pub fn apply(&self, mut config: SimulationConfig) -> SimulationConfig {
        if let Some(tmax) = self.tmax {
            config.tmax = tmax;
        }
        if let Some(strict) = self.strict_promises {
            let policy = if strict {
                PromisePolicy::Strict
            } else {
                PromisePolicy::AcceptOnly
            };
            config.protocol = ProtocolConfig::new().with_promise_policy(policy);
        }
        config
    }
}
