//! Workload generation for simulations.
//!
//! Provides seeded generators of script events for exercising the protocol
//! under competing proposals and failures.

mod failures;
mod proposals;

pub use failures::FailureWorkload;
pub use proposals::ProposalWorkload;

use crate::SimulatorConfig;
use paxsim_simulation::{Script, ScriptEvent};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

/// Trait for generating script events.
pub trait WorkloadGenerator {
    /// Generate a batch of `(tick, event)` pairs.
    fn generate_batch(&mut self, rng: &mut impl rand::Rng) -> Vec<(u64, ScriptEvent)>;
}

/// Mixed workload combining proposals and failures.
#[derive(Debug, Clone)]
pub struct MixedWorkload {
    proposals: ProposalWorkload,
    failures: FailureWorkload,
}

impl MixedWorkload {
    /// Create a new mixed workload.
    pub fn new(proposals: ProposalWorkload, failures: FailureWorkload) -> Self {
        Self {
            proposals,
            failures,
        }
    }

    /// Build the workload described by a simulator configuration.
    pub fn from_config(config: &SimulatorConfig) -> Self {
        let workload = &config.workload;
        Self::new(
            ProposalWorkload::new(config.proposers, config.tmax, workload.proposals),
            FailureWorkload::new(
                config.proposers,
                config.acceptors,
                config.tmax,
                workload.failures,
            )
            .with_max_outage(workload.max_outage)
            .with_proposer_ratio(workload.proposer_failure_ratio),
        )
    }
}

impl WorkloadGenerator for MixedWorkload {
    fn generate_batch(&mut self, rng: &mut impl rand::Rng) -> Vec<(u64, ScriptEvent)> {
        let mut events = self.proposals.generate_batch(rng);
        events.extend(self.failures.generate_batch(rng));
        events
    }
}

/// Generate the script described by `config`. The same seed always yields
/// the same script.
pub fn generate_script(config: &SimulatorConfig) -> Script {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let events = MixedWorkload::from_config(config).generate_batch(&mut rng);

    info!(
        seed = config.seed,
        events = events.len(),
        proposers = config.proposers,
        acceptors = config.acceptors,
        "Generated script"
    );

    Script::from_events(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WorkloadConfig;

    fn config(seed: u64) -> SimulatorConfig {
        SimulatorConfig::new(3, 5, 1)
            .with_tmax(120)
            .with_seed(seed)
            .with_workload(WorkloadConfig::default().with_proposals(4).with_failures(3))
    }

    #[test]
    fn test_same_seed_same_script() {
        assert_eq!(generate_script(&config(7)), generate_script(&config(7)));
    }

    #[test]
    fn test_generated_script_is_valid() {
        for seed in 0..32 {
            let config = config(seed);
            let script = generate_script(&config);

            let topology = config.to_simulation_config().topology();
            assert_eq!(script.validate(&topology), Ok(()), "seed {seed}");
            assert!(script.last_tick().unwrap() < config.tmax, "seed {seed}");

            let proposals = script
                .records()
                .iter()
                .filter(|record| record.propose.is_some())
                .count();
            assert!((1..=4).contains(&proposals), "seed {seed}");
        }
    }
}
