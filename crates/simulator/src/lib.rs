//! Paxos Simulator
//!
//! Front end for the simulation framework: turns script files into
//! simulations and generates random, seed-deterministic scripts.
//!
//! # Architecture
//!
//! The simulator builds on `paxsim-simulation` to provide:
//!
//! - **Script files**: Parsing and rendering of the line-oriented script format
//! - **Workload Generation**: Seeded generators for proposals and failures
//! - **Configuration**: Generator setup and a TOML overlay for runs
//!
//! # Example
//!
//! ```
//! use paxsim_simulation::Simulation;
//! use paxsim_simulator::parse_script;
//!
//! let text = "1 3 0 20\n0 PROPOSE 1 42\n0 END\n";
//! let parsed = parse_script(text).unwrap();
//!
//! let mut simulation = Simulation::new(parsed.config, parsed.script).unwrap();
//! let report = simulation.run();
//! assert!(report.outcomes[0].consensus.is_some());
//! ```

pub mod config;
mod error;
mod script;
pub mod workload;

pub use config::{ConfigOverlay, SimulatorConfig, WorkloadConfig};
pub use error::{ConfigError, ScriptError};
pub use script::{parse_script, render_script, ParsedScript};
pub use workload::{
    generate_script, FailureWorkload, MixedWorkload, ProposalWorkload, WorkloadGenerator,
};
