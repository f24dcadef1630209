//! Paxos Simulator CLI
//!
//! Run scripted Paxos simulations and generate random scripts.
//!
//! # Example
//!
//! ```bash
//! # Run a script and print the trace
//! paxsim run scenario.txt
//!
//! # Same script with classic promise semantics and a longer budget
//! paxsim run scenario.txt --strict-promises --config overrides.toml
//!
//! # Generate a reproducible random script
//! paxsim generate --seed 42 --proposers 2 --acceptors 5 --failures 2 > random.txt
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use paxsim_paxos::ProtocolConfig;
use paxsim_simulation::Simulation;
use paxsim_simulator::{
    generate_script, parse_script, render_script, ConfigOverlay, SimulatorConfig, WorkloadConfig,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Paxos Simulator
///
/// Runs deterministic single-decree Paxos simulations. The same script always
/// produces the same trace.
#[derive(Parser, Debug)]
#[command(name = "paxsim")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a script file and print the trace
    Run {
        /// Script file
        script: PathBuf,

        /// TOML file overriding `tmax` and `strict_promises`
        #[arg(long)]
        config: Option<PathBuf>,

        /// Acceptors remember PREPARE ballots (classic Paxos promises)
        #[arg(long)]
        strict_promises: bool,

        /// Print only the per-proposer summary
        #[arg(short, long)]
        quiet: bool,
    },

    /// Print a random script
    Generate {
        /// Random seed for reproducible results. When omitted, a random seed is used.
        #[arg(long)]
        seed: Option<u64>,

        /// Number of proposers
        #[arg(short = 'p', long, default_value = "2")]
        proposers: u32,

        /// Number of acceptors
        #[arg(short = 'a', long, default_value = "3")]
        acceptors: u32,

        /// Number of learners
        #[arg(short = 'l', long, default_value = "0")]
        learners: u32,

        /// Tick budget
        #[arg(short = 't', long, default_value = "100")]
        tmax: u64,

        /// Number of PROPOSE events
        #[arg(long, default_value = "2")]
        proposals: usize,

        /// Number of fail/recover pairs
        #[arg(long, default_value = "1")]
        failures: usize,

        /// Longest outage in ticks
        #[arg(long, default_value = "20")]
        max_outage: u64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            script,
            config,
            strict_promises,
            quiet,
        } => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| EnvFilter::new("warn,paxsim_simulator=info")),
                )
                .with_writer(std::io::stderr)
                .init();

            let text = std::fs::read_to_string(&script)
                .with_context(|| format!("failed to read script {}", script.display()))?;
            let parsed = parse_script(&text)
                .with_context(|| format!("invalid script {}", script.display()))?;

            let mut sim_config = parsed.config;
            if let Some(path) = &config {
                sim_config = ConfigOverlay::load(path)?.apply(sim_config);
            }
            if strict_promises {
                sim_config = sim_config.with_protocol(ProtocolConfig::strict());
            }

            info!(
                script = %script.display(),
                proposers = sim_config.proposers,
                acceptors = sim_config.acceptors,
                learners = sim_config.learners,
                tmax = sim_config.tmax,
                "Starting simulation"
            );

            let mut simulation = Simulation::new(sim_config, parsed.script)?;
            let report = simulation.run();

            if quiet {
                for outcome in &report.outcomes {
                    println!("{outcome}");
                }
            } else {
                print!("{report}");
            }

            info!(
                ticks = report.stats.ticks,
                delivered = report.stats.messages_delivered,
                failures = report.stats.failures,
                recoveries = report.stats.recoveries,
                round_resets = report.stats.round_resets,
                quiesced = report.quiesced,
                "Simulation finished"
            );
            for (kind, count) in &report.stats.delivered_by_kind {
                info!(kind = %kind, count, "Delivered");
            }
        }

        Commands::Generate {
            seed,
            proposers,
            acceptors,
            learners,
            tmax,
            proposals,
            failures,
            max_outage,
        } => {
            // No tracing for generate: the script goes to stdout
            let seed = seed.unwrap_or_else(rand::random);

            let config = SimulatorConfig::new(proposers, acceptors, learners)
                .with_tmax(tmax)
                .with_seed(seed)
                .with_workload(
                    WorkloadConfig::default()
                        .with_proposals(proposals)
                        .with_failures(failures)
                        .with_max_outage(max_outage),
                );

            let script = generate_script(&config);
            println!("# seed {seed}");
            print!("{}", render_script(&config.to_simulation_config(), &script));
        }
    }

    Ok(())
}
