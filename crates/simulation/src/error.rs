//! Error types for the simulation runner.

use paxsim_types::{NodeId, Role};
use thiserror::Error;

/// Errors raised while setting up or steering a simulation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    /// A script or caller named a node beyond the provisioned registry.
    #[error("{node} is out of range: only {provisioned} {role} node(s) are provisioned")]
    NodeOutOfRange {
        node: NodeId,
        role: Role,
        provisioned: u32,
    },

    /// A client that has not been created yet.
    #[error("unknown node {0}")]
    UnknownNode(NodeId),
}
