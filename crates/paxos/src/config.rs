//! Protocol configuration.

use serde::{Deserialize, Serialize};

/// When an acceptor records a ballot as promised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromisePolicy {
    /// Only an accepted ballot raises the promised ballot. A PREPARE is
    /// answered without being remembered, so two PREPAREs with different
    /// ballots can both be promised before either is accepted.
    #[default]
    AcceptOnly,

    /// Classic Paxos: answering a PREPARE also raises the promised ballot,
    /// and an ACCEPT must carry at least the promised ballot.
    Strict,
}

/// Protocol configuration shared by all nodes of a simulation.
#[derive(Debug, Clone, Default)]
pub struct ProtocolConfig {
    /// How acceptors record promises.
    pub promise_policy: PromisePolicy,
}

impl ProtocolConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration with [`PromisePolicy::Strict`].
    pub fn strict() -> Self {
        Self::new().with_promise_policy(PromisePolicy::Strict)
    }

    /// Set the promise policy.
    pub fn with_promise_policy(mut self, promise_policy: PromisePolicy) -> Self {
        self.promise_policy = promise_policy;
        self
    }
}
