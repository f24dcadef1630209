//! Scripted events, grouped per tick.

use crate::SimulationError;
use paxsim_types::{NodeId, Role, Topology, Value};
use tracing::warn;

/// A single scripted event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptEvent {
    /// The script client asks `proposer` to propose `value`.
    Propose { proposer: NodeId, value: Value },
    /// The node stops taking part in message exchange.
    Fail(NodeId),
    /// The node resumes message exchange.
    Recover(NodeId),
}

/// A PROPOSE issued by the script client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedProposal {
    pub proposer: NodeId,
    pub value: Value,
}

/// Everything the script does at one tick.
///
/// Failures and recoveries are applied before the tick's delivery. At most
/// one proposal is carried per tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptRecord {
    pub tick: u64,
    pub propose: Option<ScriptedProposal>,
    pub failed: Vec<NodeId>,
    pub recovered: Vec<NodeId>,
}

impl ScriptRecord {
    /// An empty record for `tick`.
    pub fn new(tick: u64) -> Self {
        Self {
            tick,
            propose: None,
            failed: Vec::new(),
            recovered: Vec::new(),
        }
    }

    pub fn with_propose(mut self, proposer: NodeId, value: impl Into<Value>) -> Self {
        self.propose = Some(ScriptedProposal {
            proposer,
            value: value.into(),
        });
        self
    }

    pub fn with_failure(mut self, node: NodeId) -> Self {
        self.failed.push(node);
        self
    }

    pub fn with_recovery(mut self, node: NodeId) -> Self {
        self.recovered.push(node);
        self
    }

    /// Add one event to this record.
    ///
    /// A second proposal replaces the first.
    pub fn push(&mut self, event: ScriptEvent) {
        match event {
            ScriptEvent::Propose { proposer, value } => {
                if let Some(previous) = &self.propose {
                    warn!(
                        tick = self.tick,
                        replaced = %previous.proposer,
                        proposer = %proposer,
                        "Multiple proposals scheduled for one tick; keeping the last"
                    );
                }
                self.propose = Some(ScriptedProposal { proposer, value });
            }
            ScriptEvent::Fail(node) => self.failed.push(node),
            ScriptEvent::Recover(node) => self.recovered.push(node),
        }
    }

    fn merge(&mut self, other: ScriptRecord) {
        if let Some(ScriptedProposal { proposer, value }) = other.propose {
            self.push(ScriptEvent::Propose { proposer, value });
        }
        self.failed.extend(other.failed);
        self.recovered.extend(other.recovered);
    }

    /// Every node this record refers to.
    fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.propose
            .iter()
            .map(|proposal| proposal.proposer)
            .chain(self.failed.iter().copied())
            .chain(self.recovered.iter().copied())
    }
}

/// Script records in strictly increasing tick order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    records: Vec<ScriptRecord>,
}

impl Script {
    /// Build a script from records in any order.
    ///
    /// Records are sorted by tick; records sharing a tick are merged in the
    /// order given.
    pub fn new(records: impl IntoIterator<Item = ScriptRecord>) -> Self {
        let mut sorted: Vec<ScriptRecord> = records.into_iter().collect();
        sorted.sort_by_key(|record| record.tick);

        let mut merged: Vec<ScriptRecord> = Vec::with_capacity(sorted.len());
        for record in sorted {
            match merged.last_mut() {
                Some(last) if last.tick == record.tick => last.merge(record),
                _ => merged.push(record),
            }
        }
        Self { records: merged }
    }

    /// Build a script from individual `(tick, event)` pairs.
    pub fn from_events(events: impl IntoIterator<Item = (u64, ScriptEvent)>) -> Self {
        Self::new(events.into_iter().map(|(tick, event)| {
            let mut record = ScriptRecord::new(tick);
            record.push(event);
            record
        }))
    }

    pub fn records(&self) -> &[ScriptRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Tick of the last record.
    pub fn last_tick(&self) -> Option<u64> {
        self.records.last().map(|record| record.tick)
    }

    /// Check that every node the script names is provisioned.
    ///
    /// Proposals must target a proposer. Failures and recoveries may target
    /// any provisioned proposer, acceptor or learner; clients cannot be
    /// scripted.
    pub fn validate(&self, topology: &Topology) -> Result<(), SimulationError> {
        for record in &self.records {
            for node in record.nodes() {
                if !topology.contains(node) {
                    return Err(SimulationError::NodeOutOfRange {
                        node,
                        role: node.role,
                        provisioned: topology.count(node.role),
                    });
                }
            }
            if let Some(proposal) = &record.propose {
                if proposal.proposer.role != Role::Proposer {
                    return Err(SimulationError::NodeOutOfRange {
                        node: proposal.proposer,
                        role: Role::Proposer,
                        provisioned: topology.num_proposers(),
                    });
                }
            }
        }
        Ok(())
    }
}
