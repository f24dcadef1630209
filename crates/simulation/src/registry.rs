//! Node registries, one per role.

use crate::SimulationError;
use paxsim_core::Predictor;
use paxsim_paxos::{
    AcceptorState, ClientState, LearnerState, Node, ProposerState, ProtocolConfig,
};
use paxsim_types::{BallotAllocator, ClientIds, NodeId, Role, Topology};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Every node of a simulation, addressable by [`NodeId`].
///
/// Proposers, acceptors and learners are provisioned up front and indexed by
/// `number - 1`. Clients are created on demand the first time something is
/// addressed to them; the script client `C0` exists from the start.
#[derive(Debug)]
pub struct NodeRegistry {
    proposers: Vec<Node>,
    acceptors: Vec<Node>,
    learners: Vec<Node>,
    clients: BTreeMap<u32, Node>,
}

impl NodeRegistry {
    /// Provision nodes for `topology`.
    ///
    /// All proposers draw ballots from `ballots`; all learners draw client
    /// identities from `clients`.
    pub fn new(
        topology: Topology,
        protocol: &ProtocolConfig,
        ballots: &BallotAllocator,
        clients: &ClientIds,
        predictor: Arc<dyn Predictor>,
    ) -> Self {
        let proposers = topology
            .proposers()
            .map(|id| ProposerState::new(id, topology, ballots.clone()).into())
            .collect();
        let acceptors = topology
            .acceptors()
            .map(|id| AcceptorState::new(id, protocol.promise_policy).into())
            .collect();
        let learners = topology
            .learners()
            .map(|id| LearnerState::new(id, predictor.clone(), clients.clone()).into())
            .collect();

        let mut registry = Self {
            proposers,
            acceptors,
            learners,
            clients: BTreeMap::new(),
        };
        registry.ensure_client(NodeId::SCRIPT_CLIENT);
        registry
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        match id.role {
            Role::Proposer => self.proposers.get(id.index()?),
            Role::Acceptor => self.acceptors.get(id.index()?),
            Role::Learner => self.learners.get(id.index()?),
            Role::Client => self.clients.get(&id.number),
        }
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        match id.role {
            Role::Proposer => self.proposers.get_mut(id.index()?),
            Role::Acceptor => self.acceptors.get_mut(id.index()?),
            Role::Learner => self.learners.get_mut(id.index()?),
            Role::Client => self.clients.get_mut(&id.number),
        }
    }

    /// Create client `id` if it does not exist yet.
    pub fn ensure_client(&mut self, id: NodeId) {
        if id.is_client() {
            self.clients
                .entry(id.number)
                .or_insert_with(|| ClientState::new(id).into());
        }
    }

    /// Whether `id` is currently failed. Unknown nodes count as healthy.
    pub fn is_failed(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Node::is_failed)
    }

    pub fn set_failed(&mut self, id: NodeId, failed: bool) -> Result<(), SimulationError> {
        let provisioned = match id.role {
            Role::Proposer => self.proposers.len(),
            Role::Acceptor => self.acceptors.len(),
            Role::Learner => self.learners.len(),
            Role::Client => 0,
        };
        match self.get_mut(id) {
            Some(node) => {
                node.set_failed(failed);
                Ok(())
            }
            None if id.is_client() => Err(SimulationError::UnknownNode(id)),
            None => Err(SimulationError::NodeOutOfRange {
                node: id,
                role: id.role,
                provisioned: provisioned as u32,
            }),
        }
    }

    /// Reset every acceptor and learner to its initial round state.
    pub fn reset_round(&mut self) {
        for node in self.acceptors.iter_mut().chain(self.learners.iter_mut()) {
            node.reset_round();
        }
    }

    pub fn proposers(&self) -> impl Iterator<Item = &ProposerState> {
        self.proposers.iter().filter_map(Node::as_proposer)
    }

    pub fn acceptors(&self) -> impl Iterator<Item = &AcceptorState> {
        self.acceptors.iter().filter_map(Node::as_acceptor)
    }

    pub fn learners(&self) -> impl Iterator<Item = &LearnerState> {
        self.learners.iter().filter_map(Node::as_learner)
    }

    /// Clients in number order, the script client first.
    pub fn clients(&self) -> impl Iterator<Item = &ClientState> {
        self.clients.values().filter_map(Node::as_client)
    }
}
