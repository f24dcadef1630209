//! A node: identity, failure flag and exactly one role.

use crate::{AcceptorState, ClientState, LearnerState, ProposerState};
use paxsim_core::{Action, StateMachine};
use paxsim_messages::Message;
use paxsim_types::{NodeId, Role};

/// The role-specific state of a node.
#[derive(Debug)]
pub enum NodeRole {
    Proposer(ProposerState),
    Acceptor(AcceptorState),
    Learner(LearnerState),
    Client(ClientState),
}

impl NodeRole {
    fn state_machine(&self) -> &dyn StateMachine {
        match self {
            NodeRole::Proposer(state) => state,
            NodeRole::Acceptor(state) => state,
            NodeRole::Learner(state) => state,
            NodeRole::Client(state) => state,
        }
    }

    fn state_machine_mut(&mut self) -> &mut dyn StateMachine {
        match self {
            NodeRole::Proposer(state) => state,
            NodeRole::Acceptor(state) => state,
            NodeRole::Learner(state) => state,
            NodeRole::Client(state) => state,
        }
    }
}

/// A simulated node.
///
/// The failure flag belongs to the node, but it is only consulted by the
/// scheduler: a failed node simply never gets messages delivered.
#[derive(Debug)]
pub struct Node {
    failed: bool,
    role: NodeRole,
}

impl Node {
    pub fn new(role: NodeRole) -> Self {
        Self {
            failed: false,
            role,
        }
    }

    pub fn role_kind(&self) -> Role {
        match self.role {
            NodeRole::Proposer(_) => Role::Proposer,
            NodeRole::Acceptor(_) => Role::Acceptor,
            NodeRole::Learner(_) => Role::Learner,
            NodeRole::Client(_) => Role::Client,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.failed
    }

    pub fn set_failed(&mut self, failed: bool) {
        self.failed = failed;
    }

    pub fn as_proposer(&self) -> Option<&ProposerState> {
        match &self.role {
            NodeRole::Proposer(state) => Some(state),
            _ => None,
        }
    }

    pub fn as_acceptor(&self) -> Option<&AcceptorState> {
        match &self.role {
            NodeRole::Acceptor(state) => Some(state),
            _ => None,
        }
    }

    pub fn as_learner(&self) -> Option<&LearnerState> {
        match &self.role {
            NodeRole::Learner(state) => Some(state),
            _ => None,
        }
    }

    pub fn as_client(&self) -> Option<&ClientState> {
        match &self.role {
            NodeRole::Client(state) => Some(state),
            _ => None,
        }
    }

    /// Return the round-scoped state to its initial value.
    ///
    /// Acceptors drop their promise and learners their prediction; proposers
    /// and clients are unaffected.
    pub fn reset_round(&mut self) {
        match &mut self.role {
            NodeRole::Acceptor(state) => state.reset(),
            NodeRole::Learner(state) => state.reset(),
            NodeRole::Proposer(_) | NodeRole::Client(_) => {}
        }
    }
}

impl From<ProposerState> for Node {
    fn from(state: ProposerState) -> Self {
        Node::new(NodeRole::Proposer(state))
    }
}

impl From<AcceptorState> for Node {
    fn from(state: AcceptorState) -> Self {
        Node::new(NodeRole::Acceptor(state))
    }
}

impl From<LearnerState> for Node {
    fn from(state: LearnerState) -> Self {
        Node::new(NodeRole::Learner(state))
    }
}

impl From<ClientState> for Node {
    fn from(state: ClientState) -> Self {
        Node::new(NodeRole::Client(state))
    }
}

impl StateMachine for Node {
    fn id(&self) -> NodeId {
        self.role.state_machine().id()
    }

    fn handle(&mut self, message: Message) -> Vec<Action> {
        self.role.state_machine_mut().handle(message)
    }
}
