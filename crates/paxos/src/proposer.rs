//! Proposer role.
//!
//! Drives a value towards consensus:
//!
//! ```text
//! Idle ──PROPOSE──► Preparing ──PROMISE──► Accepting ──majority ACCEPTED──► Consensus
//!                       ▲                      │
//!                       └──majority REJECTED───┘
//! ```
//!
//! A majority of rejections is the protocol's only retry mechanism: the
//! proposer abandons the ballot, takes a fresh one from the shared allocator
//! and prepares again.

use paxsim_core::{Action, StateMachine};
use paxsim_messages::{Message, MessageKind};
use paxsim_types::{Ballot, BallotAllocator, NodeId, Topology, Value};
use tracing::{debug, info, warn};

/// Where a proposer is in its current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposerPhase {
    /// No value proposed yet.
    Idle,
    /// PREPARE broadcast, waiting for promises.
    Preparing,
    /// At least one ACCEPT sent for the current ballot.
    Accepting,
    /// A majority accepted; SUCCESS was broadcast.
    Consensus,
}

/// A value this proposer saw a majority accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub ballot: Ballot,
    pub value: Value,
}

/// Proposer state machine.
#[derive(Debug)]
pub struct ProposerState {
    id: NodeId,

    /// Registry sizes, for broadcasts and the majority check.
    topology: Topology,

    /// Ballot source shared with every other proposer of the simulation.
    ballots: BallotAllocator,

    /// Ballot of the round in progress ([`Ballot::ZERO`] before the first PROPOSE).
    current_ballot: Ballot,

    /// Value the client asked for.
    proposed_value: Option<Value>,

    /// Value sent in ACCEPTs. Replaced by any prior reported in a PROMISE.
    working_value: Option<Value>,

    accepted_count: u32,
    rejected_count: u32,
    has_consensus: bool,
    phase: ProposerPhase,

    /// Number of ballots this proposer opened, retries included.
    rounds_started: u32,

    /// Every consensus reached, oldest first.
    decisions: Vec<Decision>,
}

impl ProposerState {
    /// Create a proposer.
    ///
    /// # Arguments
    ///
    /// * `id` - This proposer's identity
    /// * `topology` - Registry sizes of the simulation
    /// * `ballots` - Allocator shared by all proposers of the simulation
    pub fn new(id: NodeId, topology: Topology, ballots: BallotAllocator) -> Self {
        Self {
            id,
            topology,
            ballots,
            current_ballot: Ballot::ZERO,
            proposed_value: None,
            working_value: None,
            accepted_count: 0,
            rejected_count: 0,
            has_consensus: false,
            phase: ProposerPhase::Idle,
            rounds_started: 0,
            decisions: Vec::new(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Accessors
    // ═══════════════════════════════════════════════════════════════════════

    pub fn current_ballot(&self) -> Ballot {
        self.current_ballot
    }

    pub fn proposed_value(&self) -> Option<&Value> {
        self.proposed_value.as_ref()
    }

    pub fn working_value(&self) -> Option<&Value> {
        self.working_value.as_ref()
    }

    pub fn accepted_count(&self) -> u32 {
        self.accepted_count
    }

    pub fn rejected_count(&self) -> u32 {
        self.rejected_count
    }

    pub fn has_consensus(&self) -> bool {
        self.has_consensus
    }

    pub fn phase(&self) -> ProposerPhase {
        self.phase
    }

    pub fn rounds_started(&self) -> u32 {
        self.rounds_started
    }

    /// Most recent consensus, if any.
    pub fn decided(&self) -> Option<&Decision> {
        self.decisions.last()
    }

    pub fn decisions(&self) -> &[Decision] {
        &self.decisions
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Message handlers
    // ═══════════════════════════════════════════════════════════════════════

    /// Handle PROPOSE: adopt the value and open a fresh ballot.
    pub fn on_propose(&mut self, message: &Message) -> Vec<Action> {
        let Some(value) = message.value() else {
            warn!(node = %self.id, "PROPOSE without a value");
            return vec![];
        };

        info!(node = %self.id, value = %value, "Proposing value");

        self.proposed_value = Some(value.clone());
        self.working_value = Some(value.clone());
        self.has_consensus = false;
        self.start_round()
    }

    /// Handle PROMISE: answer the promising acceptor with ACCEPT.
    ///
    /// A prior in the promise replaces the working value. This is the rule
    /// that keeps an already chosen value chosen.
    pub fn on_promise(&mut self, message: &Message) -> Vec<Action> {
        let Some(ballot) = message.ballot() else {
            warn!(node = %self.id, "PROMISE without a ballot");
            return vec![];
        };

        if let Some(prior) = message.prior() {
            debug!(
                node = %self.id,
                prior_ballot = prior.ballot.0,
                prior_value = %prior.value,
                "Adopting previously accepted value"
            );
            self.working_value = Some(prior.value.clone());
        }

        let Some(value) = self.working_value.clone() else {
            warn!(node = %self.id, ballot = ballot.0, "PROMISE before any value was proposed");
            return vec![];
        };

        if self.phase == ProposerPhase::Preparing {
            self.phase = ProposerPhase::Accepting;
        }

        vec![Action::Send(Message::accept(
            self.id,
            message.src(),
            ballot,
            value,
        ))]
    }

    /// Handle ACCEPTED: count it and announce consensus on a majority.
    pub fn on_accepted(&mut self, message: &Message) -> Vec<Action> {
        if self.has_consensus {
            debug!(node = %self.id, from = %message.src(), "Already at consensus, ignoring ACCEPTED");
            return vec![];
        }

        let (Some(ballot), Some(value)) = (message.ballot(), message.value()) else {
            warn!(node = %self.id, "ACCEPTED without ballot or value");
            return vec![];
        };

        self.accepted_count += 1;
        debug!(
            node = %self.id,
            ballot = ballot.0,
            accepted = self.accepted_count,
            needed = self.topology.quorum_size(),
            "ACCEPTED counted"
        );

        if !self.topology.is_majority(self.accepted_count) {
            return vec![];
        }

        info!(node = %self.id, ballot = ballot.0, value = %value, "Consensus reached");

        self.has_consensus = true;
        self.phase = ProposerPhase::Consensus;
        self.accepted_count = 0;
        self.decisions.push(Decision {
            ballot,
            value: value.clone(),
        });

        self.topology
            .learners()
            .map(|learner| Action::Send(Message::success(self.id, learner, ballot, value.clone())))
            .collect()
    }

    /// Handle REJECTED: count it and retry with a fresh ballot on a majority.
    pub fn on_rejected(&mut self, message: &Message) -> Vec<Action> {
        self.rejected_count += 1;
        debug!(
            node = %self.id,
            ballot = ?message.ballot(),
            rejected = self.rejected_count,
            "REJECTED counted"
        );

        if !self.topology.is_majority(self.rejected_count) {
            return vec![];
        }

        info!(
            node = %self.id,
            abandoned_ballot = self.current_ballot.0,
            "Majority rejected ballot, preparing again"
        );
        self.start_round()
    }

    /// Open a new ballot and broadcast PREPARE to every acceptor.
    fn start_round(&mut self) -> Vec<Action> {
        self.current_ballot = self.ballots.next();
        self.accepted_count = 0;
        self.rejected_count = 0;
        self.rounds_started += 1;
        self.phase = ProposerPhase::Preparing;

        debug!(node = %self.id, ballot = self.current_ballot.0, "Broadcasting PREPARE");

        let ballot = self.current_ballot;
        self.topology
            .acceptors()
            .map(|acceptor| Action::Send(Message::prepare(self.id, acceptor, ballot)))
            .collect()
    }
}

impl StateMachine for ProposerState {
    fn id(&self) -> NodeId {
        self.id
    }

    fn handle(&mut self, message: Message) -> Vec<Action> {
        match message.kind() {
            MessageKind::Propose => self.on_propose(&message),
            MessageKind::Promise => self.on_promise(&message),
            MessageKind::Accepted => self.on_accepted(&message),
            MessageKind::Rejected => self.on_rejected(&message),
            kind => {
                warn!(node = %self.id, kind = %kind, "Proposer ignoring unexpected message");
                vec![]
            }
        }
    }
}
