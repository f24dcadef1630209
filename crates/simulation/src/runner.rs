//! Deterministic tick-driven simulation runner.

use crate::{
    NetworkQueue, NodeRegistry, Script, ScriptRecord, SimulationConfig, SimulationError, Trace,
    TraceEvent,
};
use indexmap::IndexMap;
use paxsim_core::{Action, IdentityPredictor, Predictor, StateMachine};
use paxsim_messages::{Message, MessageKind};
use paxsim_paxos::{AcceptorState, ClientState, Decision, LearnerState, Node, ProposerState};
use paxsim_types::{Ballot, BallotAllocator, ClientIds, NodeId, Topology, Value};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// Statistics collected during simulation.
#[derive(Debug, Default, Clone)]
pub struct SimulationStats {
    /// Ticks executed.
    pub ticks: u64,
    /// Ticks on which nothing was deliverable.
    pub idle_ticks: u64,
    /// Total messages delivered.
    pub messages_delivered: u64,
    /// Messages delivered by kind, in order of first delivery.
    pub delivered_by_kind: IndexMap<MessageKind, u64>,
    /// Messages enqueued by nodes (scripted proposals excluded).
    pub messages_sent: u64,
    /// Scripted proposals queued because their proposer was failed.
    pub proposals_deferred: u64,
    /// Scripted failures applied.
    pub failures: u64,
    /// Scripted recoveries applied.
    pub recoveries: u64,
    /// Global round resets triggered by clients.
    pub round_resets: u64,
}

impl SimulationStats {
    /// Delivered messages of `kind`.
    pub fn delivered(&self, kind: MessageKind) -> u64 {
        self.delivered_by_kind.get(&kind).copied().unwrap_or(0)
    }
}

/// Where a proposer ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposerOutcome {
    pub proposer: NodeId,
    /// Value most recently requested by the script client.
    pub proposed: Option<Value>,
    /// The consensus of the proposer's current proposal, if reached.
    pub consensus: Option<Decision>,
    /// Ballots opened, retries included.
    pub rounds_started: u32,
}

impl ProposerOutcome {
    fn from_state(state: &ProposerState) -> Self {
        Self {
            proposer: state.id(),
            proposed: state.proposed_value().cloned(),
            consensus: state
                .decided()
                .filter(|_| state.has_consensus())
                .cloned(),
            rounds_started: state.rounds_started(),
        }
    }
}

impl fmt::Display for ProposerOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.proposed, &self.consensus) {
            (Some(proposed), Some(decision)) => write!(
                f,
                "{} reached consensus (proposed {}, accepted {} at ballot {})",
                self.proposer, proposed, decision.value, decision.ballot
            ),
            (Some(proposed), None) => write!(
                f,
                "{} did not reach consensus (proposed {})",
                self.proposer, proposed
            ),
            (None, _) => write!(f, "{} did not propose a value", self.proposer),
        }
    }
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub trace: Trace,
    pub outcomes: Vec<ProposerOutcome>,
    pub stats: SimulationStats,
    /// First tick that was not executed.
    pub final_tick: u64,
    /// Whether the run ended before `tmax` because the script was exhausted
    /// and the network drained.
    pub quiesced: bool,
}

impl SimulationReport {
    pub fn outcome(&self, proposer: NodeId) -> Option<&ProposerOutcome> {
        self.outcomes
            .iter()
            .find(|outcome| outcome.proposer == proposer)
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.trace)?;
        writeln!(f)?;
        for outcome in &self.outcomes {
            writeln!(f, "{outcome}")?;
        }
        Ok(())
    }
}

/// Deterministic simulation runner.
///
/// Each tick applies the script's failures and recoveries, then delivers at
/// most one message: the scripted PROPOSE if there is one, otherwise the
/// first deliverable message of the network queue. Given the same script,
/// produces identical traces every run.
pub struct Simulation {
    config: SimulationConfig,
    topology: Topology,
    registry: NodeRegistry,
    network: NetworkQueue,
    script: Script,

    /// Index of the next script record to apply.
    next_record: usize,

    /// Next tick to execute.
    tick: u64,

    /// Set once the run has ended, by budget or by quiescence.
    finished: bool,
    quiesced: bool,

    ballots: BallotAllocator,
    trace: Trace,
    stats: SimulationStats,
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("topology", &self.topology)
            .field("tick", &self.tick)
            .field("tmax", &self.config.tmax)
            .field("queued", &self.network.len())
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl Simulation {
    /// Create a simulation whose learners predict the learned value itself.
    pub fn new(config: SimulationConfig, script: Script) -> Result<Self, SimulationError> {
        Self::with_predictor(config, script, Arc::new(IdentityPredictor))
    }

    /// Create a simulation with a custom learner predictor.
    ///
    /// Fails if the script names a node the configuration does not provision.
    pub fn with_predictor(
        config: SimulationConfig,
        script: Script,
        predictor: Arc<dyn Predictor>,
    ) -> Result<Self, SimulationError> {
        let topology = config.topology();
        script.validate(&topology)?;

        let ballots = BallotAllocator::new();
        let clients = ClientIds::new();
        let registry =
            NodeRegistry::new(topology, &config.protocol, &ballots, &clients, predictor);

        info!(
            proposers = topology.num_proposers(),
            acceptors = topology.num_acceptors(),
            learners = topology.num_learners(),
            tmax = config.tmax,
            records = script.len(),
            promise_policy = ?config.protocol.promise_policy,
            "Created simulation"
        );

        Ok(Self {
            trace: Trace::new(config.tmax),
            config,
            topology,
            registry,
            network: NetworkQueue::new(),
            script,
            next_record: 0,
            tick: 0,
            finished: false,
            quiesced: false,
            ballots,
            stats: SimulationStats::default(),
        })
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Execution
    // ═══════════════════════════════════════════════════════════════════════

    /// Run until the tick budget is spent or the simulation quiesces.
    pub fn run(&mut self) -> SimulationReport {
        while self.step() {}
        self.report()
    }

    /// Execute one tick. Returns `false` once the run has ended.
    ///
    /// The run ends at `tmax`, or earlier when every script record has been
    /// applied and the network queue is empty.
    pub fn step(&mut self) -> bool {
        if self.finished {
            return false;
        }

        if self.tick >= self.config.tmax {
            debug!(
                tick = self.tick,
                queued = self.network.len(),
                "Tick budget reached"
            );
            self.finished = true;
            return false;
        }

        if self.script_exhausted() && self.network.is_empty() {
            info!(tick = self.tick, "Script exhausted and network drained");
            self.finished = true;
            self.quiesced = true;
            return false;
        }

        let tick = self.tick;
        let entries_before = self.trace.len();
        trace!(tick, queued = self.network.len(), "Executing tick");

        match self.take_record(tick) {
            Some(record) => self.apply_record(record),
            None => self.deliver_next(),
        }

        if self.trace.len() == entries_before {
            self.trace.push(tick, TraceEvent::Idle);
        }

        self.tick += 1;
        self.stats.ticks = self.tick;
        true
    }

    /// Queue a message as if a node had sent it.
    pub fn enqueue(&mut self, message: Message) {
        self.registry.ensure_client(message.dst());
        self.network.enqueue(message);
    }

    /// Fail or recover a node outside of the script.
    pub fn set_failed(&mut self, node: NodeId, failed: bool) -> Result<(), SimulationError> {
        self.registry.set_failed(node, failed)
    }

    fn script_exhausted(&self) -> bool {
        self.next_record >= self.script.len()
    }

    /// The script record for `tick`, if the next record is due.
    fn take_record(&mut self, tick: u64) -> Option<ScriptRecord> {
        let record = self.script.records().get(self.next_record)?;
        if record.tick != tick {
            return None;
        }
        self.next_record += 1;
        Some(record.clone())
    }

    fn apply_record(&mut self, record: ScriptRecord) {
        let tick = record.tick;

        for node in record.failed {
            if self.registry.set_failed(node, true).is_ok() {
                info!(tick, node = %node, "Node failed");
                self.stats.failures += 1;
                self.trace.push(tick, TraceEvent::Failed(node));
            }
        }

        for node in record.recovered {
            if self.registry.set_failed(node, false).is_ok() {
                info!(tick, node = %node, "Node recovered");
                self.stats.recoveries += 1;
                self.trace.push(tick, TraceEvent::Recovered(node));
            }
        }

        let Some(proposal) = record.propose else {
            self.deliver_next();
            return;
        };

        let message = Message::propose(NodeId::SCRIPT_CLIENT, proposal.proposer, proposal.value);
        if self.registry.is_failed(proposal.proposer) {
            warn!(
                tick,
                proposer = %proposal.proposer,
                "Proposer is failed, queueing scripted PROPOSE"
            );
            self.stats.proposals_deferred += 1;
            self.trace.push(tick, TraceEvent::Deferred(message.clone()));
            self.network.enqueue(message);
            self.deliver_next();
        } else {
            self.deliver(message);
        }
    }

    /// Deliver the first message whose endpoints are both healthy.
    fn deliver_next(&mut self) {
        let registry = &self.registry;
        match self.network.extract(|node| registry.is_failed(node)) {
            Some(message) => self.deliver(message),
            None => {
                trace!(
                    tick = self.tick,
                    blocked = self.network.blocked_count(|node| self.registry.is_failed(node)),
                    "Nothing deliverable"
                );
                self.stats.idle_ticks += 1;
            }
        }
    }

    fn deliver(&mut self, message: Message) {
        let tick = self.tick;
        let kind = message.kind();
        let dst = message.dst();

        debug!(tick, message = %message, "Delivering");
        self.trace.push(tick, TraceEvent::Delivered(message.clone()));
        self.stats.messages_delivered += 1;
        *self.stats.delivered_by_kind.entry(kind).or_insert(0) += 1;

        let Some(node) = self.registry.get_mut(dst) else {
            warn!(tick, node = %dst, "Message addressed to unknown node, dropped");
            return;
        };

        for action in node.handle(message) {
            self.process_action(action);
        }
    }

    fn process_action(&mut self, action: Action) {
        match action {
            Action::Send(message) => {
                self.stats.messages_sent += 1;
                self.registry.ensure_client(message.dst());
                self.network.enqueue(message);
            }
            Action::ResetRound => {
                info!(tick = self.tick, "Resetting acceptors and learners for a new round");
                self.stats.round_resets += 1;
                self.registry.reset_round();
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Inspection
    // ═══════════════════════════════════════════════════════════════════════

    /// Next tick to execute.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn network(&self) -> &NetworkQueue {
        &self.network
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    /// Highest ballot issued to any proposer so far.
    pub fn last_ballot(&self) -> Ballot {
        self.ballots.last_issued()
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.registry.get(id)
    }

    pub fn is_failed(&self, id: NodeId) -> bool {
        self.registry.is_failed(id)
    }

    pub fn proposer(&self, number: u32) -> Option<&ProposerState> {
        self.node(NodeId::proposer(number))?.as_proposer()
    }

    pub fn acceptor(&self, number: u32) -> Option<&AcceptorState> {
        self.node(NodeId::acceptor(number))?.as_acceptor()
    }

    pub fn learner(&self, number: u32) -> Option<&LearnerState> {
        self.node(NodeId::learner(number))?.as_learner()
    }

    pub fn client(&self, number: u32) -> Option<&ClientState> {
        self.node(NodeId::client(number))?.as_client()
    }

    /// Snapshot of the run so far.
    pub fn report(&self) -> SimulationReport {
        SimulationReport {
            trace: self.trace.clone(),
            outcomes: self
                .registry
                .proposers()
                .map(ProposerOutcome::from_state)
                .collect(),
            stats: self.stats.clone(),
            final_tick: self.tick,
            quiesced: self.quiesced,
        }
    }
}
