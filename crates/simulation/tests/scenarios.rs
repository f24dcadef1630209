//! End-to-end runs with fully predictable traces.

use paxsim_core::Predictor;
use paxsim_messages::MessageKind;
use paxsim_paxos::{ProposerPhase, ProtocolConfig};
use paxsim_simulation::{Script, ScriptRecord, Simulation, SimulationConfig, TraceEvent};
use paxsim_test_helpers::RecordingPredictor;
use paxsim_types::{Ballot, NodeId, Value};
use std::sync::Arc;

fn p(n: u32) -> NodeId {
    NodeId::proposer(n)
}

fn a(n: u32) -> NodeId {
    NodeId::acceptor(n)
}

#[test]
fn test_single_proposer_reaches_consensus() {
    let script = Script::new([ScriptRecord::new(0).with_propose(p(1), 42)]);
    let mut sim = Simulation::new(SimulationConfig::new(1, 3, 0, 20), script).unwrap();
    let report = sim.run();

    assert_eq!(
        report.trace.lines(),
        vec![
            "00: C0 -> P1 PROPOSE value=42",
            "01: P1 -> A1 PREPARE ballot=1",
            "02: P1 -> A2 PREPARE ballot=1",
            "03: P1 -> A3 PREPARE ballot=1",
            "04: A1 -> P1 PROMISE ballot=1",
            "05: A2 -> P1 PROMISE ballot=1",
            "06: A3 -> P1 PROMISE ballot=1",
            "07: P1 -> A1 ACCEPT ballot=1 value=42",
            "08: P1 -> A2 ACCEPT ballot=1 value=42",
            "09: P1 -> A3 ACCEPT ballot=1 value=42",
            "10: A1 -> P1 ACCEPTED ballot=1 value=42",
            "11: A2 -> P1 ACCEPTED ballot=1 value=42",
            "12: A3 -> P1 ACCEPTED ballot=1 value=42",
        ]
    );
    assert!(report.quiesced);
    assert_eq!(report.final_tick, 13);

    let outcome = report.outcome(p(1)).unwrap();
    assert_eq!(outcome.proposed, Some(Value::from(42)));
    assert_eq!(outcome.consensus.as_ref().unwrap().value, Value::from(42));
    assert_eq!(outcome.consensus.as_ref().unwrap().ballot, Ballot(1));
    assert_eq!(outcome.rounds_started, 1);

    for n in 1..=3 {
        let promised = sim.acceptor(n).unwrap().promised();
        assert_eq!(promised.ballot, Ballot(1));
        assert_eq!(promised.value, Some(Value::from(42)));
    }
}

#[test]
fn test_consensus_on_second_accepted() {
    let script = Script::new([ScriptRecord::new(0).with_propose(p(1), 42)]);
    let mut sim = Simulation::new(SimulationConfig::new(1, 3, 0, 20), script).unwrap();

    // Ticks 0..=10 deliver up to the first ACCEPTED
    for _ in 0..11 {
        sim.step();
    }
    assert!(!sim.proposer(1).unwrap().has_consensus());
    assert_eq!(sim.proposer(1).unwrap().accepted_count(), 1);

    sim.step();
    let proposer = sim.proposer(1).unwrap();
    assert!(proposer.has_consensus());
    assert_eq!(proposer.phase(), ProposerPhase::Consensus);
}

#[test]
fn test_minority_failure_does_not_block_consensus() {
    let script = Script::new([
        ScriptRecord::new(0)
            .with_failure(a(1))
            .with_propose(p(1), 42),
        ScriptRecord::new(10).with_recovery(a(1)),
    ]);
    let mut sim = Simulation::new(SimulationConfig::new(1, 3, 0, 20), script).unwrap();

    // Consensus is reached while A1 is still down
    while sim.tick() < 10 {
        sim.step();
    }
    assert!(sim.is_failed(a(1)));
    assert!(sim.proposer(1).unwrap().has_consensus());
    assert_eq!(sim.network().len(), 1);
    assert!(sim.acceptor(1).unwrap().promised().is_empty());

    let report = sim.run();
    assert_eq!(
        report.trace.lines(),
        vec![
            "00: ** A1 failed **",
            "00: C0 -> P1 PROPOSE value=42",
            "01: P1 -> A2 PREPARE ballot=1",
            "02: P1 -> A3 PREPARE ballot=1",
            "03: A2 -> P1 PROMISE ballot=1",
            "04: A3 -> P1 PROMISE ballot=1",
            "05: P1 -> A2 ACCEPT ballot=1 value=42",
            "06: P1 -> A3 ACCEPT ballot=1 value=42",
            "07: A2 -> P1 ACCEPTED ballot=1 value=42",
            "08: A3 -> P1 ACCEPTED ballot=1 value=42",
            "09:",
            "10: ** A1 recovered **",
            "10: P1 -> A1 PREPARE ballot=1",
            "11: A1 -> P1 PROMISE ballot=1",
            "12: P1 -> A1 ACCEPT ballot=1 value=42",
            "13: A1 -> P1 ACCEPTED ballot=1 value=42",
        ]
    );
    assert_eq!(report.stats.failures, 1);
    assert_eq!(report.stats.recoveries, 1);
    assert_eq!(report.stats.idle_ticks, 1);

    // The recovered acceptor caught up with the decided value
    assert_eq!(
        sim.acceptor(1).unwrap().promised().value,
        Some(Value::from(42))
    );
}

#[test]
fn test_majority_failure_blocks_consensus() {
    let script = Script::new([ScriptRecord::new(0)
        .with_failure(a(1))
        .with_failure(a(2))
        .with_propose(p(1), 42)]);
    let mut sim = Simulation::new(SimulationConfig::new(1, 3, 0, 40), script).unwrap();
    let report = sim.run();

    assert!(!report.quiesced);
    assert_eq!(report.final_tick, 40);
    assert!(report.outcome(p(1)).unwrap().consensus.is_none());
    assert_eq!(sim.network().len(), 2);
    assert_eq!(
        report.outcome(p(1)).unwrap().to_string(),
        "P1 did not reach consensus (proposed 42)"
    );
}

#[test]
fn test_accept_only_lets_competing_proposers_both_decide() {
    let script = Script::new([
        ScriptRecord::new(0).with_propose(p(1), 1),
        ScriptRecord::new(1).with_propose(p(2), 2),
    ]);
    let mut sim = Simulation::new(SimulationConfig::new(2, 3, 0, 100), script).unwrap();
    let report = sim.run();

    // Promises are not remembered, so the lower ballot still gets accepted
    // before the higher one overwrites it.
    let p1 = report.outcome(p(1)).unwrap().consensus.clone().unwrap();
    let p2 = report.outcome(p(2)).unwrap().consensus.clone().unwrap();
    assert_eq!((p1.ballot, p1.value), (Ballot(1), Value::from(1)));
    assert_eq!((p2.ballot, p2.value), (Ballot(2), Value::from(2)));
    assert_eq!(report.stats.delivered(MessageKind::Rejected), 0);
    assert_eq!(report.final_tick, 26);
}

#[test]
fn test_strict_promises_force_retry_and_agreement() {
    let script = Script::new([
        ScriptRecord::new(0).with_propose(p(1), 1),
        ScriptRecord::new(1).with_propose(p(2), 2),
    ]);
    let config = SimulationConfig::new(2, 3, 0, 100).with_protocol(ProtocolConfig::strict());
    let mut sim = Simulation::new(config, script).unwrap();
    let report = sim.run();

    assert_eq!(report.stats.delivered(MessageKind::Rejected), 3);

    // P1 retried with ballot 3 and adopted P2's accepted value
    let p1 = report.outcome(p(1)).unwrap();
    assert_eq!(p1.rounds_started, 2);
    assert_eq!(p1.consensus.as_ref().unwrap().ballot, Ballot(3));
    assert_eq!(p1.consensus.as_ref().unwrap().value, Value::from(2));

    let p2 = report.outcome(p(2)).unwrap();
    assert_eq!(p2.consensus.as_ref().unwrap().value, Value::from(2));
    assert_eq!(sim.last_ballot(), Ballot(3));
    assert_eq!(report.final_tick, 38);
}

#[test]
fn test_learners_predict_and_reset_round() {
    let predictor = RecordingPredictor::with_offset(1);
    let script = Script::new([ScriptRecord::new(0).with_propose(p(1), 42)]);
    let mut sim = Simulation::with_predictor(
        SimulationConfig::new(1, 3, 2, 100),
        script,
        Arc::new(predictor.clone()) as Arc<dyn Predictor>,
    )
    .unwrap();
    let report = sim.run();

    assert!(report.quiesced);
    assert_eq!(report.stats.delivered(MessageKind::Success), 2);
    assert_eq!(report.stats.delivered(MessageKind::Predicted), 2);
    assert_eq!(report.stats.round_resets, 2);
    assert_eq!(predictor.seen(), vec![Value::from(42), Value::from(42)]);

    // Each learner spawned its own client
    assert_eq!(sim.client(1).unwrap().received(), &[Value::from(43)]);
    assert_eq!(sim.client(2).unwrap().received(), &[Value::from(43)]);
    assert!(sim.client(3).is_none());

    // Round state is gone; decisions are kept
    for n in 1..=3 {
        assert!(sim.acceptor(n).unwrap().promised().is_empty());
    }
    for n in 1..=2 {
        assert!(!sim.learner(n).unwrap().has_predicted());
    }
    assert_eq!(sim.proposer(1).unwrap().decisions().len(), 1);
}

#[test]
fn test_reproposal_after_reset_opens_new_ballot() {
    let script = Script::new([
        ScriptRecord::new(0).with_propose(p(1), 42),
        ScriptRecord::new(40).with_propose(p(1), 43),
    ]);
    let mut sim = Simulation::new(SimulationConfig::new(1, 3, 1, 100), script).unwrap();
    let report = sim.run();

    let decisions = sim.proposer(1).unwrap().decisions();
    assert_eq!(decisions.len(), 2);
    assert_eq!(decisions[0].value, Value::from(42));
    assert_eq!(decisions[1].ballot, Ballot(2));
    assert_eq!(decisions[1].value, Value::from(43));
    assert_eq!(report.stats.round_resets, 2);
}

#[test]
fn test_failed_proposer_stalls_its_round() {
    let script = Script::new([
        ScriptRecord::new(0).with_propose(p(1), 42),
        ScriptRecord::new(4).with_failure(p(1)),
        ScriptRecord::new(30).with_recovery(p(1)),
    ]);
    let mut sim = Simulation::new(SimulationConfig::new(1, 3, 0, 60), script).unwrap();

    while sim.tick() < 30 {
        sim.step();
    }
    // PROMISEs wait in the queue while P1 is down
    assert_eq!(sim.network().len(), 3);
    assert!(sim
        .trace()
        .entries()
        .iter()
        .any(|entry| entry.event == TraceEvent::Failed(p(1))));

    let report = sim.run();
    assert!(report.outcome(p(1)).unwrap().consensus.is_some());
}
