//! Message fixtures.
//!
//! Endpoints are given as 1-based role numbers in the order the message
//! travels, so `accept(1, 2, ..)` is `P1 -> A2` and `accepted(2, 1, ..)` is
//! `A2 -> P1`. Values are integers for readability.

use paxsim_messages::{Message, Prior};
use paxsim_types::{Ballot, NodeId, Value};

/// `C0 -> P{proposer} PROPOSE value`
pub fn propose(proposer: u32, value: i64) -> Message {
    Message::propose(
        NodeId::SCRIPT_CLIENT,
        NodeId::proposer(proposer),
        Value::from(value),
    )
}

/// `P{proposer} -> A{acceptor} PREPARE ballot`
pub fn prepare(proposer: u32, acceptor: u32, ballot: u64) -> Message {
    Message::prepare(
        NodeId::proposer(proposer),
        NodeId::acceptor(acceptor),
        Ballot(ballot),
    )
}

/// `A{acceptor} -> P{proposer} PROMISE ballot` with no prior.
pub fn promise(acceptor: u32, proposer: u32, ballot: u64) -> Message {
    Message::promise(
        NodeId::acceptor(acceptor),
        NodeId::proposer(proposer),
        Ballot(ballot),
        None,
    )
}

/// `A{acceptor} -> P{proposer} PROMISE ballot prior=(prior_ballot, prior_value)`
pub fn promise_with_prior(
    acceptor: u32,
    proposer: u32,
    ballot: u64,
    prior_ballot: u64,
    prior_value: i64,
) -> Message {
    Message::promise(
        NodeId::acceptor(acceptor),
        NodeId::proposer(proposer),
        Ballot(ballot),
        Some(Prior::new(Ballot(prior_ballot), Value::from(prior_value))),
    )
}

/// `P{proposer} -> A{acceptor} ACCEPT ballot value`
pub fn accept(proposer: u32, acceptor: u32, ballot: u64, value: i64) -> Message {
    Message::accept(
        NodeId::proposer(proposer),
        NodeId::acceptor(acceptor),
        Ballot(ballot),
        Value::from(value),
    )
}

/// `A{acceptor} -> P{proposer} ACCEPTED ballot value`
pub fn accepted(acceptor: u32, proposer: u32, ballot: u64, value: i64) -> Message {
    Message::accepted(
        NodeId::acceptor(acceptor),
        NodeId::proposer(proposer),
        Ballot(ballot),
        Value::from(value),
    )
}

/// `A{acceptor} -> P{proposer} REJECTED ballot`
pub fn rejected(acceptor: u32, proposer: u32, ballot: u64) -> Message {
    Message::rejected(
        NodeId::acceptor(acceptor),
        NodeId::proposer(proposer),
        Ballot(ballot),
    )
}

/// `P{proposer} -> L{learner} SUCCESS ballot value`
pub fn success(proposer: u32, learner: u32, ballot: u64, value: i64) -> Message {
    Message::success(
        NodeId::proposer(proposer),
        NodeId::learner(learner),
        Ballot(ballot),
        Value::from(value),
    )
}

/// `L{learner} -> C{client} PREDICTED ballot value`
pub fn predicted(learner: u32, client: u32, ballot: u64, value: i64) -> Message {
    Message::predicted(
        NodeId::learner(learner),
        NodeId::client(client),
        Ballot(ballot),
        Value::from(value),
    )
}
