//! Acceptor role.
//!
//! One rule governs both handlers: never promise or accept a ballot at or
//! below the highest ballot already promised. Under the default
//! [`PromisePolicy::AcceptOnly`] only an ACCEPT raises that ballot; a PREPARE
//! is answered but not remembered.

use crate::config::PromisePolicy;
use paxsim_core::{Action, StateMachine};
use paxsim_messages::{Message, MessageKind, Prior};
use paxsim_types::{Ballot, NodeId, Value};
use tracing::{debug, warn};

/// Highest ballot an acceptor has promised, and the value it accepted with it.
///
/// The default is the empty promise: [`Ballot::ZERO`] and no value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Promised {
    pub ballot: Ballot,
    pub value: Option<Value>,
}

impl Promised {
    /// The accepted `(ballot, value)` pair, reported to proposers as a prior.
    pub fn prior(&self) -> Option<Prior> {
        self.value
            .as_ref()
            .map(|value| Prior::new(self.ballot, value.clone()))
    }

    pub fn is_empty(&self) -> bool {
        self.ballot.is_zero() && self.value.is_none()
    }
}

/// Acceptor state machine.
#[derive(Debug)]
pub struct AcceptorState {
    id: NodeId,
    policy: PromisePolicy,
    promised: Promised,
}

impl AcceptorState {
    pub fn new(id: NodeId, policy: PromisePolicy) -> Self {
        Self {
            id,
            policy,
            promised: Promised::default(),
        }
    }

    pub fn promised(&self) -> &Promised {
        &self.promised
    }

    /// Forget the current promise. Only a client round reset does this.
    pub fn reset(&mut self) {
        debug!(node = %self.id, "Acceptor reset");
        self.promised = Promised::default();
    }

    /// Handle PREPARE: promise a ballot above the promised one, else stay silent.
    pub fn on_prepare(&mut self, message: &Message) -> Vec<Action> {
        let Some(ballot) = message.ballot() else {
            warn!(node = %self.id, "PREPARE without a ballot");
            return vec![];
        };

        if ballot <= self.promised.ballot {
            debug!(
                node = %self.id,
                ballot = ballot.0,
                promised = self.promised.ballot.0,
                "Ignoring PREPARE at or below promised ballot"
            );
            return vec![];
        }

        let prior = self.promised.prior();
        if self.policy == PromisePolicy::Strict {
            self.promised.ballot = ballot;
        }

        debug!(node = %self.id, ballot = ballot.0, has_prior = prior.is_some(), "Promising");
        vec![Action::Send(Message::promise(
            self.id,
            message.src(),
            ballot,
            prior,
        ))]
    }

    /// Handle ACCEPT: accept a ballot above the promised one, else reject it.
    pub fn on_accept(&mut self, message: &Message) -> Vec<Action> {
        let (Some(ballot), Some(value)) = (message.ballot(), message.value()) else {
            warn!(node = %self.id, "ACCEPT without ballot or value");
            return vec![];
        };

        let acceptable = match self.policy {
            PromisePolicy::AcceptOnly => ballot > self.promised.ballot,
            PromisePolicy::Strict => ballot >= self.promised.ballot,
        };

        if !acceptable {
            debug!(
                node = %self.id,
                ballot = ballot.0,
                promised = self.promised.ballot.0,
                "Rejecting ACCEPT"
            );
            return vec![Action::Send(Message::rejected(
                self.id,
                message.src(),
                ballot,
            ))];
        }

        debug!(node = %self.id, ballot = ballot.0, value = %value, "Accepting");
        self.promised = Promised {
            ballot,
            value: Some(value.clone()),
        };
        vec![Action::Send(Message::accepted(
            self.id,
            message.src(),
            ballot,
            value.clone(),
        ))]
    }
}

impl StateMachine for AcceptorState {
    fn id(&self) -> NodeId {
        self.id
    }

    fn handle(&mut self, message: Message) -> Vec<Action> {
        match message.kind() {
            MessageKind::Prepare => self.on_prepare(&message),
            MessageKind::Accept => self.on_accept(&message),
            kind => {
                warn!(node = %self.id, kind = %kind, "Acceptor ignoring unexpected message");
                vec![]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paxsim_test_helpers::{fixtures, sent_messages};
    use tracing_test::traced_test;

    fn make_acceptor(policy: PromisePolicy) -> AcceptorState {
        AcceptorState::new(NodeId::acceptor(1), policy)
    }

    #[traced_test]
    #[test]
    fn test_prepare_promises_without_recording() {
        let mut acceptor = make_acceptor(PromisePolicy::AcceptOnly);
        let actions = acceptor.handle(fixtures::prepare(1, 1, 1));
        assert_eq!(sent_messages(&actions), vec![fixtures::promise(1, 1, 1)]);

        // The promised ballot only moves on ACCEPT
        assert_eq!(acceptor.promised().ballot, Ballot::ZERO);

        // So a second, interleaved PREPARE is promised as well
        let actions = acceptor.handle(fixtures::prepare(2, 1, 2));
        assert_eq!(sent_messages(&actions), vec![fixtures::promise(1, 2, 2)]);
        let actions = acceptor.handle(fixtures::prepare(1, 1, 1));
        assert_eq!(sent_messages(&actions).len(), 1);
    }

    #[traced_test]
    #[test]
    fn test_prepare_at_or_below_promised_is_ignored() {
        let mut acceptor = make_acceptor(PromisePolicy::AcceptOnly);
        acceptor.handle(fixtures::accept(1, 1, 5, 42));

        assert!(acceptor.handle(fixtures::prepare(1, 1, 5)).is_empty());
        assert!(acceptor.handle(fixtures::prepare(2, 1, 3)).is_empty());
    }

    #[traced_test]
    #[test]
    fn test_promise_reports_prior() {
        let mut acceptor = make_acceptor(PromisePolicy::AcceptOnly);
        acceptor.handle(fixtures::accept(1, 1, 1, 42));

        let actions = acceptor.handle(fixtures::prepare(2, 1, 2));
        assert_eq!(
            sent_messages(&actions),
            vec![fixtures::promise_with_prior(1, 2, 2, 1, 42)]
        );
    }

    #[traced_test]
    #[test]
    fn test_accept_above_promised() {
        let mut acceptor = make_acceptor(PromisePolicy::AcceptOnly);
        let actions = acceptor.handle(fixtures::accept(1, 1, 3, 42));

        assert_eq!(sent_messages(&actions), vec![fixtures::accepted(1, 1, 3, 42)]);
        assert_eq!(
            acceptor.promised(),
            &Promised {
                ballot: Ballot(3),
                value: Some(Value::from(42)),
            }
        );
    }

    #[traced_test]
    #[test]
    fn test_accept_at_or_below_promised_rejected() {
        let mut acceptor = make_acceptor(PromisePolicy::AcceptOnly);
        acceptor.handle(fixtures::accept(1, 1, 3, 42));

        let actions = acceptor.handle(fixtures::accept(2, 1, 3, 37));
        assert_eq!(sent_messages(&actions), vec![fixtures::rejected(1, 2, 3)]);
        let actions = acceptor.handle(fixtures::accept(2, 1, 2, 37));
        assert_eq!(sent_messages(&actions), vec![fixtures::rejected(1, 2, 2)]);

        // Rejections leave the promise alone
        assert_eq!(acceptor.promised().ballot, Ballot(3));
        assert_eq!(acceptor.promised().value, Some(Value::from(42)));
    }

    #[traced_test]
    #[test]
    fn test_promised_ballot_never_decreases() {
        let mut acceptor = make_acceptor(PromisePolicy::AcceptOnly);
        let mut last = acceptor.promised().ballot;
        let script = [
            fixtures::accept(1, 1, 4, 1),
            fixtures::prepare(1, 1, 2),
            fixtures::accept(1, 1, 2, 2),
            fixtures::accept(1, 1, 6, 3),
            fixtures::prepare(1, 1, 9),
            fixtures::accept(1, 1, 5, 4),
        ];
        for message in script {
            acceptor.handle(message);
            assert!(acceptor.promised().ballot >= last);
            last = acceptor.promised().ballot;
        }
        assert_eq!(last, Ballot(6));
    }

    #[traced_test]
    #[test]
    fn test_reset_clears_promise() {
        let mut acceptor = make_acceptor(PromisePolicy::AcceptOnly);
        acceptor.handle(fixtures::accept(1, 1, 3, 42));
        acceptor.reset();
        assert!(acceptor.promised().is_empty());
    }

    #[traced_test]
    #[test]
    fn test_strict_policy_records_prepare() {
        let mut acceptor = make_acceptor(PromisePolicy::Strict);
        acceptor.handle(fixtures::prepare(1, 1, 2));
        assert_eq!(acceptor.promised().ballot, Ballot(2));

        // Lower PREPARE is now ignored, the promised ballot itself is acceptable
        assert!(acceptor.handle(fixtures::prepare(2, 1, 1)).is_empty());
        let actions = acceptor.handle(fixtures::accept(1, 1, 2, 42));
        assert_eq!(sent_messages(&actions), vec![fixtures::accepted(1, 1, 2, 42)]);

        let actions = acceptor.handle(fixtures::accept(2, 1, 1, 37));
        assert_eq!(sent_messages(&actions), vec![fixtures::rejected(1, 2, 1)]);
    }
}
