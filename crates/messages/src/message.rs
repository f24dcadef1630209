//! The protocol message record.

use crate::{MessageError, MessageKind};
use paxsim_types::{Ballot, NodeId, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A value an acceptor already accepted, and the ballot it accepted it under.
///
/// Carried in PROMISE so the proposer defers to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prior {
    pub ballot: Ballot,
    pub value: Value,
}

impl Prior {
    pub fn new(ballot: Ballot, value: Value) -> Self {
        Self { ballot, value }
    }
}

/// One protocol event in flight between two nodes.
///
/// Immutable once built. The typed constructors ([`Message::prepare`] and
/// friends) always produce valid messages; [`Message::try_new`] is the
/// checked path for callers that assemble the fields dynamically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    src: NodeId,
    dst: NodeId,
    kind: MessageKind,
    ballot: Option<Ballot>,
    value: Option<Value>,
    prior: Option<Prior>,
}

impl Message {
    /// Build a message, checking the field rules of `kind`.
    ///
    /// # Errors
    ///
    /// - [`MessageError::MissingBallot`] / [`MessageError::UnexpectedBallot`]
    ///   when the ballot does not match [`MessageKind::requires_ballot`]
    /// - [`MessageError::MissingValue`] when a value-carrying kind has none
    /// - [`MessageError::UnexpectedPrior`] when anything but PROMISE has a prior
    pub fn try_new(
        kind: MessageKind,
        src: NodeId,
        dst: NodeId,
        ballot: Option<Ballot>,
        value: Option<Value>,
        prior: Option<Prior>,
    ) -> Result<Self, MessageError> {
        match (kind.requires_ballot(), ballot.is_some()) {
            (true, false) => return Err(MessageError::MissingBallot(kind)),
            (false, true) => return Err(MessageError::UnexpectedBallot(kind)),
            _ => {}
        }
        if kind.requires_value() && value.is_none() {
            return Err(MessageError::MissingValue(kind));
        }
        if prior.is_some() && !kind.allows_prior() {
            return Err(MessageError::UnexpectedPrior(kind));
        }

        Ok(Self {
            src,
            dst,
            kind,
            ballot,
            value,
            prior,
        })
    }

    /// Like [`Message::try_new`], with the kind given by name.
    ///
    /// # Errors
    ///
    /// [`MessageError::InvalidMessageType`] if `kind` is not a known kind name,
    /// otherwise as [`Message::try_new`].
    pub fn parse(
        kind: &str,
        src: NodeId,
        dst: NodeId,
        ballot: Option<Ballot>,
        value: Option<Value>,
        prior: Option<Prior>,
    ) -> Result<Self, MessageError> {
        Self::try_new(kind.parse()?, src, dst, ballot, value, prior)
    }

    fn build(
        kind: MessageKind,
        src: NodeId,
        dst: NodeId,
        ballot: Option<Ballot>,
        value: Option<Value>,
        prior: Option<Prior>,
    ) -> Self {
        Self {
            src,
            dst,
            kind,
            ballot,
            value,
            prior,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Typed constructors
    // ═══════════════════════════════════════════════════════════════════════

    pub fn propose(src: NodeId, dst: NodeId, value: Value) -> Self {
        Self::build(MessageKind::Propose, src, dst, None, Some(value), None)
    }

    pub fn prepare(src: NodeId, dst: NodeId, ballot: Ballot) -> Self {
        Self::build(MessageKind::Prepare, src, dst, Some(ballot), None, None)
    }

    /// PROMISE for `ballot`, reporting `prior` if the acceptor already accepted a value.
    pub fn promise(src: NodeId, dst: NodeId, ballot: Ballot, prior: Option<Prior>) -> Self {
        let value = prior.as_ref().map(|p| p.value.clone());
        Self::build(MessageKind::Promise, src, dst, Some(ballot), value, prior)
    }

    pub fn accept(src: NodeId, dst: NodeId, ballot: Ballot, value: Value) -> Self {
        Self::build(MessageKind::Accept, src, dst, Some(ballot), Some(value), None)
    }

    pub fn accepted(src: NodeId, dst: NodeId, ballot: Ballot, value: Value) -> Self {
        Self::build(MessageKind::Accepted, src, dst, Some(ballot), Some(value), None)
    }

    pub fn rejected(src: NodeId, dst: NodeId, ballot: Ballot) -> Self {
        Self::build(MessageKind::Rejected, src, dst, Some(ballot), None, None)
    }

    pub fn success(src: NodeId, dst: NodeId, ballot: Ballot, value: Value) -> Self {
        Self::build(MessageKind::Success, src, dst, Some(ballot), Some(value), None)
    }

    pub fn predicted(src: NodeId, dst: NodeId, ballot: Ballot, value: Value) -> Self {
        Self::build(MessageKind::Predicted, src, dst, Some(ballot), Some(value), None)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Accessors
    // ═══════════════════════════════════════════════════════════════════════

    pub fn src(&self) -> NodeId {
        self.src
    }

    pub fn dst(&self) -> NodeId {
        self.dst
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn ballot(&self) -> Option<Ballot> {
        self.ballot
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn prior(&self) -> Option<&Prior> {
        self.prior.as_ref()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} {}", self.src, self.dst, self.kind)?;
        if let Some(ballot) = self.ballot {
            write!(f, " ballot={ballot}")?;
        }
        if let Some(value) = &self.value {
            write!(f, " value={value}")?;
        }
        if let Some(prior) = &self.prior {
            write!(f, " prior=({},{})", prior.ballot, prior.value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p1() -> NodeId {
        NodeId::proposer(1)
    }

    fn a2() -> NodeId {
        NodeId::acceptor(2)
    }

    #[test]
    fn test_display_forms() {
        let prepare = Message::prepare(p1(), a2(), Ballot(3));
        assert_eq!(prepare.to_string(), "P1 -> A2 PREPARE ballot=3");

        let propose = Message::propose(NodeId::SCRIPT_CLIENT, p1(), Value::from(42));
        assert_eq!(propose.to_string(), "C0 -> P1 PROPOSE value=42");

        let promise = Message::promise(
            a2(),
            p1(),
            Ballot(4),
            Some(Prior::new(Ballot(3), Value::from(42))),
        );
        assert_eq!(
            promise.to_string(),
            "A2 -> P1 PROMISE ballot=4 value=42 prior=(3,42)"
        );
    }

    #[test]
    fn test_promise_without_prior_has_no_value() {
        let promise = Message::promise(a2(), p1(), Ballot(1), None);
        assert!(promise.value().is_none());
        assert!(promise.prior().is_none());
    }

    #[test]
    fn test_try_new_rejects_missing_ballot() {
        let result = Message::try_new(MessageKind::Prepare, p1(), a2(), None, None, None);
        assert_eq!(result, Err(MessageError::MissingBallot(MessageKind::Prepare)));
    }

    #[test]
    fn test_try_new_rejects_ballot_on_propose() {
        let result = Message::try_new(
            MessageKind::Propose,
            NodeId::SCRIPT_CLIENT,
            p1(),
            Some(Ballot(1)),
            Some(Value::from(1)),
            None,
        );
        assert_eq!(
            result,
            Err(MessageError::UnexpectedBallot(MessageKind::Propose))
        );
    }

    #[test]
    fn test_try_new_rejects_missing_value() {
        let result = Message::try_new(
            MessageKind::Accept,
            p1(),
            a2(),
            Some(Ballot(1)),
            None,
            None,
        );
        assert_eq!(result, Err(MessageError::MissingValue(MessageKind::Accept)));
    }

    #[test]
    fn test_try_new_rejects_prior_outside_promise() {
        let result = Message::try_new(
            MessageKind::Accepted,
            a2(),
            p1(),
            Some(Ballot(2)),
            Some(Value::from(5)),
            Some(Prior::new(Ballot(1), Value::from(5))),
        );
        assert_eq!(
            result,
            Err(MessageError::UnexpectedPrior(MessageKind::Accepted))
        );
    }

    #[test]
    fn test_parse_invalid_type() {
        let result = Message::parse("COMMIT", p1(), a2(), Some(Ballot(1)), None, None);
        assert_eq!(
            result,
            Err(MessageError::InvalidMessageType("COMMIT".to_string()))
        );
    }

    #[test]
    fn test_parse_matches_typed_constructor() {
        let parsed = Message::parse(
            "ACCEPT",
            p1(),
            a2(),
            Some(Ballot(7)),
            Some(Value::from(9)),
            None,
        )
        .unwrap();
        assert_eq!(parsed, Message::accept(p1(), a2(), Ballot(7), Value::from(9)));
    }
}
