//! Message kinds.

use crate::MessageError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The fixed set of protocol message kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MessageKind {
    /// Client asks a proposer to get a value decided.
    Propose,
    /// Proposer opens a ballot with every acceptor.
    Prepare,
    /// Acceptor agrees to consider the ballot, reporting any prior acceptance.
    Promise,
    /// Proposer asks an acceptor to accept a value under a ballot.
    Accept,
    /// Acceptor accepted the value.
    Accepted,
    /// Acceptor refused the ballot.
    Rejected,
    /// Proposer announces consensus to the learners.
    Success,
    /// Learner hands its prediction to a client.
    Predicted,
}

impl MessageKind {
    pub const ALL: [MessageKind; 8] = [
        MessageKind::Propose,
        MessageKind::Prepare,
        MessageKind::Promise,
        MessageKind::Accept,
        MessageKind::Accepted,
        MessageKind::Rejected,
        MessageKind::Success,
        MessageKind::Predicted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Propose => "PROPOSE",
            MessageKind::Prepare => "PREPARE",
            MessageKind::Promise => "PROMISE",
            MessageKind::Accept => "ACCEPT",
            MessageKind::Accepted => "ACCEPTED",
            MessageKind::Rejected => "REJECTED",
            MessageKind::Success => "SUCCESS",
            MessageKind::Predicted => "PREDICTED",
        }
    }

    /// Every kind except PROPOSE is tied to a ballot.
    pub fn requires_ballot(&self) -> bool {
        !matches!(self, MessageKind::Propose)
    }

    pub fn requires_value(&self) -> bool {
        matches!(
            self,
            MessageKind::Propose
                | MessageKind::Accept
                | MessageKind::Accepted
                | MessageKind::Success
                | MessageKind::Predicted
        )
    }

    pub fn allows_prior(&self) -> bool {
        matches!(self, MessageKind::Promise)
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageKind {
    type Err = MessageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MessageKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| MessageError::InvalidMessageType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_kinds() {
        for kind in MessageKind::ALL {
            assert_eq!(kind.as_str().parse::<MessageKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_parse_invalid_kind() {
        assert_eq!(
            "NACK".parse::<MessageKind>(),
            Err(MessageError::InvalidMessageType("NACK".to_string()))
        );
        // Names are case sensitive
        assert!("prepare".parse::<MessageKind>().is_err());
    }

    #[test]
    fn test_field_requirements() {
        assert!(!MessageKind::Propose.requires_ballot());
        assert!(MessageKind::Prepare.requires_ballot());
        assert!(!MessageKind::Prepare.requires_value());
        assert!(!MessageKind::Rejected.requires_value());
        assert!(MessageKind::Success.requires_value());
        assert!(MessageKind::Promise.allows_prior());
        assert!(!MessageKind::Accept.allows_prior());
    }
}
