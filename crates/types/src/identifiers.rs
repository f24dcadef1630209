//! Domain-specific identifier types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Role a node plays in the protocol.
///
/// Roles are mutually exclusive: a node is created with exactly one role and
/// keeps it for the lifetime of the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    Proposer,
    Acceptor,
    Learner,
    Client,
}

impl Role {
    /// All roles, in registry order.
    pub const ALL: [Role; 4] = [Role::Proposer, Role::Acceptor, Role::Learner, Role::Client];

    /// Upper-case name as used in scripts.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Proposer => "PROPOSER",
            Role::Acceptor => "ACCEPTOR",
            Role::Learner => "LEARNER",
            Role::Client => "CLIENT",
        }
    }

    /// Single-letter prefix used when printing node identities.
    fn prefix(&self) -> char {
        match self {
            Role::Proposer => 'P',
            Role::Acceptor => 'A',
            Role::Learner => 'L',
            Role::Client => 'C',
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A role name that is not one of [`Role::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// Node identity: a role plus a 1-based number within that role.
///
/// Client number 0 is reserved for the script driver that issues proposals;
/// clients spawned by learners are numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId {
    pub role: Role,
    pub number: u32,
}

impl NodeId {
    /// The client that scripted proposals originate from.
    pub const SCRIPT_CLIENT: Self = NodeId::client(0);

    pub const fn new(role: Role, number: u32) -> Self {
        Self { role, number }
    }

    pub const fn proposer(number: u32) -> Self {
        Self::new(Role::Proposer, number)
    }

    pub const fn acceptor(number: u32) -> Self {
        Self::new(Role::Acceptor, number)
    }

    pub const fn learner(number: u32) -> Self {
        Self::new(Role::Learner, number)
    }

    pub const fn client(number: u32) -> Self {
        Self::new(Role::Client, number)
    }

    /// Zero-based position in the role's registry.
    ///
    /// Returns `None` for number 0, which never names a registered
    /// proposer, acceptor or learner.
    pub fn index(&self) -> Option<usize> {
        (self.number as usize).checked_sub(1)
    }

    pub fn is_client(&self) -> bool {
        self.role == Role::Client
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.role.prefix(), self.number)
    }
}

/// Paxos round number ("n").
///
/// Ballots are issued from 1 upwards by a [`crate::BallotAllocator`];
/// [`Ballot::ZERO`] is never issued and stands for "nothing promised yet".
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Ballot(pub u64);

impl Ballot {
    pub const ZERO: Self = Ballot(0);

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Ballot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_display() {
        assert_eq!(NodeId::proposer(1).to_string(), "P1");
        assert_eq!(NodeId::acceptor(3).to_string(), "A3");
        assert_eq!(NodeId::learner(2).to_string(), "L2");
        assert_eq!(NodeId::SCRIPT_CLIENT.to_string(), "C0");
    }

    #[test]
    fn test_node_id_index() {
        assert_eq!(NodeId::acceptor(1).index(), Some(0));
        assert_eq!(NodeId::acceptor(5).index(), Some(4));
        assert_eq!(NodeId::client(0).index(), None);
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("PROPOSER".parse::<Role>(), Ok(Role::Proposer));
        assert_eq!("ACCEPTOR".parse::<Role>(), Ok(Role::Acceptor));
        assert_eq!(
            "proposer".parse::<Role>(),
            Err(UnknownRole("proposer".to_string()))
        );
    }

    #[test]
    fn test_ballot_ordering() {
        assert!(Ballot::ZERO < Ballot(1));
        assert!(Ballot(1) < Ballot(2));
        assert!(Ballot::default().is_zero());
    }
}
