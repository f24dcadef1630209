//! Protocol messages for the Paxos simulator.
//!
//! A [`Message`] is an immutable record of one protocol event travelling from
//! one node to another. Construction enforces the structural rules of each
//! [`MessageKind`]; nothing else about a message is ever checked again.

mod error;
mod kind;
mod message;

pub use error::MessageError;
pub use kind::MessageKind;
pub use message::{Message, Prior};
