//! Error types for message construction.

use crate::MessageKind;
use thiserror::Error;

/// A message that would violate the structural rules of its kind.
///
/// These are programming errors: the operation that tried to build the
/// message must be aborted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageError {
    /// Kind name outside the fixed enumeration.
    #[error("{0} is not a valid message type")]
    InvalidMessageType(String),

    #[error("{0} message requires a ballot")]
    MissingBallot(MessageKind),

    #[error("{0} message must not carry a ballot")]
    UnexpectedBallot(MessageKind),

    #[error("{0} message requires a value")]
    MissingValue(MessageKind),

    /// Only PROMISE may report a previously accepted value.
    #[error("{0} message cannot carry a prior")]
    UnexpectedPrior(MessageKind),
}
