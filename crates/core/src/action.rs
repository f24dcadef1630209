//! Actions returned by state machines.

use paxsim_messages::Message;

/// Something a state machine wants done after handling a message.
///
/// The scheduler performs actions in the order they are returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Append a message to the back of the network queue.
    Send(Message),

    /// Open the next round: every acceptor forgets its promise and every
    /// learner forgets what it learned and predicted.
    ResetRound,
}

impl Action {
    /// The message to send, if this is a send.
    pub fn as_message(&self) -> Option<&Message> {
        match self {
            Action::Send(message) => Some(message),
            Action::ResetRound => None,
        }
    }
}
