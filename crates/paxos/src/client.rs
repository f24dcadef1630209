//! Client role: the outside world.

use paxsim_core::{Action, StateMachine};
use paxsim_messages::{Message, MessageKind};
use paxsim_types::{NodeId, Value};
use tracing::{info, warn};

/// Client state machine.
///
/// Scripted proposals are sent on behalf of [`NodeId::SCRIPT_CLIENT`].
/// Learners address their predictions to fresh clients; a client receiving
/// one asks the scheduler to open the next round.
#[derive(Debug)]
pub struct ClientState {
    id: NodeId,
    received: Vec<Value>,
}

impl ClientState {
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            received: Vec::new(),
        }
    }

    /// Predictions delivered to this client.
    pub fn received(&self) -> &[Value] {
        &self.received
    }

    /// Handle PREDICTED: record it and request a round reset.
    pub fn on_predicted(&mut self, message: &Message) -> Vec<Action> {
        let Some(value) = message.value() else {
            warn!(node = %self.id, "PREDICTED without a value");
            return vec![];
        };

        info!(node = %self.id, from = %message.src(), predicted = %value, "Prediction received, resetting round");
        self.received.push(value.clone());
        vec![Action::ResetRound]
    }
}

impl StateMachine for ClientState {
    fn id(&self) -> NodeId {
        self.id
    }

    fn handle(&mut self, message: Message) -> Vec<Action> {
        match message.kind() {
            MessageKind::Predicted => self.on_predicted(&message),
            kind => {
                warn!(node = %self.id, kind = %kind, "Client ignoring unexpected message");
                vec![]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paxsim_test_helpers::fixtures;

    #[test]
    fn test_predicted_requests_reset() {
        let mut client = ClientState::new(NodeId::client(1));
        let actions = client.handle(fixtures::predicted(1, 1, 3, 43));
        assert_eq!(actions, vec![Action::ResetRound]);
        assert_eq!(client.received(), &[Value::from(43)]);
    }

    #[test]
    fn test_other_messages_ignored() {
        let mut client = ClientState::new(NodeId::client(1));
        assert!(client.handle(fixtures::success(1, 1, 1, 42)).is_empty());
        assert!(client.received().is_empty());
    }
}
