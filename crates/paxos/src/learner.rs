//! Learner role.

use paxsim_core::{Action, Predictor, StateMachine};
use paxsim_messages::{Message, MessageKind};
use paxsim_types::{ClientIds, NodeId, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Learner state machine.
///
/// Passive until a SUCCESS arrives. The first SUCCESS of a round is learned,
/// run through the predictor, and the prediction is sent to a freshly
/// numbered client. Further SUCCESS messages are ignored until a round reset.
pub struct LearnerState {
    id: NodeId,
    predictor: Arc<dyn Predictor>,

    /// Numbers the clients that receive predictions.
    clients: ClientIds,

    has_predicted: bool,
    learned_value: Option<Value>,
    predicted_value: Option<Value>,
}

impl std::fmt::Debug for LearnerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LearnerState")
            .field("id", &self.id)
            .field("has_predicted", &self.has_predicted)
            .field("learned_value", &self.learned_value)
            .field("predicted_value", &self.predicted_value)
            .finish_non_exhaustive()
    }
}

impl LearnerState {
    pub fn new(id: NodeId, predictor: Arc<dyn Predictor>, clients: ClientIds) -> Self {
        Self {
            id,
            predictor,
            clients,
            has_predicted: false,
            learned_value: None,
            predicted_value: None,
        }
    }

    pub fn has_predicted(&self) -> bool {
        self.has_predicted
    }

    pub fn learned_value(&self) -> Option<&Value> {
        self.learned_value.as_ref()
    }

    pub fn predicted_value(&self) -> Option<&Value> {
        self.predicted_value.as_ref()
    }

    /// Return to the initial state so the next round can be learned.
    pub fn reset(&mut self) {
        debug!(node = %self.id, "Learner reset");
        self.has_predicted = false;
        self.learned_value = None;
        self.predicted_value = None;
    }

    /// Handle SUCCESS: learn, predict and notify a new client, once per round.
    pub fn on_success(&mut self, message: &Message) -> Vec<Action> {
        if self.has_predicted {
            debug!(node = %self.id, from = %message.src(), "Already predicted this round");
            return vec![];
        }

        let (Some(ballot), Some(value)) = (message.ballot(), message.value()) else {
            warn!(node = %self.id, "SUCCESS without ballot or value");
            return vec![];
        };

        let Some(client) = self.clients.next() else {
            warn!(node = %self.id, "Client numbers exhausted, dropping prediction");
            return vec![];
        };
        let predicted = self.predictor.predict(value);

        info!(
            node = %self.id,
            learned = %value,
            predicted = %predicted,
            client = %client,
            "Learned value"
        );

        self.learned_value = Some(value.clone());
        self.predicted_value = Some(predicted.clone());
        self.has_predicted = true;

        vec![Action::Send(Message::predicted(
            self.id, client, ballot, predicted,
        ))]
    }
}

impl StateMachine for LearnerState {
    fn id(&self) -> NodeId {
        self.id
    }

    fn handle(&mut self, message: Message) -> Vec<Action> {
        match message.kind() {
            MessageKind::Success => self.on_success(&message),
            kind => {
                warn!(node = %self.id, kind = %kind, "Learner ignoring unexpected message");
                vec![]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paxsim_test_helpers::{fixtures, sent_messages, RecordingPredictor};
    use tracing_test::traced_test;

    fn make_learner(predictor: RecordingPredictor) -> LearnerState {
        LearnerState::new(NodeId::learner(1), Arc::new(predictor), ClientIds::new())
    }

    #[traced_test]
    #[test]
    fn test_success_predicts_once() {
        let predictor = RecordingPredictor::with_offset(1);
        let mut learner = make_learner(predictor.clone());

        let actions = learner.handle(fixtures::success(1, 1, 4, 42));
        assert_eq!(
            sent_messages(&actions),
            vec![fixtures::predicted(1, 1, 4, 43)]
        );
        assert!(learner.has_predicted());
        assert_eq!(learner.learned_value(), Some(&Value::from(42)));
        assert_eq!(learner.predicted_value(), Some(&Value::from(43)));

        // A second SUCCESS in the same round is ignored
        assert!(learner.handle(fixtures::success(2, 1, 5, 42)).is_empty());
        assert_eq!(predictor.seen(), vec![Value::from(42)]);
    }

    #[traced_test]
    #[test]
    fn test_reset_allows_next_prediction_to_new_client() {
        let mut learner = make_learner(RecordingPredictor::new());
        learner.handle(fixtures::success(1, 1, 1, 42));

        learner.reset();
        assert!(!learner.has_predicted());
        assert!(learner.learned_value().is_none());
        assert!(learner.predicted_value().is_none());

        let actions = learner.handle(fixtures::success(1, 1, 2, 37));
        let sent = sent_messages(&actions);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].dst(), NodeId::client(2));
    }
}
