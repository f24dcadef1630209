//! Core traits for state machines and their collaborators.

use crate::Action;
use paxsim_messages::Message;
use paxsim_types::{NodeId, Value};

/// A node's protocol state machine.
///
/// All protocol logic is implemented as state machines that are:
///
/// - **Synchronous**: No async, no `.await`
/// - **Deterministic**: Same state + message = same actions
/// - **Pure-ish**: Mutates self, but performs no I/O
///
/// # Example
///
/// ```ignore
/// impl StateMachine for AcceptorState {
///     fn handle(&mut self, message: Message) -> Vec<Action> {
///         match message.kind() {
///             MessageKind::Prepare => self.on_prepare(&message),
///             MessageKind::Accept => self.on_accept(&message),
///             _ => vec![],
///         }
///     }
/// }
/// ```
pub trait StateMachine {
    /// Identity of the node this state machine runs on.
    fn id(&self) -> NodeId;

    /// Process a delivered message, returning actions to perform.
    ///
    /// # Guarantees
    ///
    /// - **Synchronous**: This method never blocks or awaits
    /// - **Deterministic**: Given the same state and message, always returns the same actions
    /// - **No I/O**: Messages are sent by the scheduler via the returned actions
    fn handle(&mut self, message: Message) -> Vec<Action>;
}

/// Value prediction applied by learners to a decided value.
///
/// Treated as a black box by the protocol. Implemented for any
/// `Fn(&Value) -> Value` closure.
pub trait Predictor: Send + Sync {
    fn predict(&self, value: &Value) -> Value;
}

impl<F> Predictor for F
where
    F: Fn(&Value) -> Value + Send + Sync,
{
    fn predict(&self, value: &Value) -> Value {
        self(value)
    }
}

/// Predicts that the next value equals the learned one.
///
/// Default for simulations that are not interested in predictions.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityPredictor;

impl Predictor for IdentityPredictor {
    fn predict(&self, value: &Value) -> Value {
        value.clone()
    }
}
