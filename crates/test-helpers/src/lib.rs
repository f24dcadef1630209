//! Test helpers for the Paxos simulator.
//!
//! Provides message fixtures addressed by plain role numbers, helpers for
//! inspecting returned actions, and a predictor that records its inputs.
//!
//! # Example
//!
//! ```rust
//! use paxsim_messages::MessageKind;
//! use paxsim_test_helpers::{count_kind, fixtures};
//! use paxsim_core::Action;
//!
//! // P1 -> A2 ACCEPT ballot=3 value=42
//! let accept = fixtures::accept(1, 2, 3, 42);
//! assert_eq!(accept.to_string(), "P1 -> A2 ACCEPT ballot=3 value=42");
//!
//! let actions = vec![Action::Send(accept), Action::ResetRound];
//! assert_eq!(count_kind(&actions, MessageKind::Accept), 1);
//! ```

pub mod fixtures;

use paxsim_core::{Action, Predictor};
use paxsim_messages::{Message, MessageKind};
use paxsim_types::Value;
use std::sync::{Arc, Mutex};

/// Messages sent by a list of actions, in order.
pub fn sent_messages(actions: &[Action]) -> Vec<Message> {
    actions
        .iter()
        .filter_map(Action::as_message)
        .cloned()
        .collect()
}

/// Number of messages of `kind` sent by a list of actions.
pub fn count_kind(actions: &[Action], kind: MessageKind) -> usize {
    actions
        .iter()
        .filter_map(Action::as_message)
        .filter(|message| message.kind() == kind)
        .count()
}

/// Predictor that records every value it is asked about.
///
/// Numeric values are predicted as `value + offset`; anything else is
/// predicted unchanged. Clones share the record.
#[derive(Debug, Clone, Default)]
pub struct RecordingPredictor {
    seen: Arc<Mutex<Vec<Value>>>,
    offset: i64,
}

impl RecordingPredictor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_offset(offset: i64) -> Self {
        Self {
            offset,
            ..Self::default()
        }
    }

    /// Values passed to [`Predictor::predict`] so far.
    pub fn seen(&self) -> Vec<Value> {
        self.seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Predictor for RecordingPredictor {
    fn predict(&self, value: &Value) -> Value {
        self.seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(value.clone());
        match value.as_i64() {
            Some(n) => Value::from(n + self.offset),
            None => value.clone(),
        }
    }
}
