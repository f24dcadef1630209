//! Core abstractions shared by the protocol state machines and the scheduler.
//!
//! Node state machines never touch the network queue or other nodes directly.
//! They react to one delivered [`paxsim_messages::Message`] at a time and
//! return [`Action`]s; the scheduler that owns the queue and the node
//! registries carries them out.

mod action;
mod traits;

pub use action::Action;
pub use traits::{IdentityPredictor, Predictor, StateMachine};
