//! In-process network queue with failure-aware extraction.

use paxsim_messages::Message;
use paxsim_types::NodeId;
use std::collections::VecDeque;
use tracing::trace;

/// Messages in flight, in send order.
///
/// A failed endpoint blocks a message without dropping it: extraction skips
/// messages whose source or destination is failed, and they become
/// deliverable again, in their original relative order, once both endpoints
/// are healthy.
#[derive(Debug, Clone, Default)]
pub struct NetworkQueue {
    queue: VecDeque<Message>,
}

impl NetworkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message to the back of the queue.
    pub fn enqueue(&mut self, message: Message) {
        trace!(message = %message, depth = self.queue.len() + 1, "Enqueued");
        self.queue.push_back(message);
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Messages currently queued, front first.
    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.queue.iter()
    }

    /// Remove and return the first message whose endpoints are both healthy.
    ///
    /// `is_failed` reports the failure state of a node. Returns `None` when
    /// the queue is empty or every queued message is blocked. Scans from the
    /// front, so this is linear in the queue length; in-flight traffic is
    /// bounded by a few messages per acceptor.
    pub fn extract(&mut self, is_failed: impl Fn(NodeId) -> bool) -> Option<Message> {
        let position = self
            .queue
            .iter()
            .position(|message| !is_failed(message.src()) && !is_failed(message.dst()))?;
        self.queue.remove(position)
    }

    /// Number of queued messages currently blocked by a failed endpoint.
    pub fn blocked_count(&self, is_failed: impl Fn(NodeId) -> bool) -> usize {
        self.queue
            .iter()
            .filter(|message| is_failed(message.src()) || is_failed(message.dst()))
            .count()
    }
}
