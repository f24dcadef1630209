//! Human-readable record of a run.

use paxsim_messages::{Message, MessageKind};
use paxsim_types::NodeId;
use std::fmt;

/// What happened at a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    /// A message was delivered to its destination.
    Delivered(Message),
    /// A node failed before the tick's delivery.
    Failed(NodeId),
    /// A node recovered before the tick's delivery.
    Recovered(NodeId),
    /// A scripted PROPOSE targeted a failed proposer and was queued instead.
    Deferred(Message),
    /// Nothing was deliverable.
    Idle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEntry {
    pub tick: u64,
    pub event: TraceEvent,
}

/// Entries of a run in execution order.
///
/// Ticks are rendered zero-padded to the width of the tick budget, so a run
/// with `tmax = 120` prints `007: ...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace {
    entries: Vec<TraceEntry>,
    width: usize,
}

impl Trace {
    pub fn new(tmax: u64) -> Self {
        Self {
            entries: Vec::new(),
            width: tmax.to_string().len(),
        }
    }

    pub fn push(&mut self, tick: u64, event: TraceEvent) {
        self.entries.push(TraceEntry { tick, event });
    }

    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Delivered messages in delivery order.
    pub fn delivered(&self) -> impl Iterator<Item = &Message> {
        self.entries.iter().filter_map(|entry| match &entry.event {
            TraceEvent::Delivered(message) => Some(message),
            _ => None,
        })
    }

    /// Number of delivered messages of `kind`.
    pub fn count_delivered(&self, kind: MessageKind) -> usize {
        self.delivered()
            .filter(|message| message.kind() == kind)
            .count()
    }

    /// Tick at which the first message of `kind` was delivered.
    pub fn first_delivery(&self, kind: MessageKind) -> Option<u64> {
        self.entries.iter().find_map(|entry| match &entry.event {
            TraceEvent::Delivered(message) if message.kind() == kind => Some(entry.tick),
            _ => None,
        })
    }

    /// One rendered line per entry.
    pub fn lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| self.render(entry))
            .collect()
    }

    fn render(&self, entry: &TraceEntry) -> String {
        let prefix = format!("{:0width$}:", entry.tick, width = self.width);
        match &entry.event {
            TraceEvent::Delivered(message) => format!("{prefix} {message}"),
            TraceEvent::Failed(node) => format!("{prefix} ** {node} failed **"),
            TraceEvent::Recovered(node) => format!("{prefix} ** {node} recovered **"),
            TraceEvent::Deferred(message) => format!("{prefix} ** {message} deferred **"),
            TraceEvent::Idle => prefix,
        }
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{}", self.render(entry))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paxsim_test_helpers::fixtures;

    #[test]
    fn test_rendering() {
        let mut trace = Trace::new(120);
        trace.push(0, TraceEvent::Failed(NodeId::acceptor(1)));
        trace.push(0, TraceEvent::Delivered(fixtures::propose(1, 42)));
        trace.push(9, TraceEvent::Idle);
        trace.push(10, TraceEvent::Recovered(NodeId::acceptor(1)));

        assert_eq!(
            trace.lines(),
            vec![
                "000: ** A1 failed **",
                "000: C0 -> P1 PROPOSE value=42",
                "009:",
                "010: ** A1 recovered **",
            ]
        );
        assert_eq!(trace.to_string().lines().count(), 4);
    }

    #[test]
    fn test_width_follows_tmax() {
        let mut trace = Trace::new(5);
        trace.push(3, TraceEvent::Idle);
        assert_eq!(trace.lines(), vec!["3:"]);

        let mut trace = Trace::new(20);
        trace.push(3, TraceEvent::Idle);
        assert_eq!(trace.lines(), vec!["03:"]);
    }

    #[test]
    fn test_delivery_queries() {
        let mut trace = Trace::new(20);
        trace.push(0, TraceEvent::Delivered(fixtures::propose(1, 42)));
        trace.push(1, TraceEvent::Delivered(fixtures::prepare(1, 1, 1)));
        trace.push(2, TraceEvent::Delivered(fixtures::prepare(1, 2, 1)));

        assert_eq!(trace.count_delivered(MessageKind::Prepare), 2);
        assert_eq!(trace.first_delivery(MessageKind::Prepare), Some(1));
        assert_eq!(trace.first_delivery(MessageKind::Accept), None);
        assert_eq!(trace.delivered().count(), 3);
    }
}
