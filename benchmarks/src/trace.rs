//! Per-operation trace output
//!
//! Backends never print. They hand [`TraceEvent`]s to an injected
//! [`TraceSink`], which the host decides how to consume: forward to
//! `tracing`, record for assertions, or drop.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;

/// One line of the append-only trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TraceEvent {
    ListAdd { value: i32 },
    ListShow { value: i32 },
    ListDel { value: i32 },

    #[serde(rename = "LIST1_ADD")]
    StandaloneAdd { value: i32 },
    #[serde(rename = "LIST1_SHOW")]
    StandaloneShow { value: i32 },
    #[serde(rename = "LIST1_DEL")]
    StandaloneDel { value: i32 },

    Enqueue { value: i32 },
    Dequeue { value: i32 },
    QueueShow { value: i32 },
    /// Requested capacity rounded up to the ring's real capacity.
    Resize { requested: usize, actual: usize },

    MapAdd { id: usize, value: i32 },
    MapShow { id: usize, value: i32 },
    MapDestroy { removed: usize },

    RbtreeAdd { value: i32 },
    RbtreeShow { value: i32 },
    RbtreeRemove { value: i32 },
    /// Inclusive interval about to be scanned for range-bounded deletion.
    Range { start: i32, end: i32 },
    RangeErased { value: i32 },
    RangeMissing { value: i32 },
}

impl TraceEvent {
    /// Operation keyword, as printed at the start of the line.
    pub fn op(&self) -> &'static str {
        match self {
            TraceEvent::ListAdd { .. } => "LIST_ADD",
            TraceEvent::ListShow { .. } => "LIST_SHOW",
            TraceEvent::ListDel { .. } => "LIST_DEL",
            TraceEvent::StandaloneAdd { .. } => "LIST1_ADD",
            TraceEvent::StandaloneShow { .. } => "LIST1_SHOW",
            TraceEvent::StandaloneDel { .. } => "LIST1_DEL",
            TraceEvent::Enqueue { .. } => "ENQUEUE",
            TraceEvent::Dequeue { .. } => "DEQUEUE",
            TraceEvent::QueueShow { .. } => "QUEUE_SHOW",
            TraceEvent::Resize { .. } => "RESIZE",
            TraceEvent::MapAdd { .. } => "MAP_ADD",
            TraceEvent::MapShow { .. } => "MAP_SHOW",
            TraceEvent::MapDestroy { .. } => "MAP_DESTROY",
            TraceEvent::RbtreeAdd { .. } => "RBTREE_ADD",
            TraceEvent::RbtreeShow { .. } => "RBTREE_SHOW",
            TraceEvent::RbtreeRemove { .. } => "RBTREE_REMOVE",
            TraceEvent::Range { .. } => "RANGE",
            TraceEvent::RangeErased { .. } => "RANGE_ERASED",
            TraceEvent::RangeMissing { .. } => "RANGE_MISSING",
        }
    }

    /// The element value carried by the event, if it carries one.
    pub fn value(&self) -> Option<i32> {
        match *self {
            TraceEvent::ListAdd { value }
            | TraceEvent::ListShow { value }
            | TraceEvent::ListDel { value }
            | TraceEvent::StandaloneAdd { value }
            | TraceEvent::StandaloneShow { value }
            | TraceEvent::StandaloneDel { value }
            | TraceEvent::Enqueue { value }
            | TraceEvent::Dequeue { value }
            | TraceEvent::QueueShow { value }
            | TraceEvent::MapAdd { value, .. }
            | TraceEvent::MapShow { value, .. }
            | TraceEvent::RbtreeAdd { value }
            | TraceEvent::RbtreeShow { value }
            | TraceEvent::RbtreeRemove { value }
            | TraceEvent::RangeErased { value }
            | TraceEvent::RangeMissing { value } => Some(value),
            TraceEvent::Resize { .. } | TraceEvent::MapDestroy { .. } | TraceEvent::Range { .. } => {
                None
            }
        }
    }

    /// Identifier allocated by the map backend.
    pub fn id(&self) -> Option<usize> {
        match *self {
            TraceEvent::MapAdd { id, .. } | TraceEvent::MapShow { id, .. } => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            TraceEvent::Resize { requested, actual } => {
                write!(f, "{}: {} -> {}", self.op(), requested, actual)
            }
            TraceEvent::MapAdd { id, value } | TraceEvent::MapShow { id, value } => {
                write!(f, "{}<id,value>: <{}, {}>", self.op(), id, value)
            }
            TraceEvent::MapDestroy { removed } => write!(f, "{}: {} entries", self.op(), removed),
            TraceEvent::Range { start, end } => write!(f, "{}: [{},{}]", self.op(), start, end),
            TraceEvent::RangeErased { value } => write!(f, "{} found and erased", value),
            TraceEvent::RangeMissing { value } => write!(f, "{} not found", value),
            _ => match self.value() {
                Some(value) => write!(f, "{}: {}", self.op(), value),
                None => f.write_str(self.op()),
            },
        }
    }
}

/// Observer for trace output.
pub trait TraceSink {
    fn record(&mut self, event: TraceEvent);
}

impl<S: TraceSink + ?Sized> TraceSink for &mut S {
    fn record(&mut self, event: TraceEvent) {
        (**self).record(event)
    }
}

impl<S: TraceSink + ?Sized> TraceSink for Box<S> {
    fn record(&mut self, event: TraceEvent) {
        (**self).record(event)
    }
}

/// Fan out to two sinks.
impl<A: TraceSink, B: TraceSink> TraceSink for (A, B) {
    fn record(&mut self, event: TraceEvent) {
        self.0.record(event);
        self.1.record(event);
    }
}

/// Forwards every event to `tracing` under the `dsbench::trace` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn record(&mut self, event: TraceEvent) {
        info!(
            target: "dsbench::trace",
            op = event.op(),
            value = ?event.value(),
            id = ?event.id(),
            "{}",
            event
        );
    }
}

/// Drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl TraceSink for NullSink {
    fn record(&mut self, _event: TraceEvent) {}
}

/// Keeps every event in order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordingSink {
    events: Vec<TraceEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Values of every event tagged `op`, in trace order.
    pub fn values_of(&self, op: &str) -> Vec<i32> {
        self.events
            .iter()
            .filter(|e| e.op() == op)
            .filter_map(TraceEvent::value)
            .collect()
    }

    pub fn count_of(&self, op: &str) -> usize {
        self.events.iter().filter(|e| e.op() == op).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn take(&mut self) -> Vec<TraceEvent> {
        std::mem::take(&mut self.events)
    }
}

impl TraceSink for RecordingSink {
    fn record(&mut self, event: TraceEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_trace_vocabulary() {
        assert_eq!(TraceEvent::RbtreeAdd { value: 7 }.to_string(), "RBTREE_ADD: 7");
        assert_eq!(
            TraceEvent::MapAdd { id: 0, value: 12 }.to_string(),
            "MAP_ADD<id,value>: <0, 12>"
        );
        assert_eq!(TraceEvent::Range { start: 0, end: 5 }.to_string(), "RANGE: [0,5]");
        assert_eq!(
            TraceEvent::Resize { requested: 5, actual: 8 }.to_string(),
            "RESIZE: 5 -> 8"
        );
        assert_eq!(TraceEvent::RangeMissing { value: 2 }.to_string(), "2 not found");
    }

    #[test]
    fn test_serialized_op_tag() {
        let json = serde_json::to_string(&TraceEvent::StandaloneAdd { value: 4 }).unwrap();
        assert_eq!(json, r#"{"op":"LIST1_ADD","value":4}"#);
        let json = serde_json::to_string(&TraceEvent::MapShow { id: 1, value: 9 }).unwrap();
        assert!(json.contains(r#""op":"MAP_SHOW""#));
        let back: TraceEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TraceEvent::MapShow { id: 1, value: 9 });
    }

    #[test]
    fn test_recording_and_tee() {
        let mut left = RecordingSink::new();
        let mut right = RecordingSink::new();
        {
            let mut tee = (&mut left, &mut right);
            tee.record(TraceEvent::Enqueue { value: 1 });
            tee.record(TraceEvent::Enqueue { value: 2 });
            tee.record(TraceEvent::Dequeue { value: 1 });
        }
        assert_eq!(left, right);
        assert_eq!(left.values_of("ENQUEUE"), vec![1, 2]);
        assert_eq!(left.count_of("DEQUEUE"), 1);
        assert_eq!(left.take().len(), 3);
        assert!(left.is_empty());
    }
}
