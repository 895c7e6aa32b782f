//! Bounded ring-buffer queue backend.
//!
//! The ring is sized once at initialize, rounded up to a power of two, and
//! never grows afterwards.

use std::collections::VecDeque;

use tracing::debug;

use super::{key_bound, Backend};
use crate::error::{BenchError, Result};
use crate::keys::KeySource;
use crate::trace::{TraceEvent, TraceSink};
use crate::BackendKind;

/// Smallest ring the queue will allocate.
pub const MIN_QUEUE_CAPACITY: usize = 2;

/// Largest request that can still be rounded up without overflowing an `i32`.
pub const MAX_QUEUE_REQUEST: usize = (i32::MAX / 2) as usize;

/// Round a requested element count up to the ring's real capacity.
pub fn queue_capacity(requested: usize) -> Result<usize> {
    if requested > MAX_QUEUE_REQUEST {
        return Err(BenchError::invalid_argument(format!(
            "queue size {} overflows when rounded to a power of two",
            requested
        )));
    }
    Ok(requested.next_power_of_two().max(MIN_QUEUE_CAPACITY))
}

#[derive(Debug)]
pub struct QueueBackend {
    ring: VecDeque<i32>,
    capacity: usize,
}

impl QueueBackend {
    pub fn initialize(count: usize, sink: &mut dyn TraceSink) -> Result<Self> {
        let capacity = queue_capacity(count)?;
        debug!(requested = count, capacity, "sizing queue");
        sink.record(TraceEvent::Resize {
            requested: count,
            actual: capacity,
        });

        let mut ring = VecDeque::new();
        ring.try_reserve_exact(capacity)
            .map_err(|e| BenchError::allocation(format!("queue ring of {}: {}", capacity, e)))?;
        Ok(Self { ring, capacity })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn enqueue(&mut self, value: i32) -> Result<()> {
        if self.ring.len() >= self.capacity {
            return Err(BenchError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        self.ring.push_back(value);
        Ok(())
    }

    pub fn dequeue(&mut self) -> Option<i32> {
        self.ring.pop_front()
    }
}

impl Backend for QueueBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Queue
    }

    fn populate(
        &mut self,
        count: usize,
        keys: &mut dyn KeySource,
        sink: &mut dyn TraceSink,
    ) -> Result<()> {
        let bound = key_bound(count);
        for _ in 0..count {
            let value = keys.next_key(bound);
            self.enqueue(value)?;
            sink.record(TraceEvent::Enqueue { value });
        }
        Ok(())
    }

    fn enumerate(&self, sink: &mut dyn TraceSink) {
        for &value in &self.ring {
            sink.record(TraceEvent::QueueShow { value });
        }
    }

    fn drain(&mut self, sink: &mut dyn TraceSink) -> Result<()> {
        while let Some(value) = self.dequeue() {
            sink.record(TraceEvent::Dequeue { value });
        }
        Ok(())
    }

    fn snapshot(&self) -> Vec<i32> {
        self.ring.iter().copied().collect()
    }

    fn len(&self) -> usize {
        self.ring.len()
    }
}
