//! Append-only sequence backend.

use super::{key_bound, Backend};
use crate::error::{BenchError, Result};
use crate::keys::KeySource;
use crate::trace::{TraceEvent, TraceSink};
use crate::BackendKind;

#[derive(Debug, Default)]
pub struct SequenceBackend {
    items: Vec<i32>,
}

impl SequenceBackend {
    /// The sequence grows on demand, so `count` is not used for sizing.
    pub fn initialize(_count: usize) -> Result<Self> {
        Ok(Self::default())
    }

    pub fn push(&mut self, value: i32) -> Result<()> {
        self.items
            .try_reserve(1)
            .map_err(|e| BenchError::allocation(format!("sequence entry: {}", e)))?;
        self.items.push(value);
        Ok(())
    }
}

impl Backend for SequenceBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Sequence
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
            self.push(value)?;
            sink.record(TraceEvent::ListAdd { value });
        }
        Ok(())
    }

    fn enumerate(&self, sink: &mut dyn TraceSink) {
        for &value in &self.items {
            sink.record(TraceEvent::ListShow { value });
        }
    }

    fn drain(&mut self, sink: &mut dyn TraceSink) -> Result<()> {
        for value in self.items.drain(..) {
            sink.record(TraceEvent::ListDel { value });
        }
        self.enumerate(sink);
        Ok(())
    }

    fn snapshot(&self) -> Vec<i32> {
        self.items.clone()
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}
