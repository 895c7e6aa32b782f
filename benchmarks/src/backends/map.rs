//! Sparse integer-keyed map backend with identifier allocation.
//!
//! Identifiers live in `[0, count)` and are handed out lowest-free-first.

use std::collections::BTreeMap;

use tracing::debug;

use super::{key_bound, Backend};
use crate::error::{BenchError, Result};
use crate::keys::KeySource;
use crate::trace::{TraceEvent, TraceSink};
use crate::BackendKind;

#[derive(Debug)]
pub struct MapBackend {
    entries: BTreeMap<usize, i32>,
    lower: usize,
    upper: usize,
    // every identifier below this one is taken
    low_water: usize,
}

impl MapBackend {
    pub fn initialize(count: usize) -> Result<Self> {
        debug!(lower = 0, upper = count, "using identifier range");
        Ok(Self {
            entries: BTreeMap::new(),
            lower: 0,
            upper: count,
            low_water: 0,
        })
    }

    /// Identifier range `[lower, upper)`.
    pub fn id_range(&self) -> (usize, usize) {
        (self.lower, self.upper)
    }

    /// Store `value` under the lowest free identifier.
    pub fn allocate(&mut self, value: i32) -> Result<usize> {
        let mut id = self.low_water.max(self.lower);
        while self.entries.contains_key(&id) {
            id += 1;
        }
        if id >= self.upper {
            return Err(BenchError::RangeExhausted {
                lower: self.lower,
                upper: self.upper,
            });
        }
        self.entries.insert(id, value);
        self.low_water = id + 1;
        Ok(id)
    }

    pub fn get(&self, id: usize) -> Option<i32> {
        self.entries.get(&id).copied()
    }
}

impl Backend for MapBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Map
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
            let id = self.allocate(value)?;
            sink.record(TraceEvent::MapAdd { id, value });
        }
        Ok(())
    }

    fn enumerate(&self, sink: &mut dyn TraceSink) {
        for (&id, &value) in &self.entries {
            sink.record(TraceEvent::MapShow { id, value });
        }
    }

    fn drain(&mut self, sink: &mut dyn TraceSink) -> Result<()> {
        let removed = self.entries.len();
        self.entries.clear();
        self.low_water = self.lower;
        sink.record(TraceEvent::MapDestroy { removed });
        self.enumerate(sink);
        Ok(())
    }

    /// Values in identifier order.
    fn snapshot(&self) -> Vec<i32> {
        self.entries.values().copied().collect()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
