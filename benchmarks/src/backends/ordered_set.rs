//! Ordered-set backend: an [`RbTree`] plus an inclusive deletion range.

use tracing::{debug, warn};

use super::{key_bound, Backend, BackendOptions};
use crate::error::{BenchError, Result};
use crate::keys::KeySource;
use crate::rbtree::RbTree;
use crate::trace::{TraceEvent, TraceSink};
use crate::BackendKind;

#[derive(Debug)]
pub struct OrderedSetBackend {
    tree: RbTree,
    start: i32,
    end: i32,
    max_duplicate_retries: u64,
}

impl OrderedSetBackend {
    /// Empty tree with the deletion range `[0, count]` unless overridden.
    pub fn initialize(count: usize, options: &BackendOptions) -> Result<Self> {
        let (start, end) = options
            .ordered_set_range
            .unwrap_or((0, key_bound(count)));
        if start > end {
            return Err(BenchError::invalid_argument(format!(
                "deletion range [{}, {}] is empty",
                start, end
            )));
        }
        if options.max_duplicate_retries == 0 {
            return Err(BenchError::invalid_argument(
                "max_duplicate_retries must be positive",
            ));
        }
        Ok(Self {
            tree: RbTree::new(),
            start,
            end,
            max_duplicate_retries: options.max_duplicate_retries,
        })
    }

    /// Inclusive deletion range.
    pub fn range(&self) -> (i32, i32) {
        (self.start, self.end)
    }

    pub fn tree(&self) -> &RbTree {
        &self.tree
    }

    /// Insert one fresh value, redrawing on duplicates.
    fn insert_distinct(
        &mut self,
        bound: i32,
        keys: &mut dyn KeySource,
        sink: &mut dyn TraceSink,
    ) -> Result<i32> {
        let mut attempts = 0u64;
        loop {
            let candidate = keys.next_key(bound);
            attempts += 1;
            match self.tree.insert(candidate) {
                Ok(()) => {
                    sink.record(TraceEvent::RbtreeAdd { value: candidate });
                    return Ok(candidate);
                }
                Err(e) if e.is_recoverable() => {
                    debug!(candidate, attempts, "duplicate key, drawing again");
                    if attempts >= self.max_duplicate_retries {
                        return Err(BenchError::RetryLimitExceeded { attempts });
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Remove every value inside `[start, end]`, one search per integer.
    /// Returns how many values were found and freed.
    pub fn erase_range(&mut self, sink: &mut dyn TraceSink) -> usize {
        sink.record(TraceEvent::Range {
            start: self.start,
            end: self.end,
        });

        let mut erased = 0;
        for k in self.start..=self.end {
            if self.tree.remove(k) {
                erased += 1;
                sink.record(TraceEvent::RangeErased { value: k });
            } else {
                sink.record(TraceEvent::RangeMissing { value: k });
            }
        }
        erased
    }
}

impl Backend for OrderedSetBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::OrderedSet
    }

    fn populate(
        &mut self,
        count: usize,
        keys: &mut dyn KeySource,
        sink: &mut dyn TraceSink,
    ) -> Result<()> {
        let bound = key_bound(count);
        for inserted in 0..count {
            if let Err(e) = self.insert_distinct(bound, keys, sink) {
                warn!(inserted, requested = count, error = %e, "ordered set populate stopped");
                return Err(e);
            }
        }
        Ok(())
    }

    fn enumerate(&self, sink: &mut dyn TraceSink) {
        for value in &self.tree {
            sink.record(TraceEvent::RbtreeShow { value });
        }
    }

    fn drain(&mut self, sink: &mut dyn TraceSink) -> Result<()> {
        let erased = self.erase_range(sink);
        debug!(erased, start = self.start, end = self.end, "range scan finished");

        // what survived the range scan
        self.enumerate(sink);

        let freed = self
            .tree
            .drain_postorder(|value| sink.record(TraceEvent::RbtreeRemove { value }));
        debug!(freed, "tree torn down");

        self.enumerate(sink);
        Ok(())
    }

    fn snapshot(&self) -> Vec<i32> {
        self.tree.iter().collect()
    }

    fn len(&self) -> usize {
        self.tree.len()
    }
}
