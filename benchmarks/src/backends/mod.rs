//! Backends driven through the common lifecycle
//!
//! Each backend owns its whole structure; the capability handle owns the
//! backend. The set of backends is closed, so dispatch goes through
//! [`AnyBackend`] rather than trait objects.

pub mod map;
pub mod ordered_set;
pub mod queue;
pub mod sequence;

pub use map::MapBackend;
pub use ordered_set::OrderedSetBackend;
pub use queue::QueueBackend;
pub use sequence::SequenceBackend;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::keys::KeySource;
use crate::trace::TraceSink;
use crate::BackendKind;

/// Default cap on duplicate draws for a single ordered-set insertion.
pub const DEFAULT_MAX_DUPLICATE_RETRIES: u64 = 1_000_000;

/// Per-run tuning handed to backends at initialize time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendOptions {
    /// Inclusive deletion range for the ordered set; `[0, count]` when unset.
    pub ordered_set_range: Option<(i32, i32)>,
    /// Draws allowed per ordered-set insertion before giving up.
    pub max_duplicate_retries: u64,
}

impl Default for BackendOptions {
    fn default() -> Self {
        Self {
            ordered_set_range: None,
            max_duplicate_retries: DEFAULT_MAX_DUPLICATE_RETRIES,
        }
    }
}

/// Lifecycle operations shared by every backend.
///
/// Construction is each backend's `initialize`; release is dropping it.
pub trait Backend {
    fn kind(&self) -> BackendKind;

    /// Insert up to `count` generated values. On failure, whatever was
    /// inserted before the failing value stays in place and enumerable.
    fn populate(
        &mut self,
        count: usize,
        keys: &mut dyn KeySource,
        sink: &mut dyn TraceSink,
    ) -> Result<()>;

    /// Trace current contents in natural order. No structural side effects.
    fn enumerate(&self, sink: &mut dyn TraceSink);

    /// Remove all contents, leaving the backend empty but usable.
    fn drain(&mut self, sink: &mut dyn TraceSink) -> Result<()>;

    /// Current contents in natural order, untraced.
    fn snapshot(&self) -> Vec<i32>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One of the four backend kinds.
#[derive(Debug)]
pub enum AnyBackend {
    Sequence(SequenceBackend),
    Queue(QueueBackend),
    Map(MapBackend),
    OrderedSet(OrderedSetBackend),
}

impl AnyBackend {
    /// Allocate backend state sized for `count` future insertions.
    pub fn initialize(
        kind: BackendKind,
        count: usize,
        options: &BackendOptions,
        sink: &mut dyn TraceSink,
    ) -> Result<Self> {
        Ok(match kind {
            BackendKind::Sequence => AnyBackend::Sequence(SequenceBackend::initialize(count)?),
            BackendKind::Queue => AnyBackend::Queue(QueueBackend::initialize(count, sink)?),
            BackendKind::Map => AnyBackend::Map(MapBackend::initialize(count)?),
            BackendKind::OrderedSet => {
                AnyBackend::OrderedSet(OrderedSetBackend::initialize(count, options)?)
            }
        })
    }

    fn as_backend(&self) -> &dyn Backend {
        match self {
            AnyBackend::Sequence(b) => b,
            AnyBackend::Queue(b) => b,
            AnyBackend::Map(b) => b,
            AnyBackend::OrderedSet(b) => b,
        }
    }

    fn as_backend_mut(&mut self) -> &mut dyn Backend {
        match self {
            AnyBackend::Sequence(b) => b,
            AnyBackend::Queue(b) => b,
            AnyBackend::Map(b) => b,
            AnyBackend::OrderedSet(b) => b,
        }
    }

    pub fn as_ordered_set(&self) -> Option<&OrderedSetBackend> {
        match self {
            AnyBackend::OrderedSet(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_queue(&self) -> Option<&QueueBackend> {
        match self {
            AnyBackend::Queue(b) => Some(b),
            _ => None,
        }
    }
}

impl Backend for AnyBackend {
    fn kind(&self) -> BackendKind {
        self.as_backend().kind()
    }

    fn populate(
        &mut self,
        count: usize,
        keys: &mut dyn KeySource,
        sink: &mut dyn TraceSink,
    ) -> Result<()> {
        self.as_backend_mut().populate(count, keys, sink)
    }

    fn enumerate(&self, sink: &mut dyn TraceSink) {
        self.as_backend().enumerate(sink)
    }

    fn drain(&mut self, sink: &mut dyn TraceSink) -> Result<()> {
        self.as_backend_mut().drain(sink)
    }

    fn snapshot(&self) -> Vec<i32> {
        self.as_backend().snapshot()
    }

    fn len(&self) -> usize {
        self.as_backend().len()
    }
}

/// Key bound for a requested count, saturating at `i32::MAX`.
pub(crate) fn key_bound(count: usize) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}
