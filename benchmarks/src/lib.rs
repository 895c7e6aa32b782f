//! dsbench data-structure micro-benchmark harness
//!
//! This crate drives four interchangeable data-structure backends through one
//! uniform lifecycle and reports what each operation did:
//!
//! - Append-only sequence, bounded ring-buffer queue, sparse map with
//!   identifier allocation
//! - Ordered set backed by a left-leaning red-black tree, with range-bounded
//!   deletion and full teardown
//! - Capability handles resolved through a fixed registry
//! - An orchestrator that runs initialize, populate, enumerate, drain and
//!   release for every backend and aggregates the status codes
//! - Structured per-operation traces through pluggable sinks

pub mod backends;
pub mod config;
pub mod error;
pub mod handle;
pub mod keys;
pub mod orchestrator;
pub mod rbtree;
pub mod registry;
pub mod trace;

use serde::{Deserialize, Serialize};

pub use backends::{AnyBackend, Backend, BackendOptions};
pub use config::BenchConfig;
pub use error::{BenchError, ConfigError, Result};
pub use handle::Handle;
pub use keys::{KeySource, RandomKeys, ScriptedKeys};
pub use orchestrator::{BatchReport, Orchestrator, PhaseOutcome, RunReport, RunState};
pub use registry::BackendDescriptor;
pub use trace::{NullSink, RecordingSink, TraceEvent, TraceSink, TracingSink};

/// Backend kinds, in registry order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    #[serde(alias = "list")]
    Sequence,
    Queue,
    Map,
    #[serde(alias = "rbtree")]
    OrderedSet,
}

impl BackendKind {
    /// Every kind, in the order the batch runs them.
    pub const ALL: [BackendKind; 4] = [
        BackendKind::Sequence,
        BackendKind::Queue,
        BackendKind::Map,
        BackendKind::OrderedSet,
    ];

    /// Registry index of this kind.
    pub fn index(self) -> usize {
        match self {
            BackendKind::Sequence => 0,
            BackendKind::Queue => 1,
            BackendKind::Map => 2,
            BackendKind::OrderedSet => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Short display name used in trace banners.
    pub fn name(self) -> &'static str {
        match self {
            BackendKind::Sequence => "list",
            BackendKind::Queue => "queue",
            BackendKind::Map => "map",
            BackendKind::OrderedSet => "rbtree",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "list" | "sequence" => Ok(BackendKind::Sequence),
            "queue" | "kfifo" => Ok(BackendKind::Queue),
            "map" | "idr" => Ok(BackendKind::Map),
            "rbtree" | "ordered-set" | "ordered_set" => Ok(BackendKind::OrderedSet),
            other => Err(format!(
                "unknown backend '{}', expected one of: list, queue, map, rbtree",
                other
            )),
        }
    }
}
