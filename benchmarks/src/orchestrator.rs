//! Lifecycle orchestrator
//!
//! Drives every requested backend through initialize, populate, enumerate,
//! drain and release. A failing phase is recorded but never skips the phases
//! after it, and a failing backend never stops the batch.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::backends::{key_bound, BackendOptions};
use crate::config::BenchConfig;
use crate::error::{status_of, BenchError, Result, STATUS_OK};
use crate::keys::{KeySource, RandomKeys};
use crate::registry;
use crate::trace::{TraceEvent, TraceSink};
use crate::BackendKind;

/// Where a backend run ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Resolved,
    Initialized,
    Populated,
    Drained,
    Released,
    Aborted,
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunState::Resolved => write!(f, "resolved"),
            RunState::Initialized => write!(f, "initialized"),
            RunState::Populated => write!(f, "populated"),
            RunState::Drained => write!(f, "drained"),
            RunState::Released => write!(f, "released"),
            RunState::Aborted => write!(f, "aborted"),
        }
    }
}

/// Result of one lifecycle phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseOutcome {
    pub status: i32,
    pub error: Option<String>,
}

impl PhaseOutcome {
    pub fn ok() -> Self {
        Self {
            status: STATUS_OK,
            error: None,
        }
    }

    pub fn from_result<T>(result: &Result<T>) -> Self {
        Self {
            status: status_of(result),
            error: result.as_ref().err().map(|e| e.to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}

impl std::fmt::Display for PhaseOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.error {
            None => write!(f, "ok"),
            Some(e) => write!(f, "{} ({})", e, self.status),
        }
    }
}

/// Wall-clock time spent in each phase, in microseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseTimings {
    pub initialize_us: u64,
    pub populate_us: u64,
    pub enumerate_us: u64,
    pub drain_us: u64,
    pub release_us: u64,
}

impl PhaseTimings {
    pub fn total(&self) -> Duration {
        Duration::from_micros(
            self.initialize_us + self.populate_us + self.enumerate_us + self.drain_us + self.release_us,
        )
    }
}

/// Summary of a single backend run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub kind: BackendKind,
    pub name: String,
    pub state: RunState,
    pub initialize: PhaseOutcome,
    pub populate: PhaseOutcome,
    pub drain: PhaseOutcome,
    /// Bitwise OR of the populate and drain status codes, or the initialize
    /// code when the run aborted.
    pub status: i32,
    pub requested: usize,
    /// Values held after populate.
    pub populated: usize,
    /// Values left after drain.
    pub remaining: usize,
    pub timings: PhaseTimings,
    pub timestamp: DateTime<Utc>,
}

impl RunReport {
    fn resolved(kind: BackendKind, name: &str, requested: usize) -> Self {
        Self {
            kind,
            name: name.to_string(),
            state: RunState::Resolved,
            initialize: PhaseOutcome::ok(),
            populate: PhaseOutcome::ok(),
            drain: PhaseOutcome::ok(),
            status: STATUS_OK,
            requested,
            populated: 0,
            remaining: 0,
            timings: PhaseTimings::default(),
            timestamp: Utc::now(),
        }
    }

    pub fn passed(&self) -> bool {
        self.status == STATUS_OK
    }
}

/// Summary of a whole batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub count: usize,
    pub started_at: DateTime<Utc>,
    /// Outcome of the standalone sequence pass, when it ran.
    pub standalone: Option<PhaseOutcome>,
    pub reports: Vec<RunReport>,
    pub passed: usize,
    pub failed: usize,
}

impl BatchReport {
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

fn micros(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX)
}

/// Runs backends through their lifecycle with one shared key source.
pub struct Orchestrator<K: KeySource> {
    keys: K,
    options: BackendOptions,
    standalone_sequence: bool,
}

impl Orchestrator<RandomKeys> {
    /// Orchestrator set up from configuration: seeded keys when a seed is
    /// configured, ordered-set tuning, standalone pass toggle.
    pub fn from_config(config: &BenchConfig) -> Self {
        Orchestrator::new(RandomKeys::from_seed_option(config.keys.seed))
            .with_options(config.backend_options())
            .with_standalone_sequence(config.run.standalone_sequence)
    }
}

impl<K: KeySource> Orchestrator<K> {
    pub fn new(keys: K) -> Self {
        Self {
            keys,
            options: BackendOptions::default(),
            standalone_sequence: false,
        }
    }

    pub fn with_options(mut self, options: BackendOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_standalone_sequence(mut self, enabled: bool) -> Self {
        self.standalone_sequence = enabled;
        self
    }

    pub fn options(&self) -> &BackendOptions {
        &self.options
    }

    pub fn keys(&self) -> &K {
        &self.keys
    }

    /// Run one backend, resolved by registry index. Only an unknown index is
    /// an error; every backend failure lands in the report instead.
    pub fn run_kind(
        &mut self,
        index: usize,
        count: usize,
        sink: &mut dyn TraceSink,
    ) -> Result<RunReport> {
        let descriptor = registry::resolve(index)?;
        let mut report = RunReport::resolved(descriptor.kind, descriptor.name, count);
        let mut handle = descriptor.acquire();
        handle.set_options(self.options);

        info!("Running {} Test Suite", descriptor.name);

        let started = Instant::now();
        let initialized = handle.initialize(count, sink);
        report.timings.initialize_us = micros(started);
        report.initialize = PhaseOutcome::from_result(&initialized);
        if let Err(e) = initialized {
            warn!(backend = descriptor.name, error = %e, category = e.category(), "initialize failed");
            report.state = RunState::Aborted;
            report.status = e.status_code();
            descriptor.free(handle);
            return Ok(report);
        }
        report.state = RunState::Initialized;
        debug!(backend = descriptor.name, state = %report.state, "lifecycle");

        let started = Instant::now();
        let populated = handle.populate(count, &mut self.keys, sink);
        report.timings.populate_us = micros(started);
        report.populate = PhaseOutcome::from_result(&populated);
        report.populated = handle.len();
        match &populated {
            Ok(()) => {
                report.state = RunState::Populated;
                debug!(backend = descriptor.name, state = %report.state, "lifecycle");
            }
            Err(e) => warn!(backend = descriptor.name, error = %e, "adding elements failed"),
        }

        // partial contents are still shown
        let started = Instant::now();
        if let Err(e) = handle.enumerate(sink) {
            warn!(backend = descriptor.name, error = %e, "enumerate failed");
        }
        report.timings.enumerate_us = micros(started);

        let started = Instant::now();
        let drained = handle.drain(sink);
        report.timings.drain_us = micros(started);
        report.drain = PhaseOutcome::from_result(&drained);
        report.remaining = handle.len();
        match &drained {
            Ok(()) => {
                report.state = RunState::Drained;
                debug!(backend = descriptor.name, state = %report.state, "lifecycle");
            }
            Err(e) => warn!(backend = descriptor.name, error = %e, "removing elements failed"),
        }

        let started = Instant::now();
        descriptor.free(handle);
        report.timings.release_us = micros(started);
        report.state = RunState::Released;

        report.status = report.populate.status | report.drain.status;
        debug!(
            backend = descriptor.name,
            status = report.status,
            total_us = report.timings.total().as_micros() as u64,
            "run finished"
        );
        Ok(report)
    }

    /// Run the standalone sequence pass (when enabled) and then every kind in
    /// `kinds`. Fails only on a non-positive count.
    pub fn run_batch(
        &mut self,
        count: i64,
        kinds: &[BackendKind],
        sink: &mut dyn TraceSink,
    ) -> Result<BatchReport> {
        let count = match usize::try_from(count) {
            Ok(n) if n > 0 => n,
            _ => {
                warn!(count, "invalid size");
                return Err(BenchError::InvalidCount { count });
            }
        };

        info!(count, "starting batch");
        let mut batch = BatchReport {
            count,
            started_at: Utc::now(),
            standalone: None,
            reports: Vec::with_capacity(kinds.len()),
            passed: 0,
            failed: 0,
        };

        if self.standalone_sequence {
            let result = run_standalone_sequence(count, &mut self.keys, sink);
            if let Err(e) = &result {
                warn!(error = %e, "standalone sequence pass failed");
            }
            batch.standalone = Some(PhaseOutcome::from_result(&result));
        }

        for kind in kinds {
            let report = self.run_kind(kind.index(), count, sink)?;
            if report.passed() {
                batch.passed += 1;
            } else {
                warn!(backend = %report.name, status = report.status, "{} test failed", report.name);
                batch.failed += 1;
            }
            batch.reports.push(report);
        }

        info!(passed = batch.passed, failed = batch.failed, "batch finished");
        Ok(batch)
    }
}

/// Single-function sequence exercise: append `count` keys, show them, delete
/// them front to back. Returns how many values were deleted.
pub fn run_standalone_sequence(
    count: usize,
    keys: &mut dyn KeySource,
    sink: &mut dyn TraceSink,
) -> Result<usize> {
    info!("Running single function list test");

    let mut items: Vec<i32> = Vec::new();
    let bound = key_bound(count);
    for _ in 0..count {
        let value = keys.next_key(bound);
        items
            .try_reserve(1)
            .map_err(|e| BenchError::allocation(format!("list addition: {}", e)))?;
        items.push(value);
        sink.record(TraceEvent::StandaloneAdd { value });
    }

    for &value in &items {
        sink.record(TraceEvent::StandaloneShow { value });
    }

    let mut deleted = 0;
    for value in items.drain(..) {
        sink.record(TraceEvent::StandaloneDel { value });
        deleted += 1;
    }
    Ok(deleted)
}
