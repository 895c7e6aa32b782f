use anyhow::{ensure, Context, Result};
use dsbench::{Backend, BackendKind, BackendOptions, Handle, KeySource, RecordingSink, TraceEvent};

/// Trace events split by the lifecycle phase that produced them.
#[derive(Debug, Default, Clone)]
pub struct PhaseTrace {
    pub initialize: Vec<TraceEvent>,
    pub populate: Vec<TraceEvent>,
    pub enumerate: Vec<TraceEvent>,
    pub drain: Vec<TraceEvent>,
    /// Enumeration taken after drain, before release.
    pub after_drain: Vec<TraceEvent>,
}

impl PhaseTrace {
    /// Values of `op` events within one phase.
    pub fn values(events: &[TraceEvent], op: &str) -> Vec<i32> {
        events
            .iter()
            .filter(|e| e.op() == op)
            .filter_map(TraceEvent::value)
            .collect()
    }
}

/// Drives a single handle phase by phase, recording what each phase traced.
pub struct LifecycleHarness {
    handle: Handle,
    sink: RecordingSink,
    trace: PhaseTrace,
}

impl LifecycleHarness {
    pub fn new(kind: BackendKind) -> Self {
        Self::with_options(kind, BackendOptions::default())
    }

    pub fn with_options(kind: BackendKind, options: BackendOptions) -> Self {
        Self {
            handle: Handle::new(kind).with_options(options),
            sink: RecordingSink::new(),
            trace: PhaseTrace::default(),
        }
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    pub fn trace(&self) -> &PhaseTrace {
        &self.trace
    }

    pub fn initialize(&mut self, count: usize) -> Result<()> {
        let result = self.handle.initialize(count, &mut self.sink);
        self.trace.initialize = self.sink.take();
        result.context("initialize")
    }

    /// Populate, returning the library error untouched so callers can match on it.
    pub fn populate(&mut self, count: usize, keys: &mut dyn KeySource) -> dsbench::Result<()> {
        let result = self.handle.populate(count, keys, &mut self.sink);
        self.trace.populate = self.sink.take();
        result
    }

    pub fn enumerate(&mut self) -> Result<Vec<TraceEvent>> {
        self.handle.enumerate(&mut self.sink).context("enumerate")?;
        self.trace.enumerate = self.sink.take();
        Ok(self.trace.enumerate.clone())
    }

    pub fn drain(&mut self) -> Result<()> {
        let result = self.handle.drain(&mut self.sink);
        self.trace.drain = self.sink.take();
        result.context("drain")?;

        self.handle
            .enumerate(&mut self.sink)
            .context("enumerate after drain")?;
        self.trace.after_drain = self.sink.take();
        Ok(())
    }

    /// Contents in natural order, untraced.
    pub fn snapshot(&self) -> Vec<i32> {
        self.handle.context().map(|c| c.snapshot()).unwrap_or_default()
    }

    pub fn release(&mut self) -> bool {
        self.handle.release()
    }

    /// Whole lifecycle with `keys`; fails if anything is left after drain.
    pub fn run(&mut self, count: usize, keys: &mut dyn KeySource) -> Result<()> {
        self.initialize(count)?;
        self.populate(count, keys).context("populate")?;
        self.enumerate()?;
        self.drain()?;
        ensure!(self.handle.is_empty(), "backend not empty after drain");
        ensure!(self.release(), "release found no context");
        Ok(())
    }
}
