//! Capability handle: the lifecycle operations bound to one backend context.

use tracing::{debug, warn};

use crate::backends::{AnyBackend, Backend, BackendOptions};
use crate::error::{BenchError, Result};
use crate::keys::KeySource;
use crate::trace::TraceSink;
use crate::BackendKind;

/// Owns at most one backend context between `initialize` and `release`.
#[derive(Debug)]
pub struct Handle {
    kind: BackendKind,
    options: BackendOptions,
    context: Option<AnyBackend>,
}

impl Handle {
    pub fn new(kind: BackendKind) -> Self {
        Self {
            kind,
            options: BackendOptions::default(),
            context: None,
        }
    }

    pub fn with_options(mut self, options: BackendOptions) -> Self {
        self.options = options;
        self
    }

    pub fn set_options(&mut self, options: BackendOptions) {
        self.options = options;
    }

    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    pub fn is_initialized(&self) -> bool {
        self.context.is_some()
    }

    pub fn context(&self) -> Option<&AnyBackend> {
        self.context.as_ref()
    }

    /// Number of values held, zero when there is no context.
    pub fn len(&self) -> usize {
        self.context.as_ref().map_or(0, |c| c.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn initialize(&mut self, count: usize, sink: &mut dyn TraceSink) -> Result<()> {
        if self.context.is_some() {
            return Err(BenchError::invalid_argument(format!(
                "{} handle is already initialized",
                self.kind
            )));
        }
        if count == 0 {
            return Err(BenchError::invalid_argument("element count must be positive"));
        }
        let backend = AnyBackend::initialize(self.kind, count, &self.options, sink)?;
        debug!(kind = %self.kind, count, "context initialized");
        self.context = Some(backend);
        Ok(())
    }

    pub fn populate(
        &mut self,
        count: usize,
        keys: &mut dyn KeySource,
        sink: &mut dyn TraceSink,
    ) -> Result<()> {
        self.context_mut()?.populate(count, keys, sink)
    }

    pub fn enumerate(&self, sink: &mut dyn TraceSink) -> Result<()> {
        match &self.context {
            Some(backend) => {
                backend.enumerate(sink);
                Ok(())
            }
            None => {
                warn!(kind = %self.kind, "enumerate on a handle without context");
                Err(missing_context(self.kind))
            }
        }
    }

    pub fn drain(&mut self, sink: &mut dyn TraceSink) -> Result<()> {
        self.context_mut()?.drain(sink)
    }

    /// Free the context. Returns whether there was one; releasing twice, or
    /// before initialize, does nothing.
    pub fn release(&mut self) -> bool {
        match self.context.take() {
            Some(backend) => {
                debug!(kind = %self.kind, remaining = backend.len(), "context released");
                drop(backend);
                true
            }
            None => false,
        }
    }

    fn context_mut(&mut self) -> Result<&mut AnyBackend> {
        let kind = self.kind;
        self.context.as_mut().ok_or_else(|| missing_context(kind))
    }
}

fn missing_context(kind: BackendKind) -> BenchError {
    BenchError::invalid_argument(format!("{} handle has no context", kind))
}
