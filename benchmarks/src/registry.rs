//! Fixed table of backend descriptors, indexed by kind.

use crate::error::{BenchError, Result};
use crate::handle::Handle;
use crate::BackendKind;

/// Immutable registry entry: display name plus handle constructor/destructor.
#[derive(Debug, Clone, Copy)]
pub struct BackendDescriptor {
    pub name: &'static str,
    pub kind: BackendKind,
    acquire: fn() -> Handle,
    free: fn(Handle),
}

impl BackendDescriptor {
    /// Produce a fresh, uninitialized handle for this kind.
    pub fn acquire(&self) -> Handle {
        (self.acquire)()
    }

    /// Release whatever the handle still owns and drop it.
    pub fn free(&self, handle: Handle) {
        (self.free)(handle)
    }
}

fn acquire_sequence() -> Handle {
    Handle::new(BackendKind::Sequence)
}

fn acquire_queue() -> Handle {
    Handle::new(BackendKind::Queue)
}

fn acquire_map() -> Handle {
    Handle::new(BackendKind::Map)
}

fn acquire_ordered_set() -> Handle {
    Handle::new(BackendKind::OrderedSet)
}

fn free_handle(mut handle: Handle) {
    handle.release();
}

static REGISTRY: [BackendDescriptor; 4] = [
    BackendDescriptor {
        name: "list",
        kind: BackendKind::Sequence,
        acquire: acquire_sequence,
        free: free_handle,
    },
    BackendDescriptor {
        name: "queue",
        kind: BackendKind::Queue,
        acquire: acquire_queue,
        free: free_handle,
    },
    BackendDescriptor {
        name: "map",
        kind: BackendKind::Map,
        acquire: acquire_map,
        free: free_handle,
    },
    BackendDescriptor {
        name: "rbtree",
        kind: BackendKind::OrderedSet,
        acquire: acquire_ordered_set,
        free: free_handle,
    },
];

/// Look up a descriptor by integer kind.
pub fn resolve(index: usize) -> Result<&'static BackendDescriptor> {
    REGISTRY.get(index).ok_or(BenchError::InvalidKind { index })
}

pub fn descriptor(kind: BackendKind) -> &'static BackendDescriptor {
    &REGISTRY[kind.index()]
}

pub fn descriptors() -> &'static [BackendDescriptor] {
    &REGISTRY
}
