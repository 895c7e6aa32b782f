//! Handle and registry contract shared by every backend.

use anyhow::Result;
use dsbench::registry::{self, descriptors};
use dsbench::{BackendKind, BenchError, Handle, NullSink, RandomKeys, ScriptedKeys};

use crate::test_setup;
use crate::utils::LifecycleHarness;

#[test]
fn test_every_backend_completes_its_lifecycle() -> Result<()> {
    test_setup!();
    for kind in BackendKind::ALL {
        let mut harness = LifecycleHarness::new(kind);
        let mut keys = RandomKeys::seeded(kind.index() as u64);
        harness.run(16, &mut keys)?;
        assert!(!harness.handle().is_initialized(), "{} kept its context", kind);
    }
    Ok(())
}

#[test]
fn test_enumerate_has_no_side_effects() -> Result<()> {
    for kind in BackendKind::ALL {
        let mut harness = LifecycleHarness::new(kind);
        let mut keys = ScriptedKeys::new([4, 0, 2]);
        harness.initialize(3)?;
        harness.populate(3, &mut keys)?;

        let before = harness.snapshot();
        let first = harness.enumerate()?;
        let second = harness.enumerate()?;
        assert_eq!(first, second, "{} enumerate changed between calls", kind);
        assert_eq!(harness.snapshot(), before);
    }
    Ok(())
}

#[test]
fn test_drained_backend_is_reusable() -> Result<()> {
    for kind in BackendKind::ALL {
        let mut harness = LifecycleHarness::new(kind);
        harness.initialize(2)?;
        harness.populate(2, &mut ScriptedKeys::new([1, 6]))?;
        harness.drain()?;
        harness.populate(2, &mut ScriptedKeys::new([3, 5]))?;
        assert_eq!(harness.handle().len(), 2, "{} not reusable after drain", kind);
    }
    Ok(())
}

#[test]
fn test_release_is_idempotent() {
    for descriptor in descriptors() {
        let mut never_initialized = descriptor.acquire();
        assert!(!never_initialized.release());
        assert!(!never_initialized.release());

        let mut handle = descriptor.acquire();
        handle.initialize(4, &mut NullSink).unwrap();
        assert!(handle.release());
        assert!(!handle.release());
        descriptor.free(handle);
    }
}

#[test]
fn test_uninitialized_handle_rejects_operations() {
    let mut handle = Handle::new(BackendKind::OrderedSet);
    let mut keys = ScriptedKeys::new([1]);
    assert!(matches!(
        handle.populate(1, &mut keys, &mut NullSink),
        Err(BenchError::InvalidArgument { .. })
    ));
    assert!(matches!(
        handle.drain(&mut NullSink),
        Err(BenchError::InvalidArgument { .. })
    ));
    assert_eq!(keys.drawn(), 0);
}

#[test]
fn test_registry_lookup_is_by_index() {
    let names: Vec<_> = descriptors().iter().map(|d| d.name).collect();
    assert_eq!(names, vec!["list", "queue", "map", "rbtree"]);
    assert!(matches!(
        registry::resolve(descriptors().len()),
        Err(BenchError::InvalidKind { .. })
    ));
}
