//! Sequence, queue and map backends through the capability handle.

use anyhow::Result;
use dsbench::backends::queue::queue_capacity;
use dsbench::{BackendKind, BenchError, ScriptedKeys, TraceEvent};

use crate::utils::{LifecycleHarness, PhaseTrace};

#[test]
fn test_sequence_keeps_insertion_order() -> Result<()> {
    let mut harness = LifecycleHarness::new(BackendKind::Sequence);
    let mut keys = ScriptedKeys::new([7, 3, 7, 1]);
    harness.initialize(4)?;
    harness.populate(4, &mut keys)?;

    let shown = harness.enumerate()?;
    assert_eq!(PhaseTrace::values(&shown, "LIST_SHOW"), vec![7, 3, 7, 1]);

    harness.drain()?;
    assert_eq!(
        PhaseTrace::values(&harness.trace().drain, "LIST_DEL"),
        vec![7, 3, 7, 1]
    );
    assert!(harness.trace().after_drain.is_empty());
    Ok(())
}

#[test]
fn test_queue_sizing() -> Result<()> {
    for (requested, actual) in [(1, 2), (5, 8), (8, 8)] {
        assert_eq!(queue_capacity(requested)?, actual);

        let mut harness = LifecycleHarness::new(BackendKind::Queue);
        harness.initialize(requested)?;
        assert_eq!(
            harness.trace().initialize,
            vec![TraceEvent::Resize { requested, actual }]
        );
        let capacity = harness
            .handle()
            .context()
            .and_then(|c| c.as_queue())
            .map(|q| q.capacity());
        assert_eq!(capacity, Some(actual));
    }
    Ok(())
}

#[test]
fn test_queue_fifo_and_full_ring() -> Result<()> {
    let mut harness = LifecycleHarness::new(BackendKind::Queue);
    let mut keys = ScriptedKeys::new([5, 9, 2, 4, 6]);
    harness.initialize(3)?;
    harness.populate(4, &mut keys)?;

    // capacity is 4, so one more enqueue fails
    let err = harness.populate(1, &mut keys).unwrap_err();
    assert!(matches!(err, BenchError::CapacityExceeded { capacity: 4 }));

    let shown = harness.enumerate()?;
    assert_eq!(PhaseTrace::values(&shown, "QUEUE_SHOW"), vec![5, 9, 2, 4]);
    // enumerate does not consume
    assert_eq!(harness.snapshot(), vec![5, 9, 2, 4]);

    harness.drain()?;
    assert_eq!(
        PhaseTrace::values(&harness.trace().drain, "DEQUEUE"),
        vec![5, 9, 2, 4]
    );
    Ok(())
}

#[test]
fn test_map_allocates_ids_in_range() -> Result<()> {
    let mut harness = LifecycleHarness::new(BackendKind::Map);
    let mut keys = ScriptedKeys::new([11, 11, 4]);
    harness.initialize(3)?;
    harness.populate(3, &mut keys)?;

    let ids: Vec<usize> = harness.trace().populate.iter().filter_map(TraceEvent::id).collect();
    assert_eq!(ids, vec![0, 1, 2]);

    let err = harness.populate(1, &mut keys).unwrap_err();
    assert!(matches!(err, BenchError::RangeExhausted { lower: 0, upper: 3 }));

    harness.drain()?;
    assert_eq!(
        harness.trace().drain,
        vec![TraceEvent::MapDestroy { removed: 3 }]
    );
    assert!(harness.trace().after_drain.is_empty());
    Ok(())
}
