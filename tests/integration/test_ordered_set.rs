//! Ordered-set scenarios through the capability handle.

use anyhow::Result;
use dsbench::keys::key_span;
use dsbench::{BackendKind, BackendOptions, BenchError, RandomKeys, ScriptedKeys};
use proptest::prelude::*;

use crate::test_setup;
use crate::utils::assertions::{assert_strictly_ascending, assert_within_span, expected_after_range};
use crate::utils::{LifecycleHarness, PhaseTrace};

fn harness_with_range(start: i32, end: i32) -> LifecycleHarness {
    LifecycleHarness::with_options(
        BackendKind::OrderedSet,
        BackendOptions {
            ordered_set_range: Some((start, end)),
            ..Default::default()
        },
    )
}

#[test]
fn test_end_to_end_duplicate_then_range_then_teardown() -> Result<()> {
    test_setup!();
    let mut harness = harness_with_range(0, 4);
    // the second 1 is a duplicate and gets redrawn as 7
    let mut keys = ScriptedKeys::new([3, 1, 4, 1, 5, 7]);

    harness.initialize(5)?;
    harness.populate(5, &mut keys)?;
    assert_eq!(keys.drawn(), 6);
    assert_eq!(PhaseTrace::values(&harness.trace().populate, "RBTREE_ADD"), vec![3, 1, 4, 5, 7]);

    let shown = harness.enumerate()?;
    assert_eq!(PhaseTrace::values(&shown, "RBTREE_SHOW"), vec![1, 3, 4, 5, 7]);

    harness.drain()?;
    let drain = &harness.trace().drain;
    assert_eq!(PhaseTrace::values(drain, "RANGE_ERASED"), vec![1, 3, 4]);
    assert_eq!(PhaseTrace::values(drain, "RANGE_MISSING"), vec![0, 2]);
    // remainder shown after the range scan holds only values above 4
    assert_eq!(PhaseTrace::values(drain, "RBTREE_SHOW"), vec![5, 7]);
    let mut removed = PhaseTrace::values(drain, "RBTREE_REMOVE");
    removed.sort_unstable();
    assert_eq!(removed, vec![5, 7]);

    assert!(harness.trace().after_drain.is_empty());
    assert!(harness.snapshot().is_empty());
    assert!(harness.release());
    assert!(!harness.release());
    Ok(())
}

#[test]
fn test_range_outside_contents_leaves_everything_for_teardown() -> Result<()> {
    let mut harness = harness_with_range(100, 120);
    let mut keys = ScriptedKeys::new([2, 8, 5]);
    harness.initialize(3)?;
    harness.populate(3, &mut keys)?;
    harness.drain()?;

    let drain = &harness.trace().drain;
    assert!(PhaseTrace::values(drain, "RANGE_ERASED").is_empty());
    assert_eq!(PhaseTrace::values(drain, "RANGE_MISSING").len(), 21);
    assert_eq!(PhaseTrace::values(drain, "RBTREE_SHOW"), vec![2, 5, 8]);
    assert_eq!(drain.iter().filter(|e| e.op() == "RBTREE_REMOVE").count(), 3);
    Ok(())
}

#[test]
fn test_teardown_frees_every_node_once() -> Result<()> {
    let mut harness = harness_with_range(-2, -1);
    let mut keys = ScriptedKeys::new(1..=15);
    harness.initialize(15)?;
    harness.populate(15, &mut keys)?;
    harness.drain()?;

    let mut sorted = PhaseTrace::values(&harness.trace().drain, "RBTREE_REMOVE");
    sorted.sort_unstable();
    assert_eq!(sorted, (1..=15).collect::<Vec<_>>());
    assert!(harness.trace().after_drain.is_empty());
    Ok(())
}

#[test]
fn test_retry_cap_keeps_partial_contents() -> Result<()> {
    let mut harness = LifecycleHarness::with_options(
        BackendKind::OrderedSet,
        BackendOptions {
            max_duplicate_retries: 4,
            ..Default::default()
        },
    );
    let mut keys = ScriptedKeys::new([6, 2, 2, 2, 2, 2]);
    harness.initialize(3)?;
    let err = harness.populate(3, &mut keys).unwrap_err();
    assert!(matches!(err, BenchError::RetryLimitExceeded { attempts: 4 }));
    assert_eq!(harness.snapshot(), vec![2, 6]);

    // partial contents are still enumerable and drainable
    harness.enumerate()?;
    harness.drain()?;
    assert!(harness.snapshot().is_empty());
    Ok(())
}

#[test]
fn test_random_population_stays_in_key_span() -> Result<()> {
    let mut harness = LifecycleHarness::new(BackendKind::OrderedSet);
    let mut keys = RandomKeys::seeded(2024);
    harness.initialize(50)?;
    harness.populate(50, &mut keys)?;

    let values = harness.snapshot();
    assert_eq!(values.len(), 50);
    assert_strictly_ascending(&values);
    assert_within_span(&values, key_span(50));
    Ok(())
}

proptest! {
    #[test]
    fn prop_range_deletion_removes_exactly_the_range(
        keys in prop::collection::vec(0i32..64, 1..40),
        start in 0i32..64,
        len in 0i32..32,
    ) {
        let end = start + len;
        let mut distinct = keys.clone();
        distinct.sort_unstable();
        distinct.dedup();

        let mut harness = harness_with_range(start, end);
        let count = distinct.len();
        let mut script = ScriptedKeys::new(keys.clone());
        harness.initialize(count).unwrap();
        harness.populate(count, &mut script).unwrap();
        prop_assert_eq!(harness.snapshot(), distinct.clone());

        harness.drain().unwrap();
        let survivors = PhaseTrace::values(&harness.trace().drain, "RBTREE_SHOW");
        prop_assert_eq!(survivors, expected_after_range(&distinct, start, end));
        prop_assert!(harness.snapshot().is_empty());
    }
}
