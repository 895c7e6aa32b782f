//! Whole-batch behaviour of the orchestrator.

use anyhow::Result;
use dsbench::error::{STATUS_EINVAL, STATUS_ENOSPC};
use dsbench::{
    BackendKind, BackendOptions, BenchConfig, BenchError, Orchestrator, RandomKeys,
    RecordingSink, RunState, ScriptedKeys,
};

use crate::test_setup;

#[test]
fn test_batch_runs_every_kind_in_registry_order() -> Result<()> {
    test_setup!();
    let mut orchestrator = Orchestrator::new(RandomKeys::seeded(9)).with_standalone_sequence(true);
    let mut sink = RecordingSink::new();
    let batch = orchestrator.run_batch(5, &BackendKind::ALL, &mut sink)?;

    let kinds: Vec<_> = batch.reports.iter().map(|r| r.kind).collect();
    assert_eq!(kinds, BackendKind::ALL.to_vec());
    assert!(batch.all_passed());
    assert!(batch
        .reports
        .iter()
        .all(|r| r.state == RunState::Released && r.remaining == 0));

    // the standalone pass traces before any backend
    assert_eq!(sink.events()[0].op(), "LIST1_ADD");
    assert_eq!(sink.count_of("LIST1_DEL"), 5);
    Ok(())
}

#[test]
fn test_failures_are_combined_and_batch_continues() -> Result<()> {
    let options = BackendOptions {
        max_duplicate_retries: 3,
        ..Default::default()
    };
    // list and queue take two keys each, then the tree sees only repeats of 0
    let keys = ScriptedKeys::new([1, 2, 3, 4, 0, 0, 0, 0]);
    let mut orchestrator = Orchestrator::new(keys).with_options(options);
    let mut sink = RecordingSink::new();
    let kinds = [BackendKind::Sequence, BackendKind::Queue, BackendKind::OrderedSet];
    let batch = orchestrator.run_batch(2, &kinds, &mut sink)?;

    assert_eq!(batch.passed, 2);
    assert_eq!(batch.failed, 1);

    let tree = &batch.reports[2];
    assert_eq!(tree.populate.status, STATUS_ENOSPC);
    assert!(tree.drain.is_ok());
    assert_eq!(tree.status, tree.populate.status | tree.drain.status);
    assert_eq!(tree.state, RunState::Released);
    assert_eq!(tree.populated, 1);
    assert_eq!(tree.remaining, 0);
    assert_eq!(sink.values_of("RANGE_ERASED"), vec![0]);
    assert_eq!(orchestrator.keys().remaining(), 0);
    Ok(())
}

#[test]
fn test_non_positive_count_touches_no_backend() {
    let mut orchestrator = Orchestrator::new(ScriptedKeys::new([])).with_standalone_sequence(true);
    let mut sink = RecordingSink::new();
    for count in [0, -5, i64::MIN] {
        let err = orchestrator
            .run_batch(count, &BackendKind::ALL, &mut sink)
            .unwrap_err();
        assert!(matches!(err, BenchError::InvalidCount { .. }));
    }
    assert!(sink.is_empty());
    assert_eq!(orchestrator.keys().drawn(), 0);
}

#[test]
fn test_invalid_config_range_aborts_only_the_tree() -> Result<()> {
    let mut config = BenchConfig::default();
    config.keys.seed = Some(3);
    config.run.standalone_sequence = false;
    config.ordered_set.range_start = Some(10);
    config.ordered_set.range_end = Some(2);

    let mut orchestrator = Orchestrator::from_config(&config);
    let mut sink = RecordingSink::new();
    let batch = orchestrator.run_batch(config.run.count, &config.run.backends, &mut sink)?;

    assert_eq!(batch.failed, 1);
    let tree = &batch.reports[3];
    assert_eq!(tree.state, RunState::Aborted);
    assert_eq!(tree.status, STATUS_EINVAL);
    assert!(tree.initialize.error.is_some());
    assert!(batch.standalone.is_none());
    Ok(())
}

#[test]
fn test_batch_report_serializes() -> Result<()> {
    let mut orchestrator = Orchestrator::new(RandomKeys::seeded(1));
    let batch = orchestrator.run_batch(2, &[BackendKind::Map], &mut RecordingSink::new())?;
    let json = serde_json::to_value(&batch)?;
    assert_eq!(json["count"], 2);
    assert_eq!(json["reports"][0]["kind"], "map");
    assert_eq!(json["reports"][0]["state"], "released");
    Ok(())
}
