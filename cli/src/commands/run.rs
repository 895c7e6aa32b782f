use clap::Args;
use dsbench::{BackendKind, BatchReport, BenchConfig, Orchestrator, RecordingSink, TracingSink};
use tracing::info;

use crate::error::Result;
use crate::output::{OutputFormat, OutputManager};

#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Number of random values to insert into each backend
    #[arg(short = 'n', long, allow_negative_numbers = true)]
    pub count: Option<i64>,

    /// Backend to run (list, queue, map, rbtree); repeat to run several
    #[arg(short, long = "backend", value_name = "KIND")]
    pub backends: Vec<BackendKind>,

    /// Seed the key generator for a reproducible run
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print every trace event after the report
    #[arg(long)]
    pub trace: bool,

    /// Skip the single-function list exercise
    #[arg(long)]
    pub no_standalone: bool,
}

impl RunArgs {
    /// Command-line flags win over file and environment settings.
    pub fn apply_to(&self, config: &mut BenchConfig) {
        if let Some(count) = self.count {
            config.run.count = count;
        }
        if !self.backends.is_empty() {
            config.run.backends = self.backends.clone();
        }
        if self.seed.is_some() {
            config.keys.seed = self.seed;
        }
        if self.trace {
            config.output.include_trace = true;
        }
        if self.no_standalone {
            config.run.standalone_sequence = false;
        }
    }
}

pub fn run(config: &BenchConfig, output: &OutputManager, format: OutputFormat) -> Result<()> {
    info!("Starting dsbench for {} integers", config.run.count);

    let show_trace = config.output.include_trace || format == OutputFormat::Raw;
    let (batch, recorder) = execute(config, show_trace)?;
    output.print_batch(&batch, recorder.as_ref().map(RecordingSink::events))
}

/// Run the configured batch. Trace events are kept in memory only when they
/// will be printed.
fn execute(config: &BenchConfig, keep_trace: bool) -> Result<(BatchReport, Option<RecordingSink>)> {
    let mut orchestrator = Orchestrator::from_config(config);
    let (count, kinds) = (config.run.count, &config.run.backends);

    if keep_trace {
        let mut recorder = RecordingSink::new();
        let batch = orchestrator.run_batch(count, kinds, &mut (TracingSink, &mut recorder))?;
        Ok((batch, Some(recorder)))
    } else {
        let batch = orchestrator.run_batch(count, kinds, &mut TracingSink)?;
        Ok((batch, None))
    }
}
