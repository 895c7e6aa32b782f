use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use dsbench::config::LogFormat;
use dsbench::BenchConfig;
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod error;
mod output;

use commands::*;
use error::{CliError, Result};
use output::{OutputFormat, OutputManager};

#[derive(Parser)]
#[command(name = "dsbench")]
#[command(about = "dsbench - drive data-structure backends through a common lifecycle and trace every operation")]
#[command(version)]
#[command(long_about = "
dsbench inserts random integers into a list, a bounded queue, an id-allocating map
and a red-black tree, shows their contents, empties them and reports per backend.

Examples:
  dsbench                                  # Run every backend with the configured count
  dsbench --count 32 --backend rbtree      # Only the ordered set, 32 values
  dsbench --seed 7 --format raw            # Reproducible run, one trace line per event
  dsbench list                             # Show the backend registry
  dsbench config show                      # Show the effective configuration
")]
struct Cli {
    #[command(flatten)]
    run: RunArgs,

    /// Configuration file path
    #[arg(long, global = true, env = "DSBENCH_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum)]
    format: Option<OutputFormatArg>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum OutputFormatArg {
    Table,
    Json,
    Raw,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Table => OutputFormat::Table,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Raw => OutputFormat::Raw,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List registered backends with their kind index
    List,

    /// Manage dsbench configuration
    Config(ConfigArgs),
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run_command(cli) {
        let error_msg = error::format_error(&e);
        eprintln!("{}", error_msg);
        process::exit(e.exit_code());
    }
}

fn run_command(cli: Cli) -> Result<()> {
    let mut config = load_config(&cli)?;
    cli.run.apply_to(&mut config);

    init_logging(&cli, &config);
    debug!(?config, "effective configuration");

    let format = cli
        .format
        .map(OutputFormat::from)
        .unwrap_or_else(|| config.output.format.into());
    let output = OutputManager::detect(format, cli.no_color);

    match cli.command {
        None => commands::run::run(&config, &output, format),
        Some(Commands::List) => commands::list::run(&output),
        Some(Commands::Config(args)) => commands::config::run(args, &config, &output),
    }
}

/// An explicit `--config` must exist; otherwise the default path is used
/// when present.
fn load_config(cli: &Cli) -> Result<BenchConfig> {
    match &cli.config {
        Some(path) => {
            let config = BenchConfig::from_file(path)?
                .with_env_overrides(|key| std::env::var(key).ok())?;
            config.validate()?;
            Ok(config)
        }
        None => {
            let default_path = BenchConfig::default_config_path().ok();
            BenchConfig::load_with_fallback(default_path).map_err(CliError::from)
        }
    }
}

fn init_logging(cli: &Cli, config: &BenchConfig) {
    let level = if cli.verbose {
        "debug".to_string()
    } else {
        cli.log_level
            .clone()
            .unwrap_or_else(|| config.logging.level.clone())
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));
    let json = cli.json_logs || config.logging.format == LogFormat::Json;

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }

    info!(level = %level, json, "dsbench started");
}
