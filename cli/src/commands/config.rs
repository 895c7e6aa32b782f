use std::path::PathBuf;

use clap::Args;
use dsbench::BenchConfig;
use tracing::info;

use crate::error::{CliError, Result};
use crate::output::OutputManager;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Configuration action
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(clap::Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration (defaults, file, environment)
    Show,

    /// Print the default configuration file path
    Path,

    /// Write a configuration file with default values
    Init {
        /// Where to write; defaults to the user configuration directory
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Configuration file path
        file: PathBuf,
    },
}

pub fn run(args: ConfigArgs, config: &BenchConfig, output: &OutputManager) -> Result<()> {
    match args.action {
        ConfigAction::Show => output.print_config(config),
        ConfigAction::Path => {
            println!("{}", BenchConfig::default_config_path()?.display());
            Ok(())
        }
        ConfigAction::Init { path, force } => {
            let path = match path {
                Some(path) => path,
                None => BenchConfig::default_config_path()?,
            };
            if path.exists() && !force {
                return Err(CliError::AlreadyExists {
                    path: path.display().to_string(),
                });
            }
            BenchConfig::default().save_to_file(&path)?;
            info!(path = %path.display(), "wrote default configuration");
            output.print_success(&format!("Wrote {}", path.display()));
            Ok(())
        }
        ConfigAction::Validate { file } => {
            BenchConfig::from_file(&file)?;
            output.print_success(&format!("{} is valid", file.display()));
            Ok(())
        }
    }
}
