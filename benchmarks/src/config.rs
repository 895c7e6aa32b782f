//! Configuration management for dsbench
//!
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then `DSBENCH_*` environment variables. Command-line flags are applied on
//! top by the binary.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::backends::{BackendOptions, DEFAULT_MAX_DUPLICATE_RETRIES};
use crate::error::{ConfigError, ConfigResult};
use crate::BackendKind;

/// Default number of values inserted per backend.
pub const DEFAULT_COUNT: i64 = 5;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// What to run
    pub run: RunConfig,

    /// Ordered-set tuning
    pub ordered_set: OrderedSetConfig,

    /// Key generation
    pub keys: KeysConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Report rendering
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Requested element count; must be positive.
    pub count: i64,

    /// Backends to run, in order.
    pub backends: Vec<BackendKind>,

    /// Run the single-function list exercise before the batch.
    pub standalone_sequence: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderedSetConfig {
    /// Start of the inclusive deletion range; defaults to 0.
    pub range_start: Option<i32>,

    /// End of the inclusive deletion range; defaults to the element count.
    pub range_end: Option<i32>,

    /// Draws allowed per insertion before populate gives up.
    pub max_duplicate_retries: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeysConfig {
    /// Seed for reproducible runs; unset means OS entropy.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,

    /// Print every trace event after the report.
    pub include_trace: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Table,
    Json,
    Raw,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            backends: BackendKind::ALL.to_vec(),
            standalone_sequence: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Table,
            include_trace: false,
        }
    }
}

impl BenchConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.to_string_lossy().to_string(),
        })?;

        let config: BenchConfig = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `DSBENCH_*` environment variables
    pub fn from_env() -> ConfigResult<Self> {
        let config = BenchConfig::default().with_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults, then the file if it exists, then the environment
    pub fn load_with_fallback<P: AsRef<Path>>(config_path: Option<P>) -> ConfigResult<Self> {
        let mut config = BenchConfig::default();

        if let Some(path) = config_path {
            if path.as_ref().exists() {
                config = BenchConfig::from_file(path)?;
            }
        }

        let config = config.with_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides read through `lookup`.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(count) = lookup("DSBENCH_COUNT") {
            self.run.count = count.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: "DSBENCH_COUNT".to_string(),
                value: count.clone(),
            })?;
        }

        if let Some(seed) = lookup("DSBENCH_SEED") {
            self.keys.seed = Some(seed.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: "DSBENCH_SEED".to_string(),
                value: seed.clone(),
            })?);
        }

        if let Some(level) = lookup("DSBENCH_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Some(backends) = lookup("DSBENCH_BACKENDS") {
            self.run.backends = parse_backend_list(&backends).map_err(|_| {
                ConfigError::InvalidValue {
                    field: "DSBENCH_BACKENDS".to_string(),
                    value: backends.clone(),
                }
            })?;
        }

        Ok(self)
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.run.count <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "run.count".to_string(),
                value: self.run.count.to_string(),
            });
        }

        if self.run.backends.is_empty() {
            return Err(ConfigError::ValidationFailed {
                reason: "run.backends must name at least one backend".to_string(),
            });
        }

        // an unset end defaults to run.count, so check the range backends will see
        if let Some((start, end)) = self.backend_options().ordered_set_range {
            if start > end {
                return Err(ConfigError::InvalidValue {
                    field: "ordered_set.range".to_string(),
                    value: format!("[{}, {}]", start, end),
                });
            }
        }

        if self.ordered_set.max_duplicate_retries == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "ordered_set.max_duplicate_retries".to_string(),
                value: "0".to_string(),
            });
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                value: self.logging.level.clone(),
            });
        }

        Ok(())
    }

    /// Backend tuning derived from the `ordered_set` section. A range with
    /// only one end set keeps the default for the other end, which needs the
    /// element count.
    pub fn backend_options(&self) -> BackendOptions {
        let range = match (self.ordered_set.range_start, self.ordered_set.range_end) {
            (None, None) => None,
            (start, end) => {
                let default_end = i32::try_from(self.run.count).unwrap_or(i32::MAX);
                Some((start.unwrap_or(0), end.unwrap_or(default_end)))
            }
        };
        BackendOptions {
            ordered_set_range: range,
            max_duplicate_retries: self
                .ordered_set
                .max_duplicate_retries
                .unwrap_or(DEFAULT_MAX_DUPLICATE_RETRIES),
        }
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> ConfigResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("dsbench").join("config.toml"))
            .ok_or_else(|| ConfigError::ValidationFailed {
                reason: "Unable to determine config directory".to_string(),
            })
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|_| ConfigError::WriteFailed {
                path: parent.to_string_lossy().to_string(),
            })?;
        }

        let content = self.to_toml()?;

        fs::write(path, content).map_err(|_| ConfigError::WriteFailed {
            path: path.to_string_lossy().to_string(),
        })?;

        Ok(())
    }

    pub fn to_toml(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            reason: e.to_string(),
        })
    }
}

/// Parse a comma separated list of backend names.
pub fn parse_backend_list(list: &str) -> Result<Vec<BackendKind>, String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}
