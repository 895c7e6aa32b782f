//! Error handling for the dsbench harness
//!
//! Every failure is a discrete value returned to the immediate caller. The
//! orchestrator collapses them into errno-style status codes so a backend run
//! can be summarised the same way regardless of which operation failed.

use thiserror::Error;

/// Status code of a successful operation.
pub const STATUS_OK: i32 = 0;
/// Resource exhaustion.
pub const STATUS_ENOMEM: i32 = -12;
/// Entry already present.
pub const STATUS_EEXIST: i32 = -17;
/// Contract violation by the caller.
pub const STATUS_EINVAL: i32 = -22;
/// No room left in a bounded structure or identifier range.
pub const STATUS_ENOSPC: i32 = -28;

/// The main error type for the harness
#[derive(Error, Debug)]
pub enum BenchError {
    /// Backing storage for a node, context or buffer could not be obtained
    #[error("allocation failed: {what}")]
    Allocation { what: String },

    /// A null or released context, or an out-of-contract argument
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// The ordered set already holds this value
    #[error("duplicate key: {value}")]
    DuplicateKey { value: i32 },

    /// The bounded queue is full
    #[error("queue capacity exceeded: capacity {capacity}")]
    CapacityExceeded { capacity: usize },

    /// No free identifier is left in the map's range
    #[error("identifier range [{lower}, {upper}) exhausted")]
    RangeExhausted { lower: usize, upper: usize },

    /// Registry lookup with an index that names no backend
    #[error("invalid backend kind: {index}")]
    InvalidKind { index: usize },

    /// The run parameter must be strictly positive
    #[error("invalid element count: {count}")]
    InvalidCount { count: i64 },

    /// Duplicate resolution gave up after the configured number of draws
    #[error("gave up after {attempts} duplicate draws")]
    RetryLimitExceeded { attempts: u64 },

    /// Configuration related errors
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Configuration related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("configuration parsing error: {reason}")]
    ParseError { reason: String },

    #[error("invalid configuration value: {field} = {value}")]
    InvalidValue { field: String, value: String },

    #[error("configuration write failed: {path}")]
    WriteFailed { path: String },

    #[error("configuration validation failed: {reason}")]
    ValidationFailed { reason: String },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, BenchError>;

/// A specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

impl BenchError {
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        BenchError::InvalidArgument {
            reason: reason.into(),
        }
    }

    pub fn allocation(what: impl Into<String>) -> Self {
        BenchError::Allocation { what: what.into() }
    }

    /// Only duplicates are absorbed locally; everything else reaches the orchestrator.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, BenchError::DuplicateKey { .. })
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            BenchError::Allocation { .. } => "allocation",
            BenchError::InvalidArgument { .. } => "invalid_argument",
            BenchError::DuplicateKey { .. } => "duplicate_key",
            BenchError::CapacityExceeded { .. } => "capacity_exceeded",
            BenchError::RangeExhausted { .. } => "range_exhausted",
            BenchError::InvalidKind { .. } => "invalid_kind",
            BenchError::InvalidCount { .. } => "invalid_count",
            BenchError::RetryLimitExceeded { .. } => "retry_limit",
            BenchError::Config(_) => "config",
        }
    }

    /// Errno-style code, always negative.
    pub fn status_code(&self) -> i32 {
        match self {
            BenchError::Allocation { .. } => STATUS_ENOMEM,
            BenchError::DuplicateKey { .. } => STATUS_EEXIST,
            // a full ring reports ENOMEM
            BenchError::CapacityExceeded { .. } => STATUS_ENOMEM,
            BenchError::RangeExhausted { .. } | BenchError::RetryLimitExceeded { .. } => {
                STATUS_ENOSPC
            }
            BenchError::InvalidArgument { .. }
            | BenchError::InvalidKind { .. }
            | BenchError::InvalidCount { .. }
            | BenchError::Config(_) => STATUS_EINVAL,
        }
    }
}

/// Status code of an operation outcome.
pub fn status_of<T>(result: &Result<T>) -> i32 {
    match result {
        Ok(_) => STATUS_OK,
        Err(e) => e.status_code(),
    }
}
