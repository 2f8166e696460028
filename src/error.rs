//! Error types for the benchmark harness.
//!
//! Errors are grouped by kind: caller mistakes caught before timing starts
//! ([`ConfigError`]), candidates that fail while being measured
//! ([`CandidateExecutionError`]) and statistics that cannot be ranked
//! ([`DegenerateStatisticError`]). [`BenchError`] wraps them all.

use thiserror::Error;

/// Main error type for the harness
#[derive(Error, Debug)]
pub enum BenchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    CandidateExecution(#[from] CandidateExecutionError),

    #[error("Degenerate statistic: {0}")]
    Degenerate(#[from] DegenerateStatisticError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Malformed benchmark declarations. Always raised before any timing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("no parameter axes declared")]
    EmptyAxes,

    #[error("axis '{axis}' has no values")]
    EmptyAxis { axis: String },

    #[error("axis '{axis}' is declared more than once")]
    DuplicateAxis { axis: String },

    #[error("axis '{axis}' lists value {value} more than once")]
    DuplicateValue { axis: String, value: String },

    #[error("required axis 'method' is missing")]
    MissingMethodAxis,

    #[error("method axis value {value} is not a candidate name")]
    InvalidMethodValue { value: String },

    #[error("unknown candidate '{name}'")]
    UnknownCandidate { name: String },

    #[error("candidate '{name}' is registered more than once")]
    DuplicateCandidate { name: String },

    #[error("num_trials must be at least 1 (got {num_trials})")]
    InvalidTrialCount { num_trials: usize },

    #[error("best_of must be between 1 and num_trials ({num_trials}), got {best_of}")]
    InvalidBestOf { best_of: usize, num_trials: usize },

    #[error("best_of ({best_of}) must divide num_trials ({num_trials})")]
    BestOfNotDivisor { best_of: usize, num_trials: usize },

    #[error("epsilon must be finite and positive (got {epsilon})")]
    InvalidEpsilon { epsilon: f64 },

    #[error("invalid rating model: {0}")]
    InvalidModel(String),

    #[error("parameter grid is too large to enumerate")]
    GridTooLarge,
}

/// Error reported by a candidate itself, either returned or from a panic.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct CandidateFailure {
    pub message: String,
}

impl CandidateFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Missing or mistyped argument
    pub fn argument(name: &str, expected: &str) -> Self {
        Self::new(format!("argument '{name}' missing or not {expected}"))
    }
}

impl From<String> for CandidateFailure {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for CandidateFailure {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// A candidate failed while one configuration was being measured.
///
/// The whole run is abandoned: a ranking with holes would be misleading.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("benchmark aborted for '{candidate}' at {configuration}: {source}")]
pub struct CandidateExecutionError {
    pub candidate: String,
    pub configuration: String,
    #[source]
    pub source: CandidateFailure,
}

/// Statistics that cannot be turned into a ranking.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DegenerateStatisticError {
    #[error("no samples recorded for '{candidate}' at {configuration}")]
    NoSamples {
        candidate: String,
        configuration: String,
    },

    #[error("{statistic} for '{candidate}' is not a finite non-negative time ({value})")]
    InvalidValue {
        candidate: String,
        statistic: &'static str,
        value: f64,
    },

    #[error("group {group} has no entries")]
    EmptyGroup { group: String },
}

pub type Result<T> = std::result::Result<T, BenchError>;
