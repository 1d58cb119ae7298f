//! Error types for test execution
//!
//! Engines never let these cross `execute`; they are turned into
//! diagnostics on the output channel instead. Hosts (the CLI, config
//! loading, dataset construction) see them directly.

use thiserror::Error;

/// Errors raised while building inputs or running a nonparametric test
#[derive(Error, Debug)]
pub enum NparError {
    #[error("More than two values encountered.  {test} will not be run.")]
    TooManyValues {
        test: &'static str,
        /// The offending third value
        value: f64,
    },

    #[error("{test}: statistic is undefined ({reason}).  No tables will be produced.")]
    DegenerateStatistic { test: &'static str, reason: String },

    #[error("Unknown variable: {0}")]
    UnknownVariable(String),

    #[error("Duplicate variable name: {0}")]
    DuplicateVariable(String),

    #[error("{0} requires at least one variable")]
    EmptyDescriptor(&'static str),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Data error at line {line}: {reason}")]
    Data { line: usize, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for npar operations
pub type Result<T> = std::result::Result<T, NparError>;
