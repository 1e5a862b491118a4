pub mod bio;
pub mod cli;
pub mod constraints;
pub mod core;
pub mod objectives;
pub mod report;
pub mod usage;

pub use crate::core::{
    config::Config,
    engine::{EngineStats, OptimizationProblem, ResolutionState},
    recoder::{RecordOutcome, Recoder, Recoding},
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BaseBuddyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(
        "Constraint resolution failed for '{record}' after {iterations} iterations; still violated: {}",
        remaining.join(", ")
    )]
    UnsatisfiableConstraints {
        record: String,
        iterations: usize,
        remaining: Vec<String>,
    },

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, BaseBuddyError>;

impl From<csv::Error> for BaseBuddyError {
    fn from(err: csv::Error) -> Self {
        BaseBuddyError::Parse(err.to_string())
    }
}

impl From<serde_json::Error> for BaseBuddyError {
    fn from(err: serde_json::Error) -> Self {
        BaseBuddyError::Parse(err.to_string())
    }
}
