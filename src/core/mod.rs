pub mod config;
pub mod engine;
pub mod recoder;

pub use config::Config;
pub use engine::{EngineStats, OptimizationProblem, ResolutionState};
pub use recoder::{RecordOutcome, Recoder, Recoding};
