pub mod competition;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod score;
pub mod scoring;

pub use error::{ConfigError, ScoreError};
