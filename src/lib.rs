pub mod config;
pub mod error;
pub mod leaderboard;
pub mod ledger;
pub mod output;
pub mod pipeline;
pub mod records;
pub mod scoring;

pub use error::{DataIssue, ScoreError};
pub use pipeline::{compute_scorecard, EngineOptions, Scorecard};
