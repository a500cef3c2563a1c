pub mod config;
pub mod engine;
pub mod rules;
pub mod validation;

pub use config::ScoringConfig;
pub use engine::{
    late_days, score_action, score_analysis, score_records, score_snapshot, ScoredRecords,
};
pub use rules::RuleSet;
pub use validation::validate_config;
