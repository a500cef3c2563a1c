pub mod aggregate;
pub mod ranking;

pub use aggregate::{aggregate, AggregateOptions, ChampionScoreSummary, Roster};
pub use ranking::{compare_summaries, find_champion, rank, RankedChampion};
