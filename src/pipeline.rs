//! One scoring run: raw snapshots in, ledger and leaderboard out.
//!
//! Stateless. Every call rebuilds records, ledger, summaries and ranking
//! from the snapshots and the reference date it is given.

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::Config;
use crate::error::{DataIssue, ScoreError};
use crate::leaderboard::{aggregate, rank, AggregateOptions, RankedChampion, Roster};
use crate::ledger::{ItemScore, ScoreEvent};
use crate::records::{
    read_actions, read_analyses, AliasTable, IdentityMode, RawRecord, RecordFilter,
};
use crate::scoring::{score_snapshot, validate_config, RuleSet, ScoredRecords};

#[derive(Debug, Clone, PartialEq)]
pub struct EngineOptions {
    pub rules: RuleSet,
    pub aggregate: AggregateOptions,
    pub identity: IdentityMode,
    pub action_aliases: AliasTable,
    pub analysis_aliases: AliasTable,
    pub filter: RecordFilter,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            rules: RuleSet::default(),
            aggregate: AggregateOptions::default(),
            identity: IdentityMode::default(),
            action_aliases: AliasTable::for_actions(),
            analysis_aliases: AliasTable::for_analyses(),
            filter: RecordFilter::default(),
        }
    }
}

impl EngineOptions {
    /// Validate `config` and turn it into engine options. The record filter
    /// is left open; it comes from the caller, not the config file.
    pub fn from_config(config: &Config) -> Result<Self, ScoreError> {
        validate_config(config).map_err(ScoreError::InvalidConfig)?;

        let scoring = config.scoring();
        Ok(Self {
            rules: scoring.rule_set(),
            aggregate: AggregateOptions {
                include_unassigned: scoring.include_unassigned(),
                unassigned_label: scoring.unassigned_label().to_string(),
                roster: config.roster.as_deref().map(Roster::from_entries),
            },
            identity: scoring.identity_mode()?,
            action_aliases: config.action_aliases(),
            analysis_aliases: config.analysis_aliases(),
            filter: RecordFilter::default(),
        })
    }
}

/// Result of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scorecard {
    pub as_of: NaiveDate,
    pub ledger: Vec<ScoreEvent>,
    pub ranking: Vec<RankedChampion>,
    pub items: Vec<ItemScore>,
    pub warnings: Vec<DataIssue>,
}

pub fn compute_scorecard(
    action_rows: &[RawRecord],
    analysis_rows: &[RawRecord],
    as_of: NaiveDate,
    options: &EngineOptions,
) -> Scorecard {
    let (mut actions, mut warnings) =
        read_actions(action_rows, &options.action_aliases, options.identity);

    let mut analyses = if options.rules.analyses_enabled {
        let (analyses, issues) =
            read_analyses(analysis_rows, &options.analysis_aliases, options.identity);
        warnings.extend(issues);
        analyses
    } else {
        Vec::new()
    };

    if !options.filter.is_noop() {
        actions.retain(|a| options.filter.admits_action(a));
        analyses.retain(|a| options.filter.admits_analysis(a));
    }
    tracing::debug!(
        actions = actions.len(),
        analyses = analyses.len(),
        %as_of,
        "scoring snapshot"
    );

    let ScoredRecords { ledger, items } =
        score_snapshot(&actions, &analyses, as_of, options.rules);
    let summaries = aggregate(&ledger, &actions, &analyses, as_of, &options.aggregate);
    let ranking = rank(summaries);

    Scorecard {
        as_of,
        ledger,
        ranking,
        items,
        warnings,
    }
}
