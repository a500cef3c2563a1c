use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::RosterEntry;
use crate::ledger::ScoreEvent;
use crate::records::{
    ActionRecord, AnalysisRecord, AnalysisType, ChampionKey, ChampionRef, UNASSIGNED_LABEL,
};
use crate::scoring::{late_days, rules};

/// Known champions by id. An id outside the roster is treated as
/// unassigned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    names: HashMap<String, String>,
}

impl Roster {
    pub fn from_entries(entries: &[RosterEntry]) -> Self {
        let names = entries
            .iter()
            .map(|e| (e.id.trim().to_string(), e.name.trim().to_string()))
            .collect();
        Self { names }
    }

    pub fn name(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// Map a record's identity onto the roster. Label-keyed identities
    /// pass through untouched.
    pub fn canonicalize(&self, champion: &ChampionRef) -> ChampionRef {
        match &champion.key {
            ChampionKey::Id(id) => match self.name(id) {
                None => ChampionRef::unassigned(),
                // An id-only record carries its id as label.
                Some(name) if champion.label == *id => ChampionRef {
                    key: champion.key.clone(),
                    label: name.to_string(),
                },
                Some(_) => champion.clone(),
            },
            _ => champion.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateOptions {
    pub include_unassigned: bool,
    pub unassigned_label: String,
    pub roster: Option<Roster>,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            include_unassigned: true,
            unassigned_label: UNASSIGNED_LABEL.to_string(),
            roster: None,
        }
    }
}

impl AggregateOptions {
    /// The identity a record or event is counted under, or `None` when it
    /// is dropped from the leaderboard.
    fn bucket(&self, champion: &ChampionRef) -> Option<ChampionRef> {
        let champion = match &self.roster {
            Some(roster) => roster.canonicalize(champion),
            None => champion.clone(),
        };
        if champion.is_unassigned() {
            if !self.include_unassigned {
                return None;
            }
            return Some(ChampionRef {
                key: ChampionKey::Unassigned,
                label: self.unassigned_label.clone(),
            });
        }
        Some(champion)
    }
}

/// Per-champion totals. Point fields come from the ledger, count fields
/// from the source records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChampionScoreSummary {
    pub champion: ChampionRef,
    pub total_score: i64,
    pub created_points: i64,
    pub closed_points: i64,
    pub on_time_bonus: i64,
    pub late_penalty: i64,
    pub aging_penalty: i64,
    pub analysis_points: i64,
    pub actions_total: u32,
    pub actions_closed: u32,
    pub actions_late: u32,
    pub analyses_open: u32,
    pub analyses_closed: u32,
    pub closed_5why: u32,
    pub closed_a3: u32,
    pub closed_8d: u32,
}

impl ChampionScoreSummary {
    fn empty(champion: ChampionRef) -> Self {
        Self {
            champion,
            total_score: 0,
            created_points: 0,
            closed_points: 0,
            on_time_bonus: 0,
            late_penalty: 0,
            aging_penalty: 0,
            analysis_points: 0,
            actions_total: 0,
            actions_closed: 0,
            actions_late: 0,
            analyses_open: 0,
            analyses_closed: 0,
            closed_5why: 0,
            closed_a3: 0,
            closed_8d: 0,
        }
    }

    pub fn is_unassigned(&self) -> bool {
        self.champion.is_unassigned()
    }

    fn add_event(&mut self, event: &ScoreEvent) {
        self.total_score += event.points;
        let code = event.rule_code.as_str();
        match code {
            rules::ACT_CREATE => self.created_points += event.points,
            rules::ACT_CLOSE_BASE => self.closed_points += event.points,
            rules::ACT_ON_TIME_BONUS => self.on_time_bonus += event.points,
            rules::ACT_LATE_PENALTY => self.late_penalty += event.points,
            _ if event.is_aging() => self.aging_penalty += event.points,
            _ if code.starts_with(rules::ANALYSIS_CODE_PREFIX) => {
                self.analysis_points += event.points
            }
            _ => {}
        }
    }

    fn add_action(&mut self, action: &ActionRecord, as_of: NaiveDate) {
        self.actions_total += 1;
        if action.class.is_closed() {
            self.actions_closed += 1;
        }
        if late_days(action, as_of) > 0 {
            self.actions_late += 1;
        }
    }

    fn add_analysis(&mut self, analysis: &AnalysisRecord) {
        if !analysis.class.is_closed() {
            self.analyses_open += 1;
            return;
        }
        self.analyses_closed += 1;
        match analysis.analysis_type {
            Some(AnalysisType::FiveWhy) => self.closed_5why += 1,
            Some(AnalysisType::A3) => self.closed_a3 += 1,
            Some(AnalysisType::EightD) => self.closed_8d += 1,
            None => {}
        }
    }
}

fn entry<'a>(
    summaries: &'a mut BTreeMap<ChampionKey, ChampionScoreSummary>,
    champion: &ChampionRef,
    options: &AggregateOptions,
) -> Option<&'a mut ChampionScoreSummary> {
    let bucket = options.bucket(champion)?;
    Some(
        summaries
            .entry(bucket.key.clone())
            .or_insert_with(|| ChampionScoreSummary::empty(bucket)),
    )
}

/// Fold the ledger and the source records into one summary per champion.
///
/// Every identity that authored a record appears, even with no events.
/// Output is in identity-key order; use [`super::rank`] for the
/// leaderboard order.
pub fn aggregate(
    ledger: &[ScoreEvent],
    actions: &[ActionRecord],
    analyses: &[AnalysisRecord],
    as_of: NaiveDate,
    options: &AggregateOptions,
) -> Vec<ChampionScoreSummary> {
    let mut summaries: BTreeMap<ChampionKey, ChampionScoreSummary> = BTreeMap::new();

    for action in actions {
        if let Some(summary) = entry(&mut summaries, &action.champion, options) {
            summary.add_action(action, as_of);
        }
    }
    for analysis in analyses {
        if let Some(summary) = entry(&mut summaries, &analysis.champion, options) {
            summary.add_analysis(analysis);
        }
    }
    for event in ledger {
        if let Some(summary) = entry(&mut summaries, &event.champion, options) {
            summary.add_event(event);
        }
    }

    tracing::debug!(champions = summaries.len(), "aggregated ledger");
    summaries.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::StatusClass;
    use crate::scoring::{score_records, RuleSet};
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn champion(id: &str, label: &str) -> ChampionRef {
        ChampionRef {
            key: ChampionKey::Id(id.to_string()),
            label: label.to_string(),
        }
    }

    fn action(
        id: &str,
        champion: ChampionRef,
        class: StatusClass,
        due: NaiveDate,
        closed: Option<NaiveDate>,
    ) -> ActionRecord {
        ActionRecord {
            id: id.to_string(),
            champion,
            status: if class.is_closed() { "closed" } else { "open" }.to_string(),
            class,
            created_at: Some(date(2024, 1, 1)),
            due_date: Some(due),
            closed_at: closed,
        }
    }

    fn analysis(id: &str, champion: ChampionRef, t: AnalysisType, closed: bool) -> AnalysisRecord {
        AnalysisRecord {
            id: id.to_string(),
            analysis_type: Some(t),
            raw_type: t.code().to_string(),
            champion,
            status: if closed { "closed" } else { "open" }.to_string(),
            class: if closed {
                StatusClass::Closed
            } else {
                StatusClass::Open
            },
            created_at: Some(date(2024, 1, 1)),
            closed_at: closed.then(|| date(2024, 1, 10)),
        }
    }

    fn run(
        actions: &[ActionRecord],
        analyses: &[AnalysisRecord],
        as_of: NaiveDate,
        options: &AggregateOptions,
    ) -> Vec<ChampionScoreSummary> {
        let ledger = score_records(actions, analyses, as_of, RuleSet::default());
        aggregate(&ledger, actions, analyses, as_of, options)
    }

    #[test]
    fn test_one_on_time_and_one_open_due_today() {
        let as_of = date(2024, 1, 15);
        let alex = champion("1", "Alex");
        let actions = vec![
            action(
                "A-1",
                alex.clone(),
                StatusClass::Closed,
                date(2024, 1, 10),
                Some(date(2024, 1, 9)),
            ),
            action("A-2", alex.clone(), StatusClass::Open, as_of, None),
        ];

        let summaries = run(&actions, &[], as_of, &AggregateOptions::default());

        assert_eq!(summaries.len(), 1);
        let s = &summaries[0];
        assert_eq!(s.champion, alex);
        assert_eq!(s.total_score, 7);
        assert_eq!(s.created_points, 2);
        assert_eq!(s.closed_points, 3);
        assert_eq!(s.on_time_bonus, 2);
        assert_eq!(s.actions_total, 2);
        assert_eq!(s.actions_closed, 1);
        assert_eq!(s.actions_late, 0);
    }

    #[test]
    fn test_subtotals_split_by_rule_code() {
        let as_of = date(2024, 3, 1);
        let kim = champion("2", "Kim");
        let actions = vec![action(
            "A-1",
            kim.clone(),
            StatusClass::Closed,
            date(2024, 1, 10),
            Some(date(2024, 2, 20)),
        )];
        let analyses = vec![
            analysis("AN-1", kim.clone(), AnalysisType::A3, true),
            analysis("AN-2", kim.clone(), AnalysisType::EightD, false),
        ];

        let summaries = run(&actions, &analyses, as_of, &AggregateOptions::default());
        let s = &summaries[0];

        // 41 days late: -2 late, -1 and -3 aging.
        assert_eq!(s.late_penalty, -2);
        // AN-2 open 60 days: -2 x 1 period.
        assert_eq!(s.aging_penalty, -1 - 3 - 2);
        // A3 closed within SLA: 8 + 3.
        assert_eq!(s.analysis_points, 11);
        assert_eq!(s.actions_late, 1);
        assert_eq!(s.analyses_open, 1);
        assert_eq!(s.analyses_closed, 1);
        assert_eq!(s.closed_a3, 1);
        assert_eq!(s.closed_8d, 0);
        assert_eq!(
            s.total_score,
            s.created_points
                + s.closed_points
                + s.on_time_bonus
                + s.late_penalty
                + s.aging_penalty
                + s.analysis_points
        );
    }

    #[test]
    fn test_champion_without_events_still_appears() {
        let as_of = date(2024, 1, 15);
        let mut idle = action(
            "A-1",
            champion("3", "Sam"),
            StatusClass::Open,
            as_of,
            None,
        );
        idle.created_at = None;

        let summaries = run(&[idle], &[], as_of, &AggregateOptions::default());

        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].total_score, 0);
        assert_eq!(summaries[0].actions_total, 1);
    }

    #[test]
    fn test_shared_label_with_different_ids_does_not_merge() {
        let as_of = date(2024, 1, 15);
        let actions = vec![
            action("A-1", champion("1", "Alex"), StatusClass::Open, as_of, None),
            action("A-2", champion("9", "Alex"), StatusClass::Open, as_of, None),
        ];

        let summaries = run(&actions, &[], as_of, &AggregateOptions::default());
        assert_eq!(summaries.len(), 2);
    }

    #[test]
    fn test_unassigned_bucket_can_be_excluded() {
        let as_of = date(2024, 1, 15);
        let actions = vec![
            action("A-1", champion("1", "Alex"), StatusClass::Open, as_of, None),
            action("A-2", ChampionRef::unassigned(), StatusClass::Open, as_of, None),
        ];

        let options = AggregateOptions {
            unassigned_label: "Nobody".to_string(),
            ..AggregateOptions::default()
        };
        let with = run(&actions, &[], as_of, &options);
        assert_eq!(with.len(), 2);
        let bucket = with.iter().find(|s| s.is_unassigned()).unwrap();
        assert_eq!(bucket.champion.label, "Nobody");
        assert_eq!(bucket.total_score, 1);

        let without = run(
            &actions,
            &[],
            as_of,
            &AggregateOptions {
                include_unassigned: false,
                ..AggregateOptions::default()
            },
        );
        assert_eq!(without.len(), 1);
        assert!(!without[0].is_unassigned());
    }

    #[test]
    fn test_roster_folds_orphans_and_names_ids() {
        let as_of = date(2024, 1, 15);
        let roster = Roster::from_entries(&[RosterEntry {
            id: "1".to_string(),
            name: "Alex Smith".to_string(),
        }]);
        let actions = vec![
            action("A-1", champion("1", "1"), StatusClass::Open, as_of, None),
            action("A-2", champion("7", "Gone"), StatusClass::Open, as_of, None),
        ];

        let summaries = run(
            &actions,
            &[],
            as_of,
            &AggregateOptions {
                roster: Some(roster),
                ..AggregateOptions::default()
            },
        );

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].champion, champion("1", "Alex Smith"));
        assert!(summaries[1].is_unassigned());
        assert_eq!(summaries[1].actions_total, 1);
    }
}
