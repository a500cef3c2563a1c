use chrono::{Days, NaiveDate};

use super::rules::{self, RuleSet};
use crate::ledger::{ItemScore, ItemType, ScoreEvent};
use crate::records::{ActionRecord, AnalysisRecord, ChampionRef, RecordKind};

/// Collects the events of one record.
struct EventSink<'a> {
    champion: &'a ChampionRef,
    item_id: &'a str,
    as_of: NaiveDate,
    events: Vec<ScoreEvent>,
}

impl<'a> EventSink<'a> {
    fn new(champion: &'a ChampionRef, item_id: &'a str, as_of: NaiveDate) -> Self {
        Self {
            champion,
            item_id,
            as_of,
            events: Vec::new(),
        }
    }

    fn push(&mut self, item_type: ItemType, rule_code: &str, points: i64, details: String) {
        let item_id = match item_type {
            ItemType::Penalty => format!("{}{}", rules::AGING_ITEM_PREFIX, self.item_id),
            _ => self.item_id.to_string(),
        };
        tracing::trace!(item = %item_id, rule = rule_code, points, "score event");
        self.events.push(ScoreEvent {
            champion: self.champion.clone(),
            item_type,
            item_id,
            rule_code: rule_code.to_string(),
            points,
            as_of: self.as_of,
            details,
        });
    }
}

/// Days an action is overdue: past its due date at closure if closed,
/// or past its due date as of the reference date if still open.
pub fn late_days(action: &ActionRecord, as_of: NaiveDate) -> i64 {
    let Some(due) = action.due_date else {
        return 0;
    };
    if action.class.is_closed() {
        match action.closed_at {
            Some(closed) if closed > due => (closed - due).num_days(),
            _ => 0,
        }
    } else if as_of > due {
        (as_of - due).num_days()
    } else {
        0
    }
}

/// Number of started aging periods past `threshold` days. Zero at or
/// below the threshold.
pub fn aging_periods(age_days: i64, threshold: i64) -> i64 {
    if age_days <= threshold {
        return 0;
    }
    let period = rules::ANALYSIS_AGING_PERIOD_DAYS;
    (age_days - threshold + period - 1) / period
}

/// Score one action against the reference date.
pub fn score_action(action: &ActionRecord, as_of: NaiveDate) -> Vec<ScoreEvent> {
    let mut sink = EventSink::new(&action.champion, &action.id, as_of);

    if let Some(created) = action.created_at {
        sink.push(
            ItemType::Action,
            rules::ACT_CREATE,
            rules::ACT_CREATE_POINTS,
            format!("created_at={}", created),
        );
    }

    let closed = action.class.is_closed();
    if closed {
        sink.push(
            ItemType::Action,
            rules::ACT_CLOSE_BASE,
            rules::ACT_CLOSE_BASE_POINTS,
            format!("status={}", action.status),
        );
    }

    if let (true, Some(closed_at), Some(due)) = (closed, action.closed_at, action.due_date) {
        let details = format!("closed_at={}, due_date={}", closed_at, due);
        if closed_at <= due {
            sink.push(
                ItemType::Action,
                rules::ACT_ON_TIME_BONUS,
                rules::ACT_ON_TIME_BONUS_POINTS,
                details,
            );
        } else {
            sink.push(
                ItemType::Action,
                rules::ACT_LATE_PENALTY,
                rules::ACT_LATE_PENALTY_POINTS,
                details,
            );
        }
    }

    let late = late_days(action, as_of);
    for (threshold, code, points) in rules::ACTION_AGING_STEPS {
        if late > threshold {
            sink.push(ItemType::Penalty, code, points, format!("late_days={}", late));
        }
    }

    sink.events
}

/// Score one analysis against the reference date.
pub fn score_analysis(analysis: &AnalysisRecord, as_of: NaiveDate) -> Vec<ScoreEvent> {
    let mut sink = EventSink::new(&analysis.champion, &analysis.id, as_of);
    let closed = analysis.class.is_closed();

    if let (true, Some(analysis_type)) = (closed, analysis.analysis_type) {
        let table = rules::analysis_points(analysis_type);
        sink.push(
            ItemType::Analysis,
            &rules::analysis_close_code(analysis_type),
            table.close_base,
            format!("status={}", analysis.status),
        );

        if let (Some(created), Some(closed_at)) = (analysis.created_at, analysis.closed_at) {
            let deadline = created.checked_add_days(Days::new(table.sla_days as u64));
            if deadline.is_some_and(|deadline| closed_at <= deadline) {
                sink.push(
                    ItemType::Analysis,
                    &rules::analysis_on_time_code(analysis_type),
                    table.on_time_bonus,
                    format!("closed_at={}, sla_days={}", closed_at, table.sla_days),
                );
            }
        }
    }

    if let (false, Some(created)) = (closed, analysis.created_at) {
        let age_days = (as_of - created).num_days();
        for (threshold, code, points_per_period) in rules::ANALYSIS_AGING_TIERS {
            let periods = aging_periods(age_days, threshold);
            if periods > 0 {
                sink.push(
                    ItemType::Penalty,
                    code,
                    points_per_period * periods,
                    format!("age_days={}, periods={}", age_days, periods),
                );
            }
        }
    }

    sink.events
}

/// Ledger of one run plus one item row per scored source record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScoredRecords {
    pub ledger: Vec<ScoreEvent>,
    pub items: Vec<ItemScore>,
}

impl ScoredRecords {
    fn push(
        &mut self,
        kind: RecordKind,
        champion: &ChampionRef,
        id: &str,
        events: Vec<ScoreEvent>,
    ) {
        self.items.push(ItemScore::from_events(kind, champion, id, &events));
        self.ledger.extend(events);
    }
}

/// Score every action in input order, then every analysis in input order.
/// Item rows are keyed by the record they came from, so records sharing an
/// id across kinds or within a snapshot stay separate.
pub fn score_snapshot(
    actions: &[ActionRecord],
    analyses: &[AnalysisRecord],
    as_of: NaiveDate,
    rule_set: RuleSet,
) -> ScoredRecords {
    let mut scored = ScoredRecords::default();

    for action in actions {
        let events = score_action(action, as_of);
        tracing::debug!(action = %action.id, events = events.len(), "scored action");
        scored.push(RecordKind::Action, &action.champion, &action.id, events);
    }

    if rule_set.analyses_enabled {
        for analysis in analyses {
            let events = score_analysis(analysis, as_of);
            tracing::debug!(analysis = %analysis.id, events = events.len(), "scored analysis");
            scored.push(RecordKind::Analysis, &analysis.champion, &analysis.id, events);
        }
    }

    scored
}

/// Build the full ledger. Pure in its inputs; the same records and
/// reference date always yield the same ledger.
pub fn score_records(
    actions: &[ActionRecord],
    analyses: &[AnalysisRecord],
    as_of: NaiveDate,
    rule_set: RuleSet,
) -> Vec<ScoreEvent> {
    score_snapshot(actions, analyses, as_of, rule_set).ledger
}
