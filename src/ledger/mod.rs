pub mod storage;

pub use storage::{load_ledger, save_ledger, LedgerFile, LEDGER_FILE_VERSION};

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::records::{ChampionKey, ChampionRef, RecordKind};
use crate::scoring::rules;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemType {
    Action,
    Analysis,
    Penalty,
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ItemType::Action => "ACTION",
            ItemType::Analysis => "ANALYSIS",
            ItemType::Penalty => "PENALTY",
        };
        f.pad(s)
    }
}

/// One immutable entry of the points ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEvent {
    pub champion: ChampionRef,
    pub item_type: ItemType,
    /// Source record id, or `aging:<id>` for aging penalties.
    pub item_id: String,
    pub rule_code: String,
    pub points: i64,
    pub as_of: NaiveDate,
    pub details: String,
}

impl ScoreEvent {
    /// The source record this event was derived from.
    pub fn source_id(&self) -> &str {
        self.item_id
            .strip_prefix(rules::AGING_ITEM_PREFIX)
            .unwrap_or(&self.item_id)
    }

    pub fn is_aging(&self) -> bool {
        self.rule_code.starts_with(rules::AGING_CODE_PREFIX)
    }
}

/// Sum of points over a slice of events.
pub fn total_points(events: &[ScoreEvent]) -> i64 {
    events.iter().map(|e| e.points).sum()
}

/// Net score of one source record, for a champion detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemScore {
    pub kind: RecordKind,
    pub champion: ChampionRef,
    pub item_id: String,
    pub points: i64,
    /// `Some(true)` closed on time, `Some(false)` closed late, `None` when
    /// timeliness could not be judged.
    pub on_time: Option<bool>,
    pub rule_codes: Vec<String>,
}

impl ItemScore {
    /// Row for one source record, built from that record's own events
    /// (aging penalties included). A record with no events gets a zero row.
    pub fn from_events(
        kind: RecordKind,
        champion: &ChampionRef,
        item_id: &str,
        events: &[ScoreEvent],
    ) -> Self {
        let mut on_time = None;
        for event in events {
            if rules::is_on_time_code(&event.rule_code) {
                on_time = Some(true);
            } else if event.rule_code == rules::ACT_LATE_PENALTY {
                on_time = Some(false);
            }
        }
        Self {
            kind,
            champion: champion.clone(),
            item_id: item_id.to_string(),
            points: total_points(events),
            on_time,
            rule_codes: events.iter().map(|e| e.rule_code.clone()).collect(),
        }
    }
}

/// Item rows belonging to one champion.
pub fn items_for<'a>(items: &'a [ItemScore], key: &ChampionKey) -> Vec<&'a ItemScore> {
    items.iter().filter(|item| &item.champion.key == key).collect()
}
