use std::fmt;

use serde::{Deserialize, Serialize};

/// Which snapshot a record came from. Status vocabularies differ per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Action,
    Analysis,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecordKind::Action => "action",
            RecordKind::Analysis => "analysis",
        };
        f.pad(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusClass {
    Open,
    Closed,
}

impl StatusClass {
    pub fn is_closed(self) -> bool {
        self == StatusClass::Closed
    }
}

const ACTION_CLOSED: [&str; 2] = ["closed", "done"];
const ANALYSIS_CLOSED: [&str; 1] = ["closed"];

pub fn normalize_status(raw: Option<&str>) -> String {
    raw.unwrap_or_default().trim().to_lowercase()
}

/// Bucket a free-text status into OPEN/CLOSED. Anything not recognised as
/// closed, including blank or missing status, is OPEN.
pub fn classify(kind: RecordKind, raw: Option<&str>) -> StatusClass {
    let status = normalize_status(raw);
    let closed: &[&str] = match kind {
        RecordKind::Action => &ACTION_CLOSED,
        RecordKind::Analysis => &ANALYSIS_CLOSED,
    };
    if closed.contains(&status.as_str()) {
        StatusClass::Closed
    } else {
        StatusClass::Open
    }
}
