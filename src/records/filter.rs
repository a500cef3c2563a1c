use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::status::StatusClass;
use super::types::{ActionRecord, AnalysisRecord};
use crate::error::ScoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusScope {
    #[default]
    All,
    Open,
    Closed,
}

impl StatusScope {
    pub fn admits(self, class: StatusClass) -> bool {
        match self {
            StatusScope::All => true,
            StatusScope::Open => !class.is_closed(),
            StatusScope::Closed => class.is_closed(),
        }
    }
}

impl FromStr for StatusScope {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(StatusScope::All),
            "open" => Ok(StatusScope::Open),
            "closed" => Ok(StatusScope::Closed),
            _ => Err(ScoreError::UnsupportedMode {
                kind: "status scope",
                value: s.to_string(),
                expected: "all, open, closed",
            }),
        }
    }
}

/// Narrows a snapshot before scoring: an inclusive created-date window and
/// a status scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordFilter {
    pub created_from: Option<NaiveDate>,
    pub created_to: Option<NaiveDate>,
    pub scope: StatusScope,
}

impl RecordFilter {
    pub fn is_noop(&self) -> bool {
        self.created_from.is_none() && self.created_to.is_none() && self.scope == StatusScope::All
    }

    fn admits(&self, created_at: Option<NaiveDate>, class: StatusClass) -> bool {
        if !self.scope.admits(class) {
            return false;
        }
        if self.created_from.is_none() && self.created_to.is_none() {
            return true;
        }
        // A window is set; undated records fall outside it.
        let Some(created) = created_at else {
            return false;
        };
        self.created_from.map_or(true, |from| created >= from)
            && self.created_to.map_or(true, |to| created <= to)
    }

    pub fn admits_action(&self, action: &ActionRecord) -> bool {
        self.admits(action.created_at, action.class)
    }

    pub fn admits_analysis(&self, analysis: &AnalysisRecord) -> bool {
        self.admits(analysis.created_at, analysis.class)
    }
}
