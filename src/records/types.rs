use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::fields::{CanonicalField, SchemaMap};
use super::status::{classify, normalize_status, RecordKind, StatusClass};
use super::RawRecord;
use crate::error::ScoreError;

pub const UNASSIGNED_LABEL: &str = "Unassigned";

/// Grouping key for a champion. Records sharing an `Id` always merge;
/// records that only share a label never merge with an `Id` key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum ChampionKey {
    Id(String),
    Label(String),
    Unassigned,
}

impl fmt::Display for ChampionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChampionKey::Id(id) => write!(f, "id:{}", id),
            ChampionKey::Label(label) => write!(f, "label:{}", label),
            ChampionKey::Unassigned => f.write_str("unassigned"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChampionRef {
    pub key: ChampionKey,
    pub label: String,
}

impl ChampionRef {
    pub fn unassigned() -> Self {
        Self {
            key: ChampionKey::Unassigned,
            label: UNASSIGNED_LABEL.to_string(),
        }
    }

    pub fn is_unassigned(&self) -> bool {
        self.key == ChampionKey::Unassigned
    }

    /// Build an identity from the resolved id and display label of a record.
    pub fn from_parts(id: Option<String>, label: Option<String>, mode: IdentityMode) -> Self {
        match (mode, id, label) {
            (IdentityMode::Id, Some(id), label) => Self {
                label: label.unwrap_or_else(|| id.clone()),
                key: ChampionKey::Id(id),
            },
            (_, _, Some(label)) => Self {
                key: ChampionKey::Label(label.clone()),
                label,
            },
            (IdentityMode::Label, Some(id), None) => Self {
                key: ChampionKey::Label(id.clone()),
                label: id,
            },
            (_, None, None) => Self::unassigned(),
        }
    }
}

/// How champion identities are keyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityMode {
    /// Stable id when present, display label as fallback.
    #[default]
    Id,
    /// Display label only; two people sharing a name merge.
    Label,
}

impl FromStr for IdentityMode {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "id" => Ok(IdentityMode::Id),
            "label" => Ok(IdentityMode::Label),
            _ => Err(ScoreError::UnsupportedMode {
                kind: "identity mode",
                value: s.to_string(),
                expected: "id, label",
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AnalysisType {
    #[serde(rename = "5WHY")]
    FiveWhy,
    #[serde(rename = "A3")]
    A3,
    #[serde(rename = "8D")]
    EightD,
}

impl AnalysisType {
    pub const ALL: [AnalysisType; 3] = [AnalysisType::FiveWhy, AnalysisType::A3, AnalysisType::EightD];

    pub fn code(&self) -> &'static str {
        match self {
            AnalysisType::FiveWhy => "5WHY",
            AnalysisType::A3 => "A3",
            AnalysisType::EightD => "8D",
        }
    }

    /// Parse a free-text type. Spaces, hyphens and underscores are ignored,
    /// so "5 Why" and "5-why" both map to 5WHY.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .flat_map(char::to_uppercase)
            .collect();
        Self::ALL.into_iter().find(|t| t.code() == normalized)
    }
}

impl fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRecord {
    pub id: String,
    pub champion: ChampionRef,
    /// Normalized status text, kept for audit details.
    pub status: String,
    pub class: StatusClass,
    pub created_at: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub closed_at: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRecord {
    pub id: String,
    /// `None` when the raw type is blank or outside the point table.
    pub analysis_type: Option<AnalysisType>,
    pub raw_type: String,
    pub champion: ChampionRef,
    pub status: String,
    pub class: StatusClass,
    pub created_at: Option<NaiveDate>,
    pub closed_at: Option<NaiveDate>,
}

/// Per-row problems found while canonicalising; turned into warnings by
/// the caller.
#[derive(Debug, Default)]
pub(crate) struct RowProblems(pub Vec<String>);

fn champion_of(schema: &SchemaMap, row: &RawRecord, mode: IdentityMode) -> ChampionRef {
    ChampionRef::from_parts(
        schema.text(row, CanonicalField::ChampionId),
        schema.text(row, CanonicalField::Champion),
        mode,
    )
}

fn date_of(
    schema: &SchemaMap,
    row: &RawRecord,
    field: CanonicalField,
    problems: &mut RowProblems,
) -> Option<NaiveDate> {
    let value = schema.value(row, field)?;
    let date = schema.date(row, field);
    if date.is_none() {
        problems
            .0
            .push(format!("unparseable {} value {}", field, value));
    }
    date
}

fn identity_problem(schema: &SchemaMap, champion: &ChampionRef, problems: &mut RowProblems) {
    let identity_resolvable = schema.is_resolved(CanonicalField::ChampionId)
        || schema.is_resolved(CanonicalField::Champion);
    if champion.is_unassigned() && identity_resolvable {
        problems.0.push("no champion identity".to_string());
    }
}

fn created_problem(schema: &SchemaMap, row: &RawRecord, problems: &mut RowProblems) {
    if schema.is_resolved(CanonicalField::CreatedAt)
        && schema.value(row, CanonicalField::CreatedAt).is_none()
    {
        problems.0.push("no created date".to_string());
    }
}

impl ActionRecord {
    pub(crate) fn from_row(
        row: &RawRecord,
        index: usize,
        schema: &SchemaMap,
        mode: IdentityMode,
    ) -> (Self, RowProblems) {
        let mut problems = RowProblems::default();
        let id = schema
            .text(row, CanonicalField::Id)
            .unwrap_or_else(|| format!("AUTO-{:05}", index + 1));
        let champion = champion_of(schema, row, mode);
        identity_problem(schema, &champion, &mut problems);
        created_problem(schema, row, &mut problems);

        let raw_status = schema.text(row, CanonicalField::Status);
        let record = Self {
            id,
            champion,
            status: normalize_status(raw_status.as_deref()),
            class: classify(RecordKind::Action, raw_status.as_deref()),
            created_at: date_of(schema, row, CanonicalField::CreatedAt, &mut problems),
            due_date: date_of(schema, row, CanonicalField::DueDate, &mut problems),
            closed_at: date_of(schema, row, CanonicalField::ClosedAt, &mut problems),
        };
        (record, problems)
    }
}

impl AnalysisRecord {
    pub(crate) fn from_row(
        row: &RawRecord,
        index: usize,
        schema: &SchemaMap,
        mode: IdentityMode,
    ) -> (Self, RowProblems) {
        let mut problems = RowProblems::default();
        let id = schema
            .text(row, CanonicalField::Id)
            .unwrap_or_else(|| format!("AUTO-AN-{:05}", index + 1));
        let champion = champion_of(schema, row, mode);
        identity_problem(schema, &champion, &mut problems);
        created_problem(schema, row, &mut problems);

        let raw_type = schema.text(row, CanonicalField::Type).unwrap_or_default();
        let raw_status = schema.text(row, CanonicalField::Status);
        let record = Self {
            id,
            analysis_type: AnalysisType::parse(&raw_type),
            raw_type,
            champion,
            status: normalize_status(raw_status.as_deref()),
            class: classify(RecordKind::Analysis, raw_status.as_deref()),
            created_at: date_of(schema, row, CanonicalField::CreatedAt, &mut problems),
            closed_at: date_of(schema, row, CanonicalField::ClosedAt, &mut problems),
        };
        (record, problems)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::fields::AliasTable;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn rows(value: serde_json::Value) -> Vec<RawRecord> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().unwrap().clone())
            .collect()
    }

    #[test]
    fn test_identity_prefers_id() {
        let champion = ChampionRef::from_parts(
            Some("7".to_string()),
            Some("Alex Smith".to_string()),
            IdentityMode::Id,
        );
        assert_eq!(champion.key, ChampionKey::Id("7".to_string()));
        assert_eq!(champion.label, "Alex Smith");
    }

    #[test]
    fn test_identity_falls_back_to_label() {
        let champion = ChampionRef::from_parts(None, Some("Alex".to_string()), IdentityMode::Id);
        assert_eq!(champion.key, ChampionKey::Label("Alex".to_string()));
    }

    #[test]
    fn test_identity_id_without_label_uses_id_as_label() {
        let champion = ChampionRef::from_parts(Some("7".to_string()), None, IdentityMode::Id);
        assert_eq!(champion.label, "7");
    }

    #[test]
    fn test_label_mode_ignores_id() {
        let a = ChampionRef::from_parts(Some("1".to_string()), Some("Sam".to_string()), IdentityMode::Label);
        let b = ChampionRef::from_parts(Some("2".to_string()), Some("Sam".to_string()), IdentityMode::Label);
        assert_eq!(a.key, b.key);
    }

    #[test]
    fn test_no_identity_is_unassigned() {
        let champion = ChampionRef::from_parts(None, None, IdentityMode::Id);
        assert!(champion.is_unassigned());
        assert_eq!(champion.label, UNASSIGNED_LABEL);
    }

    #[test]
    fn test_identity_mode_from_str() {
        assert_eq!("ID".parse::<IdentityMode>().unwrap(), IdentityMode::Id);
        assert_eq!("label".parse::<IdentityMode>().unwrap(), IdentityMode::Label);
        assert!("email".parse::<IdentityMode>().is_err());
    }

    #[test]
    fn test_analysis_type_parse() {
        assert_eq!(AnalysisType::parse("5why"), Some(AnalysisType::FiveWhy));
        assert_eq!(AnalysisType::parse("5 Why"), Some(AnalysisType::FiveWhy));
        assert_eq!(AnalysisType::parse("a3"), Some(AnalysisType::A3));
        assert_eq!(AnalysisType::parse(" 8d "), Some(AnalysisType::EightD));
        assert_eq!(AnalysisType::parse("fishbone"), None);
        assert_eq!(AnalysisType::parse(""), None);
    }

    #[test]
    fn test_action_from_row() {
        let data = rows(json!([{
            "id": 10,
            "champion_id": 1,
            "champion": "Alex",
            "status": "CLOSED",
            "created_at": "2024-01-01T08:00:00",
            "due_date": "2024-01-10",
            "closed_at": "2024-01-09T08:00:00",
        }]));
        let schema = AliasTable::for_actions().resolve(&data);
        let (action, problems) = ActionRecord::from_row(&data[0], 0, &schema, IdentityMode::Id);

        assert!(problems.0.is_empty());
        assert_eq!(
            action,
            ActionRecord {
                id: "10".to_string(),
                champion: ChampionRef {
                    key: ChampionKey::Id("1".to_string()),
                    label: "Alex".to_string(),
                },
                status: "closed".to_string(),
                class: StatusClass::Closed,
                created_at: NaiveDate::from_ymd_opt(2024, 1, 1),
                due_date: NaiveDate::from_ymd_opt(2024, 1, 10),
                closed_at: NaiveDate::from_ymd_opt(2024, 1, 9),
            }
        );
    }

    #[test]
    fn test_action_synthetic_id_and_problems() {
        let data = rows(json!([
            {"id": "A-1", "owner": "Alex", "created": "2024-01-01"},
            {"owner": null, "created": null, "due": "next week"},
        ]));
        let schema = AliasTable::for_actions().resolve(&data);
        let (action, problems) = ActionRecord::from_row(&data[1], 1, &schema, IdentityMode::Id);

        assert_eq!(action.id, "AUTO-00002");
        assert!(action.champion.is_unassigned());
        assert_eq!(action.class, StatusClass::Open);
        assert_eq!(action.due_date, None);
        assert_eq!(
            problems.0,
            vec![
                "no champion identity".to_string(),
                "no created date".to_string(),
                "unparseable due_date value \"next week\"".to_string(),
            ]
        );
    }

    #[test]
    fn test_analysis_from_row_unknown_type() {
        let data = rows(json!([{"analysis_id": "AN-1", "type": "Fishbone", "owner": "Kim", "created_at": "2024-01-01"}]));
        let schema = AliasTable::for_analyses().resolve(&data);
        let (analysis, _) = AnalysisRecord::from_row(&data[0], 0, &schema, IdentityMode::Id);
        assert_eq!(analysis.analysis_type, None);
        assert_eq!(analysis.raw_type, "Fishbone");
        assert_eq!(analysis.champion.key, ChampionKey::Label("Kim".to_string()));
    }
}
