use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::dates::coerce_date;
use super::status::RecordKind;
use super::RawRecord;

/// Semantic fields the scorer understands, independent of how a source
/// system names its columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    Id,
    ChampionId,
    Champion,
    Status,
    Type,
    CreatedAt,
    DueDate,
    ClosedAt,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 8] = [
        CanonicalField::Id,
        CanonicalField::ChampionId,
        CanonicalField::Champion,
        CanonicalField::Status,
        CanonicalField::Type,
        CanonicalField::CreatedAt,
        CanonicalField::DueDate,
        CanonicalField::ClosedAt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::Id => "id",
            CanonicalField::ChampionId => "champion_id",
            CanonicalField::Champion => "champion",
            CanonicalField::Status => "status",
            CanonicalField::Type => "type",
            CanonicalField::CreatedAt => "created_at",
            CanonicalField::DueDate => "due_date",
            CanonicalField::ClosedAt => "closed_at",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let key = normalize_key(s);
        Self::ALL
            .into_iter()
            .find(|field| normalize_key(field.as_str()) == key)
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalize a column name for alias matching: lowercase, no whitespace,
/// no underscores.
pub fn normalize_key(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Ordered alias candidates per canonical field. Earlier candidates win.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTable {
    kind: RecordKind,
    entries: BTreeMap<CanonicalField, Vec<String>>,
}

fn aliases(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl AliasTable {
    pub fn for_actions() -> Self {
        let entries = BTreeMap::from([
            (CanonicalField::Id, aliases(&["action_id", "id", "actionid"])),
            (
                CanonicalField::ChampionId,
                aliases(&["champion_id", "owner_id", "responsible_id"]),
            ),
            (
                CanonicalField::Champion,
                aliases(&["champion", "owner", "responsible", "champion_name"]),
            ),
            (CanonicalField::Status, aliases(&["status", "state"])),
            (
                CanonicalField::CreatedAt,
                aliases(&["created_at", "created", "created_date", "date"]),
            ),
            (
                CanonicalField::DueDate,
                aliases(&["due_date", "due", "target_date", "targetdate"]),
            ),
            (
                CanonicalField::ClosedAt,
                aliases(&["closed_at", "closed", "closed_date", "closedon"]),
            ),
        ]);
        Self {
            kind: RecordKind::Action,
            entries,
        }
    }

    pub fn for_analyses() -> Self {
        let entries = BTreeMap::from([
            (CanonicalField::Id, aliases(&["analysis_id", "analysisid", "id"])),
            (CanonicalField::Type, aliases(&["type", "analysis_type"])),
            (
                CanonicalField::ChampionId,
                aliases(&["champion_id", "owner_id", "responsible_id"]),
            ),
            (
                CanonicalField::Champion,
                aliases(&["champion", "owner", "responsible", "champion_name"]),
            ),
            (CanonicalField::Status, aliases(&["status", "state"])),
            (
                CanonicalField::CreatedAt,
                aliases(&["created_at", "created", "created_date", "date"]),
            ),
            (
                CanonicalField::ClosedAt,
                aliases(&["closed_at", "closed", "closed_date"]),
            ),
        ]);
        Self {
            kind: RecordKind::Analysis,
            entries,
        }
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Whether this kind of record has the field at all.
    pub fn supports(&self, field: CanonicalField) -> bool {
        self.entries.contains_key(&field)
    }

    /// Replace the candidates for one field.
    pub fn set(&mut self, field: CanonicalField, candidates: Vec<String>) {
        self.entries.insert(field, candidates);
    }

    pub fn candidates(&self, field: CanonicalField) -> &[String] {
        self.entries.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Resolve the table against a snapshot's columns. Columns are taken as
    /// the union of keys across all rows, in first-seen order.
    pub fn resolve(&self, rows: &[RawRecord]) -> SchemaMap {
        let mut normalized: Vec<(String, String)> = Vec::new();
        for row in rows {
            for column in row.keys() {
                let key = normalize_key(column);
                if !normalized.iter().any(|(k, _)| *k == key) {
                    normalized.push((key, column.clone()));
                }
            }
        }

        let mut columns = BTreeMap::new();
        let mut unresolved = Vec::new();
        for (field, candidates) in &self.entries {
            let hit = candidates.iter().find_map(|candidate| {
                let key = normalize_key(candidate);
                normalized
                    .iter()
                    .find(|(k, _)| *k == key)
                    .map(|(_, column)| column.clone())
            });
            match hit {
                Some(column) => {
                    columns.insert(*field, column);
                }
                None => unresolved.push(*field),
            }
        }

        SchemaMap {
            kind: self.kind,
            columns,
            unresolved,
        }
    }
}

/// The result of resolving an [`AliasTable`] against one snapshot: which
/// concrete column backs each canonical field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaMap {
    kind: RecordKind,
    columns: BTreeMap<CanonicalField, String>,
    unresolved: Vec<CanonicalField>,
}

impl SchemaMap {
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn column(&self, field: CanonicalField) -> Option<&str> {
        self.columns.get(&field).map(String::as_str)
    }

    pub fn is_resolved(&self, field: CanonicalField) -> bool {
        self.columns.contains_key(&field)
    }

    /// Fields no column matched, in canonical order.
    pub fn unresolved(&self) -> &[CanonicalField] {
        &self.unresolved
    }

    pub fn value<'a>(&self, row: &'a RawRecord, field: CanonicalField) -> Option<&'a Value> {
        let column = self.columns.get(&field)?;
        match row.get(column) {
            Some(Value::Null) | None => None,
            Some(value) => Some(value),
        }
    }

    /// Text value of a field. Strings are trimmed and blanks treated as
    /// absent; numbers and booleans are stringified.
    pub fn text(&self, row: &RawRecord, field: CanonicalField) -> Option<String> {
        match self.value(row, field)? {
            Value::String(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn date(&self, row: &RawRecord, field: CanonicalField) -> Option<NaiveDate> {
        self.value(row, field).and_then(coerce_date)
    }
}
