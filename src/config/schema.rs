use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::records::{AliasTable, CanonicalField};
use crate::scoring::ScoringConfig;

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub scoring: Option<ScoringConfig>,

    #[serde(default)]
    pub fields: Option<FieldConfig>,

    /// Known champions. When set, ids outside this list are treated as
    /// unassigned.
    #[serde(default)]
    pub roster: Option<Vec<RosterEntry>>,
}

/// Alias overrides per snapshot. Keys are canonical field names, values
/// replace the default alias candidates for that field.
///
/// ```yaml
/// fields:
///   actions:
///     due_date: ["deadline", "due"]
///   analyses:
///     type: ["method"]
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FieldConfig {
    #[serde(default)]
    pub actions: Option<BTreeMap<String, Vec<String>>>,

    #[serde(default)]
    pub analyses: Option<BTreeMap<String, Vec<String>>>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RosterEntry {
    pub id: String,
    pub name: String,
}

impl Config {
    pub fn scoring(&self) -> ScoringConfig {
        self.scoring.clone().unwrap_or_default()
    }

    pub fn action_aliases(&self) -> AliasTable {
        let overrides = self.fields.as_ref().and_then(|f| f.actions.as_ref());
        with_overrides(AliasTable::for_actions(), overrides)
    }

    pub fn analysis_aliases(&self) -> AliasTable {
        let overrides = self.fields.as_ref().and_then(|f| f.analyses.as_ref());
        with_overrides(AliasTable::for_analyses(), overrides)
    }
}

/// Apply overrides to a default table. Names that are not fields of this
/// record kind are skipped here; `validate_config` reports them.
fn with_overrides(
    mut table: AliasTable,
    overrides: Option<&BTreeMap<String, Vec<String>>>,
) -> AliasTable {
    for (name, candidates) in overrides.into_iter().flatten() {
        match CanonicalField::parse(name) {
            Some(field) if table.supports(field) => table.set(field, candidates.clone()),
            _ => {}
        }
    }
    table
}
