pub mod dates;
pub mod fields;
pub mod filter;
pub mod snapshot;
pub mod status;
pub mod types;

pub use dates::{coerce_date, parse_date};
pub use fields::{normalize_key, AliasTable, CanonicalField, SchemaMap};
pub use filter::{RecordFilter, StatusScope};
pub use snapshot::{load_snapshot, parse_snapshot};
pub use status::{classify, normalize_status, RecordKind, StatusClass};
pub use types::{
    ActionRecord, AnalysisRecord, AnalysisType, ChampionKey, ChampionRef, IdentityMode,
    UNASSIGNED_LABEL,
};

use crate::error::DataIssue;

/// One row of a snapshot, as handed over by the upstream query layer.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

fn missing_fields<'a>(
    schema: &'a SchemaMap,
    rows: &[RawRecord],
) -> impl Iterator<Item = DataIssue> + 'a {
    // An empty snapshot has no schema to complain about.
    let unresolved = if rows.is_empty() {
        &[][..]
    } else {
        schema.unresolved()
    };
    unresolved.iter().map(move |field| DataIssue::MissingField {
        kind: schema.kind(),
        field: *field,
    })
}

/// Resolve the action alias table once for the whole snapshot and turn
/// every row into an [`ActionRecord`]. Never fails; problems are returned
/// as warnings.
pub fn read_actions(
    rows: &[RawRecord],
    aliases: &AliasTable,
    mode: IdentityMode,
) -> (Vec<ActionRecord>, Vec<DataIssue>) {
    let schema = aliases.resolve(rows);
    let mut issues: Vec<DataIssue> = missing_fields(&schema, rows).collect();
    let mut records = Vec::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
        let (record, problems) = ActionRecord::from_row(row, index, &schema, mode);
        issues.extend(problems.0.into_iter().map(|reason| DataIssue::InvalidRecord {
            kind: RecordKind::Action,
            item_id: record.id.clone(),
            reason,
        }));
        records.push(record);
    }

    (records, issues)
}

/// Analysis counterpart of [`read_actions`]. Unknown analysis types are
/// reported here as well.
pub fn read_analyses(
    rows: &[RawRecord],
    aliases: &AliasTable,
    mode: IdentityMode,
) -> (Vec<AnalysisRecord>, Vec<DataIssue>) {
    let schema = aliases.resolve(rows);
    let mut issues: Vec<DataIssue> = missing_fields(&schema, rows).collect();
    let mut records = Vec::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
        let (record, problems) = AnalysisRecord::from_row(row, index, &schema, mode);
        issues.extend(problems.0.into_iter().map(|reason| DataIssue::InvalidRecord {
            kind: RecordKind::Analysis,
            item_id: record.id.clone(),
            reason,
        }));
        if record.analysis_type.is_none() {
            issues.push(DataIssue::UnknownAnalysisType {
                item_id: record.id.clone(),
                raw_type: record.raw_type.clone(),
            });
        }
        records.push(record);
    }

    (records, issues)
}
