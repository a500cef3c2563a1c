//! Error and warning types.
//!
//! `ScoreError` is for misuse and I/O. Data-quality problems in the input
//! snapshots are never errors; they surface as `DataIssue` warnings next to
//! the computed scorecard.

use std::fmt;

use serde::Serialize;

use crate::records::{CanonicalField, RecordKind};

#[derive(Debug, thiserror::Error)]
pub enum ScoreError {
    /// A mode string (identity mode, output format, status scope) that the
    /// engine does not know about.
    #[error("unsupported {kind}: '{value}' (expected one of: {expected})")]
    UnsupportedMode {
        kind: &'static str,
        value: String,
        expected: &'static str,
    },

    /// Configuration failed validation. Carries every problem found.
    #[error("invalid configuration: {}", .0.join("; "))]
    InvalidConfig(Vec<String>),

    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported ledger file version: {0}")]
    UnsupportedLedgerVersion(u32),

    #[error("snapshot {path} must be a JSON array of objects")]
    SnapshotShape { path: String },
}

/// A non-fatal problem found while reading a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum DataIssue {
    /// No column in the snapshot matched any alias of a canonical field.
    /// Rules depending on it are skipped for every record.
    MissingField {
        kind: RecordKind,
        field: CanonicalField,
    },
    /// A record that could not be fully attributed or dated.
    InvalidRecord {
        kind: RecordKind,
        item_id: String,
        reason: String,
    },
    /// Analysis type outside the point table; type-specific rules skipped.
    UnknownAnalysisType { item_id: String, raw_type: String },
}

impl fmt::Display for DataIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataIssue::MissingField { kind, field } => write!(
                f,
                "{} snapshot has no column for '{}'; dependent rules are skipped",
                kind, field
            ),
            DataIssue::InvalidRecord {
                kind,
                item_id,
                reason,
            } => write!(f, "{} {}: {}", kind, item_id, reason),
            DataIssue::UnknownAnalysisType { item_id, raw_type } => write!(
                f,
                "analysis {}: unknown type '{}', type rules skipped",
                item_id, raw_type
            ),
        }
    }
}
