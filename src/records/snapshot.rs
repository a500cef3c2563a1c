use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde_json::Value;

use super::RawRecord;
use crate::error::ScoreError;

/// Load a snapshot file: a JSON array of objects with arbitrary keys.
pub fn load_snapshot(path: &Path) -> Result<Vec<RawRecord>, ScoreError> {
    let file = File::open(path).map_err(|source| ScoreError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let value: Value = serde_json::from_reader(BufReader::new(file))?;
    parse_snapshot(value).ok_or_else(|| ScoreError::SnapshotShape {
        path: path.display().to_string(),
    })
}

/// Split a JSON array into rows. Returns `None` if the value is not an
/// array of objects.
pub fn parse_snapshot(value: Value) -> Option<Vec<RawRecord>> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_parse_snapshot_array_of_objects() {
        let rows = parse_snapshot(json!([{"id": 1}, {"id": 2, "owner": "Kim"}])).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["owner"], json!("Kim"));
    }

    #[test]
    fn test_parse_snapshot_rejects_non_objects() {
        assert!(parse_snapshot(json!([{"id": 1}, 2])).is_none());
        assert!(parse_snapshot(json!({"id": 1})).is_none());
    }

    #[test]
    fn test_load_snapshot_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"action_id": "A-1", "status": "open"}}]"#).unwrap();
        let rows = load_snapshot(file.path()).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_load_snapshot_wrong_shape() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"records": []}}"#).unwrap();
        let err = load_snapshot(file.path()).unwrap_err();
        assert!(matches!(err, ScoreError::SnapshotShape { .. }));
    }

    #[test]
    fn test_load_snapshot_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_snapshot(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ScoreError::Io { .. }));
    }
}
