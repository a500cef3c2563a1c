use super::ScoreEvent;
use crate::error::ScoreError;
use atomic_write_file::AtomicWriteFile;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub const LEDGER_FILE_VERSION: u32 = 1;

/// Audit copy of one scoring run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerFile {
    pub version: u32,
    pub as_of: NaiveDate,
    #[serde(default)]
    pub events: Vec<ScoreEvent>,
}

impl LedgerFile {
    pub fn new(as_of: NaiveDate, events: Vec<ScoreEvent>) -> Self {
        Self {
            version: LEDGER_FILE_VERSION,
            as_of,
            events,
        }
    }
}

fn io_error(path: &Path, source: std::io::Error) -> ScoreError {
    ScoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Load a ledger audit file.
///
/// Fails if the file is missing or was written by an unsupported version.
pub fn load_ledger(path: &Path) -> Result<LedgerFile, ScoreError> {
    let file = File::open(path).map_err(|e| io_error(path, e))?;
    let ledger: LedgerFile = serde_json::from_reader(BufReader::new(file))?;

    if ledger.version != LEDGER_FILE_VERSION {
        return Err(ScoreError::UnsupportedLedgerVersion(ledger.version));
    }

    Ok(ledger)
}

/// Save a ledger audit file atomically.
///
/// The previous copy, if any, is replaced only once the new one is fully
/// written.
pub fn save_ledger(path: &Path, ledger: &LedgerFile) -> Result<(), ScoreError> {
    let mut file = AtomicWriteFile::open(path).map_err(|e| io_error(path, e))?;

    serde_json::to_writer_pretty(&mut file, ledger)?;

    file.commit().map_err(|e| io_error(path, e))?;
    tracing::debug!(path = %path.display(), events = ledger.events.len(), "ledger saved");

    Ok(())
}
