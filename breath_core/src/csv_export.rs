//! CSV export of the session history.

use crate::{Error, HistoryStore, Result, SessionLogEntry};
use std::path::Path;
use tempfile::NamedTempFile;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    id: String,
    timestamp: String,
    total_duration_seconds: u32,
    items: String,
}

impl From<&SessionLogEntry> for CsvRow {
    fn from(entry: &SessionLogEntry) -> Self {
        CsvRow {
            id: entry.id.to_string(),
            timestamp: entry.timestamp.to_rfc3339(),
            total_duration_seconds: entry.total_duration_seconds,
            items: entry.item_names.join(";"),
        }
    }
}

/// Write the whole history to `csv_path`, oldest session first
///
/// The file is written to a temp file, fsynced, then renamed into place so
/// an interrupted export never leaves a half-written CSV behind.
/// Returns the number of rows written.
pub fn export_csv(history: &HistoryStore, csv_path: &Path) -> Result<usize> {
    let parent = match csv_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let temp = NamedTempFile::new_in(parent)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(temp.as_file());

    let mut count = 0;
    for entry in history.entries().iter().rev() {
        writer.serialize(CsvRow::from(entry))?;
        count += 1;
    }

    // Headers come from the first serialized row; write them for an empty export
    if count == 0 {
        writer.write_record(["id", "timestamp", "total_duration_seconds", "items"])?;
    }

    writer.flush()?;
    drop(writer);
    temp.as_file().sync_all()?;
    temp.persist(csv_path).map_err(|e| Error::Io(e.error))?;

    tracing::info!("Exported {} sessions to {:?}", count, csv_path);
    Ok(count)
}
