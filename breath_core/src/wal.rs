//! Append-only session log on disk.
//!
//! Completed sessions are appended to a JSONL (JSON Lines) file, oldest
//! first, with file locking to ensure safe concurrent access.

use crate::{Result, SessionLogEntry};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Persistence for the session history.
///
/// Each call persists immediately.
pub trait HistorySink {
    fn append(&mut self, entry: &SessionLogEntry) -> Result<()>;
    fn clear(&mut self) -> Result<()>;
}

/// JSONL-based history sink with file locking
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    /// Create a new JSONL sink for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl HistorySink for JsonlSink {
    fn append(&mut self, entry: &SessionLogEntry) -> Result<()> {
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(entry)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        file.sync_all()?;
        file.unlock()?;

        tracing::debug!("Appended session {} to history", entry.id);
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }

        // Lock before truncating so a concurrent append can't land mid-clear
        let file = OpenOptions::new().write(true).open(&self.path)?;
        file.lock_exclusive()?;
        file.set_len(0)?;
        file.sync_all()?;
        file.unlock()?;

        tracing::info!("Cleared history at {:?}", self.path);
        Ok(())
    }
}

/// Read all entries from a history file, oldest first
///
/// Lines that fail to parse or are not UTF-8 are skipped with a warning.
/// Any other read error is returned.
pub fn read_entries(path: &Path) -> Result<Vec<SessionLogEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut entries = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = match line_result {
            Ok(line) => line,
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                tracing::warn!("Failed to read history line {}: {}", line_num + 1, e);
                continue;
            }
            Err(e) => {
                let _ = file.unlock();
                return Err(e.into());
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<SessionLogEntry>(&line) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                tracing::warn!("Failed to parse history at line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} sessions from history", entries.len());
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn create_test_entry(secs: u32) -> SessionLogEntry {
        SessionLogEntry {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            total_duration_seconds: secs,
            item_names: vec!["Bastrika".into(), "Ujjayi".into()],
        }
    }

    #[test]
    fn test_append_and_read_single_entry() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("history.jsonl");

        let entry = create_test_entry(300);
        let mut sink = JsonlSink::new(&path);
        sink.append(&entry).unwrap();

        let entries = read_entries(&path).unwrap();
        assert_eq!(entries, vec![entry]);
    }

    #[test]
    fn test_append_preserves_order() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("history.jsonl");

        let mut sink = JsonlSink::new(&path);
        for secs in 1..=5 {
            sink.append(&create_test_entry(secs)).unwrap();
        }

        let totals: Vec<u32> = read_entries(&path)
            .unwrap()
            .iter()
            .map(|e| e.total_duration_seconds)
            .collect();
        assert_eq!(totals, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_read_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let entries = read_entries(&temp_dir.path().join("nonexistent.jsonl")).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_corrupt_lines_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("history.jsonl");

        let good = create_test_entry(120);
        let contents = format!(
            "{{ invalid json }}\n{}\n{{\"id\":\"truncated",
            serde_json::to_string(&good).unwrap()
        );
        std::fs::write(&path, contents).unwrap();

        let entries = read_entries(&path).unwrap();
        assert_eq!(entries, vec![good]);
    }

    #[test]
    fn test_clear_truncates() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("history.jsonl");

        let mut sink = JsonlSink::new(&path);
        sink.append(&create_test_entry(60)).unwrap();
        sink.clear().unwrap();

        assert!(path.exists());
        assert!(read_entries(&path).unwrap().is_empty());

        // Appending after a clear starts a fresh log
        sink.append(&create_test_entry(30)).unwrap();
        assert_eq!(read_entries(&path).unwrap().len(), 1);
    }

    #[test]
    fn test_unreadable_history_is_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("history.jsonl");
        std::fs::create_dir(&path).unwrap();

        assert!(read_entries(&path).is_err());
        assert!(JsonlSink::new(&path).append(&create_test_entry(60)).is_err());
    }

    #[test]
    fn test_clear_missing_file_is_ok() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut sink = JsonlSink::new(temp_dir.path().join("none.jsonl"));
        assert!(sink.clear().is_ok());
    }
}
