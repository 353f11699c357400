//! In-memory session history, most recent first.

use crate::wal::{read_entries, HistorySink};
use crate::{Result, SessionLogEntry};
use std::path::Path;

/// Ordered log of completed sessions. New entries go to the head.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HistoryStore {
    entries: Vec<SessionLogEntry>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from entries in on-disk (oldest first) order
    pub fn from_chronological(mut entries: Vec<SessionLogEntry>) -> Self {
        entries.reverse();
        Self { entries }
    }

    /// Load history from a JSONL file
    ///
    /// A missing file gives an empty history; an unreadable one is logged
    /// and also treated as empty.
    pub fn load(path: &Path) -> Self {
        match read_entries(path) {
            Ok(entries) => {
                tracing::debug!("Loaded {} history entries from {:?}", entries.len(), path);
                Self::from_chronological(entries)
            }
            Err(e) => {
                tracing::warn!(
                    "Unable to read history {:?}: {}. Starting with empty history.",
                    path,
                    e
                );
                Self::default()
            }
        }
    }

    /// Insert at the head and persist
    ///
    /// The in-memory store is updated even when the sink fails, so the
    /// running process still sees the session.
    pub fn append(&mut self, entry: SessionLogEntry, sink: &mut dyn HistorySink) -> Result<()> {
        let persisted = sink.append(&entry);
        self.entries.insert(0, entry);
        persisted
    }

    /// Remove every entry and persist
    pub fn clear(&mut self, sink: &mut dyn HistorySink) -> Result<()> {
        sink.clear()?;
        self.entries.clear();
        Ok(())
    }

    /// All entries, most recent first
    pub fn entries(&self) -> &[SessionLogEntry] {
        &self.entries
    }

    /// Up to `n` most recent entries
    pub fn recent(&self, n: usize) -> &[SessionLogEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wal::JsonlSink;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn entry(secs: u32, days_ago: i64) -> SessionLogEntry {
        SessionLogEntry {
            id: Uuid::new_v4(),
            timestamp: Utc::now() - Duration::days(days_ago),
            total_duration_seconds: secs,
            item_names: vec!["Pranava".into()],
        }
    }

    /// Sink that records calls and can be told to fail
    #[derive(Default)]
    struct MemorySink {
        appended: Vec<SessionLogEntry>,
        clears: usize,
        fail: bool,
    }

    impl HistorySink for MemorySink {
        fn append(&mut self, entry: &SessionLogEntry) -> Result<()> {
            if self.fail {
                return Err(crate::Error::Other("disk full".into()));
            }
            self.appended.push(entry.clone());
            Ok(())
        }

        fn clear(&mut self) -> Result<()> {
            if self.fail {
                return Err(crate::Error::Other("disk full".into()));
            }
            self.clears += 1;
            Ok(())
        }
    }

    #[test]
    fn test_append_inserts_at_head_and_persists() {
        let mut store = HistoryStore::new();
        let mut sink = MemorySink::default();

        store.append(entry(60, 1), &mut sink).unwrap();
        store.append(entry(120, 0), &mut sink).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.entries()[0].total_duration_seconds, 120);
        assert_eq!(sink.appended.len(), 2);
    }

    #[test]
    fn test_append_keeps_entry_when_sink_fails() {
        let mut store = HistoryStore::new();
        let mut sink = MemorySink {
            fail: true,
            ..Default::default()
        };
        assert!(store.append(entry(60, 0), &mut sink).is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_failed_clear_keeps_entries() {
        let mut store = HistoryStore::from_chronological(vec![entry(60, 0)]);
        let mut sink = MemorySink {
            fail: true,
            ..Default::default()
        };
        assert!(store.clear(&mut sink).is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_recent_limits() {
        let store = HistoryStore::from_chronological((1..=7).map(|s| entry(s, 0)).collect());
        let recent: Vec<u32> = store
            .recent(5)
            .iter()
            .map(|e| e.total_duration_seconds)
            .collect();
        assert_eq!(recent, vec![7, 6, 5, 4, 3]);
        assert_eq!(HistoryStore::new().recent(5).len(), 0);
    }

    #[test]
    fn test_load_from_disk_is_most_recent_first() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("history.jsonl");

        let mut sink = JsonlSink::new(&path);
        let mut store = HistoryStore::load(&path);
        assert!(store.is_empty());

        store.append(entry(100, 2), &mut sink).unwrap();
        store.append(entry(200, 1), &mut sink).unwrap();

        let reloaded = HistoryStore::load(&path);
        assert_eq!(reloaded, store);
        assert_eq!(reloaded.entries()[0].total_duration_seconds, 200);
    }

    #[test]
    fn test_clear_persists() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("history.jsonl");

        let mut sink = JsonlSink::new(&path);
        let mut store = HistoryStore::new();
        store.append(entry(100, 0), &mut sink).unwrap();
        store.clear(&mut sink).unwrap();

        assert!(store.is_empty());
        assert!(HistoryStore::load(&path).is_empty());
    }
}
