//! Core domain types for the breathing practice system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Practice items and the catalog that owns them
//! - The per-session queue snapshot
//! - Completed session log entries
//! - Audio cue kinds

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Practice Items
// ============================================================================

/// Longest duration a single exercise may be set to (one day)
pub const MAX_DURATION_SECONDS: u32 = 86_400;

/// A single breathing exercise
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PracticeItem {
    pub id: String,
    pub name: String,
    pub duration_seconds: u32,
    pub active: bool,
}

impl PracticeItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, duration_seconds: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            duration_seconds,
            active: true,
        }
    }
}

/// The user's ordered list of exercises
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Catalog {
    pub items: Vec<PracticeItem>,
}

// ============================================================================
// Session Queue
// ============================================================================

/// Snapshot of the active items taken when a session starts.
///
/// Never empty; the only constructor rejects an empty selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionQueue {
    items: Vec<PracticeItem>,
}

impl SessionQueue {
    /// Build a queue from the active subset of `items`, preserving order
    pub fn from_active<'a>(items: impl IntoIterator<Item = &'a PracticeItem>) -> Result<Self> {
        let items: Vec<PracticeItem> = items.into_iter().filter(|i| i.active).cloned().collect();
        if items.is_empty() {
            return Err(Error::NoActiveItems);
        }
        Ok(Self { items })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false; kept for clippy's `len_without_is_empty`
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PracticeItem> {
        self.items.get(index)
    }

    pub fn is_last(&self, index: usize) -> bool {
        index + 1 == self.items.len()
    }

    pub fn items(&self) -> &[PracticeItem] {
        &self.items
    }

    /// Sum of exercise durations, excluding any cooldowns
    pub fn total_seconds(&self) -> u32 {
        sum_seconds(self.items.iter())
    }

    pub fn item_names(&self) -> Vec<String> {
        self.items.iter().map(|i| i.name.clone()).collect()
    }
}

/// Saturating sum of item durations
pub(crate) fn sum_seconds<'a>(items: impl Iterator<Item = &'a PracticeItem>) -> u32 {
    items.fold(0u32, |acc, i| acc.saturating_add(i.duration_seconds))
}

// ============================================================================
// Session Log
// ============================================================================

/// A fully completed session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionLogEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub total_duration_seconds: u32,
    pub item_names: Vec<String>,
}

impl SessionLogEntry {
    /// Record a completed traversal of `queue` at `timestamp`
    pub fn for_queue(queue: &SessionQueue, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            total_duration_seconds: queue.total_seconds(),
            item_names: queue.item_names(),
        }
    }
}

// ============================================================================
// Cues
// ============================================================================

/// Audible cue emitted at phase boundaries
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CueKind {
    EndOfExercise,
    StartOfNext,
    SessionFinish,
}

/// Format a second count as `mm:ss`
pub fn format_time(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, secs: u32, active: bool) -> PracticeItem {
        PracticeItem {
            id: name.to_lowercase(),
            name: name.into(),
            duration_seconds: secs,
            active,
        }
    }

    #[test]
    fn test_queue_keeps_only_active_in_order() {
        let items = vec![
            item("A", 60, true),
            item("B", 30, false),
            item("C", 45, true),
        ];
        let queue = SessionQueue::from_active(&items).unwrap();
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.item_names(), vec!["A", "C"]);
        assert_eq!(queue.total_seconds(), 105);
        assert!(queue.is_last(1));
        assert!(!queue.is_last(0));
    }

    #[test]
    fn test_queue_total_saturates() {
        let items = vec![item("A", u32::MAX, true), item("B", u32::MAX, true)];
        let queue = SessionQueue::from_active(&items).unwrap();
        assert_eq!(queue.total_seconds(), u32::MAX);
        let entry = SessionLogEntry::for_queue(&queue, Utc::now());
        assert_eq!(entry.total_duration_seconds, u32::MAX);
    }

    #[test]
    fn test_queue_rejects_empty_selection() {
        let items = vec![item("A", 60, false)];
        assert!(matches!(
            SessionQueue::from_active(&items),
            Err(Error::NoActiveItems)
        ));
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(59), "00:59");
        assert_eq!(format_time(600), "10:00");
        assert_eq!(format_time(1980), "33:00");
    }

    #[test]
    fn test_log_entry_serializes_iso_timestamp() {
        let items = vec![item("A", 60, true)];
        let queue = SessionQueue::from_active(&items).unwrap();
        let ts = DateTime::parse_from_rfc3339("2024-03-01T08:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let entry = SessionLogEntry::for_queue(&queue, ts);
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("2024-03-01T08:30:00Z"));
        assert!(json.contains("\"item_names\":[\"A\"]"));
    }
}
