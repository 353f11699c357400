//! Seven-day practice summary.
//!
//! Buckets are calendar days in the time zone of the reference instant, not
//! rolling 24h windows. Every call re-scans the whole history.

use crate::HistoryStore;
use chrono::{DateTime, Days, NaiveDate, TimeZone};

/// Number of days in the summary window, today included
pub const WINDOW_DAYS: usize = 7;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DayBucket {
    pub date: NaiveDate,
    pub minutes: u32,
}

impl DayBucket {
    /// Short weekday name, e.g. "Mon"
    pub fn weekday_label(&self) -> String {
        self.date.format("%a").to_string()
    }
}

/// Oldest day first, ending at the reference day
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeeklySeries {
    pub days: Vec<DayBucket>,
}

impl WeeklySeries {
    pub fn minutes(&self) -> Vec<u32> {
        self.days.iter().map(|d| d.minutes).collect()
    }

    pub fn total_minutes(&self) -> u32 {
        self.days.iter().map(|d| d.minutes).sum()
    }

    pub fn max_minutes(&self) -> u32 {
        self.days.iter().map(|d| d.minutes).max().unwrap_or(0)
    }
}

/// Practice minutes per calendar day for the week ending at `today`
///
/// Each day's seconds are summed first, then rounded to the nearest minute.
pub fn weekly_minutes<Tz: TimeZone>(history: &HistoryStore, today: &DateTime<Tz>) -> WeeklySeries {
    let tz = today.timezone();
    let last = today.date_naive();

    let dates: Vec<NaiveDate> = (0..WINDOW_DAYS as u64)
        .rev()
        .map(|back| last.checked_sub_days(Days::new(back)).unwrap_or(NaiveDate::MIN))
        .collect();

    let mut seconds = [0u64; WINDOW_DAYS];
    for entry in history.entries() {
        let day = entry.timestamp.with_timezone(&tz).date_naive();
        if let Some(idx) = dates.iter().position(|d| *d == day) {
            seconds[idx] += u64::from(entry.total_duration_seconds);
        }
    }

    let days = dates
        .into_iter()
        .zip(seconds)
        .map(|(date, secs)| DayBucket {
            date,
            minutes: round_to_minutes(secs),
        })
        .collect();

    WeeklySeries { days }
}

fn round_to_minutes(seconds: u64) -> u32 {
    u32::try_from((seconds + 30) / 60).unwrap_or(u32::MAX)
}
