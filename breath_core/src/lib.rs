#![forbid(unsafe_code)]

//! Core domain model and session engine for guided breathing practice.
//!
//! This crate provides:
//! - Domain types (practice items, session queue, log entries)
//! - Catalog editing and persistence
//! - Countdown timer and session sequencer
//! - Session dispatcher over audio, wake lock and history boundaries
//! - History persistence (JSONL, CSV export) and the 7-day summary

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod state;
pub mod timer;
pub mod sequencer;
pub mod ports;
pub mod driver;
pub mod wal;
pub mod history;
pub mod aggregate;
pub mod csv_export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog};
pub use config::Config;
pub use timer::{Countdown, Tick, TimerEvent};
pub use sequencer::{Effect, NextLabel, SessionSnapshot, Sequencer, SequencerState};
pub use ports::{CuePlayer, NoWakeLock, SilentCues, WakeLock};
pub use driver::SessionDriver;
pub use wal::{HistorySink, JsonlSink};
pub use history::HistoryStore;
pub use aggregate::{weekly_minutes, DayBucket, WeeklySeries};
pub use csv_export::export_csv;
