//! Text rendering of catalog, live session and history.

use breath_core::{
    format_time, Catalog, SequencerState, SessionLogEntry, SessionSnapshot, WeeklySeries,
};
use chrono::Local;
use std::io::{IsTerminal, Write};

const BAR_WIDTH: usize = 20;
const CHART_WIDTH: u32 = 30;

pub fn print_catalog(catalog: &Catalog) {
    println!();
    for item in &catalog.items {
        let mark = if item.active { "[x]" } else { "[ ]" };
        println!(
            "  {} {:<16} {:>6}s  ({})",
            mark, item.name, item.duration_seconds, item.id
        );
    }
    println!();
    print_selection(catalog);
}

pub fn print_selection(catalog: &Catalog) {
    println!(
        "  Total: {}   Selected: {}/{}",
        format_time(catalog.total_active_seconds()),
        catalog.active_count(),
        catalog.items.len()
    );
}

pub fn print_history(recent: &[SessionLogEntry], series: &WeeklySeries) {
    println!("\nRecent sessions");
    println!("─────────────────────────────────────────");
    if recent.is_empty() {
        println!("  No sessions yet.");
    }
    for entry in recent {
        let local = entry.timestamp.with_timezone(&Local);
        println!(
            "  {}  {}  {}",
            local.format("%Y-%m-%d %H:%M"),
            format_time(entry.total_duration_seconds),
            entry.item_names.join(", ")
        );
    }

    println!("\nLast 7 days (minutes)");
    println!("─────────────────────────────────────────");
    let max = series.max_minutes().max(1);
    for day in &series.days {
        let len = (day.minutes.saturating_mul(CHART_WIDTH) / max) as usize;
        println!(
            "  {} {} │{:<width$} {}",
            day.weekday_label(),
            day.date.format("%m-%d"),
            "█".repeat(len),
            day.minutes,
            width = CHART_WIDTH as usize
        );
    }
    println!("  Total: {} min", series.total_minutes());
}

/// Redraws the live session status
pub struct SessionView {
    interactive: bool,
    last: Option<(SequencerState, Option<usize>)>,
}

impl SessionView {
    pub fn for_stdout() -> Self {
        Self {
            interactive: std::io::stdout().is_terminal(),
            last: None,
        }
    }

    /// On a terminal the status line is redrawn in place every tick;
    /// otherwise a line is printed only when the phase changes
    pub fn render(&mut self, snapshot: &SessionSnapshot) {
        let key = (snapshot.state, snapshot.step_index);
        let changed = self.last != Some(key);
        self.last = Some(key);

        if self.interactive {
            print!("\r{}\x1b[K", status_line(snapshot));
            let _ = std::io::stdout().flush();
        } else if changed {
            println!("{}", status_line(snapshot));
        }
    }

    pub fn finish_line(&self) {
        if self.interactive {
            println!();
        }
    }
}

pub fn status_line(snapshot: &SessionSnapshot) -> String {
    let name = snapshot.step_name.as_deref().unwrap_or("");
    match snapshot.state {
        SequencerState::Completed => format!("{}  Done", name),
        SequencerState::Idle | SequencerState::Aborted => String::new(),
        SequencerState::RunningActive { .. } | SequencerState::RunningCooldown { .. } => {
            let step = snapshot.step_index.map(|i| i + 1).unwrap_or(0);
            let next = snapshot
                .next_label
                .as_ref()
                .map(|l| l.to_string())
                .unwrap_or_default();
            format!(
                "[{}/{}] {:<16} {}  {}  {}",
                step,
                snapshot.step_count,
                name,
                format_time(snapshot.remaining_seconds),
                progress_bar(snapshot.progress),
                next
            )
        }
    }
}

fn progress_bar(progress: f64) -> String {
    let filled = ((progress.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}
