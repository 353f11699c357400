//! Session sequencer.
//!
//! Drives one ordered run through the active exercises:
//!
//! ```text
//! Idle -> RunningActive(0) -> [RunningCooldown(0)] -> RunningActive(1) -> ... -> Completed -> Idle
//!              \___________________ stop() ____________________/
//!                                     |
//!                                  Aborted -> Idle
//! ```
//!
//! The sequencer performs no I/O. Every command returns the [`Effect`]s the
//! caller must carry out (cues, wake lock, logging, rendering).

use crate::timer::{Countdown, Tick, TimerEvent};
use crate::{Catalog, CueKind, Error, Result, SessionLogEntry, SessionQueue};
use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;

/// Default pause on the "done" screen before returning to idle
pub const DEFAULT_COMPLETION_GRACE: Duration = Duration::from_millis(1500);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequencerState {
    Idle,
    RunningActive { step: usize },
    RunningCooldown { step: usize },
    Completed,
    Aborted,
}

impl SequencerState {
    pub fn is_running(&self) -> bool {
        matches!(
            self,
            SequencerState::RunningActive { .. } | SequencerState::RunningCooldown { .. }
        )
    }
}

/// Side effect requested by a transition
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    InitAudio,
    AcquireWakeLock,
    ReleaseWakeLock,
    PlayCue(CueKind),
    AppendLog(SessionLogEntry),
    /// Countdown changed; re-render
    Tick(Tick),
    /// Call [`Sequencer::return_to_idle`] once this delay has passed
    ReturnToIdleAfter(Duration),
}

/// What the user should expect after the current phase
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NextLabel {
    Next(String),
    PrepareFor(String),
    FinishLine,
}

impl fmt::Display for NextLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NextLabel::Next(name) => write!(f, "Next: {}", name),
            NextLabel::PrepareFor(name) => write!(f, "Prepare for {}", name),
            NextLabel::FinishLine => write!(f, "Finish Line"),
        }
    }
}

/// Read-only view for the presentation layer
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSnapshot {
    pub state: SequencerState,
    pub step_index: Option<usize>,
    pub step_count: usize,
    pub step_name: Option<String>,
    pub remaining_seconds: u32,
    pub total_seconds: u32,
    pub progress: f64,
    pub next_label: Option<NextLabel>,
}

/// Owns the queue, phase and countdown for the duration of one run
#[derive(Clone, Debug)]
pub struct Sequencer {
    state: SequencerState,
    queue: Option<SessionQueue>,
    cooldown_seconds: u32,
    step_count: usize,
    countdown: Countdown,
    grace: Duration,
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new(DEFAULT_COMPLETION_GRACE)
    }
}

impl Sequencer {
    pub fn new(grace: Duration) -> Self {
        Self {
            state: SequencerState::Idle,
            queue: None,
            cooldown_seconds: 0,
            step_count: 0,
            countdown: Countdown::new(),
            grace,
        }
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    pub fn queue(&self) -> Option<&SessionQueue> {
        self.queue.as_ref()
    }

    /// Cooldown captured when the current session started
    pub fn cooldown_seconds(&self) -> u32 {
        self.cooldown_seconds
    }

    /// Start a session from the catalog's active items.
    ///
    /// `cooldown_seconds` is read once here; zero or negative disables rest
    /// intervals. Fails without changing state when nothing is enabled or a
    /// session is already running.
    pub fn start(&mut self, catalog: &Catalog, cooldown_seconds: i64) -> Result<Vec<Effect>> {
        if self.state.is_running() {
            return Err(Error::State("a session is already running".into()));
        }

        let queue = catalog.session_queue()?;

        self.cooldown_seconds = u32::try_from(cooldown_seconds.max(0)).unwrap_or(u32::MAX);
        self.step_count = queue.len();
        tracing::info!(
            "Starting session: {} exercises, {}s of practice, {}s cooldown",
            queue.len(),
            queue.total_seconds(),
            self.cooldown_seconds
        );
        self.queue = Some(queue);

        let mut effects = vec![Effect::InitAudio, Effect::AcquireWakeLock];
        effects.extend(self.enter_active(0));
        Ok(effects)
    }

    /// Feed one elapsed second
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<Effect> {
        match self.countdown.tick() {
            None => Vec::new(),
            Some(TimerEvent::Tick(tick)) => vec![Effect::Tick(tick)],
            Some(TimerEvent::Elapsed) => self.on_elapsed(now),
        }
    }

    /// Abort the running session. Nothing is logged.
    pub fn stop(&mut self) -> Vec<Effect> {
        match self.state {
            SequencerState::RunningActive { .. } | SequencerState::RunningCooldown { .. } => {
                self.countdown.cancel();
                self.queue = None;
                self.set_state(SequencerState::Aborted);
                tracing::info!("Session stopped before completion; not logged");
                vec![
                    Effect::ReleaseWakeLock,
                    Effect::ReturnToIdleAfter(Duration::ZERO),
                ]
            }
            SequencerState::Completed => {
                self.set_state(SequencerState::Idle);
                Vec::new()
            }
            SequencerState::Idle | SequencerState::Aborted => Vec::new(),
        }
    }

    /// Leave the completed or aborted screen
    pub fn return_to_idle(&mut self) {
        if matches!(
            self.state,
            SequencerState::Completed | SequencerState::Aborted
        ) {
            self.set_state(SequencerState::Idle);
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let tick = self.countdown.current();
        let (remaining_seconds, total_seconds, progress) = tick
            .map(|t| (t.remaining, t.total, t.progress()))
            .unwrap_or((0, 0, 0.0));

        let (step_index, step_name, next_label) = match self.state {
            SequencerState::RunningActive { step } => {
                let next_label = match self.item_name(step + 1) {
                    Some(name) => NextLabel::Next(name),
                    None => NextLabel::FinishLine,
                };
                (Some(step), self.item_name(step), Some(next_label))
            }
            SequencerState::RunningCooldown { step } => (
                Some(step),
                Some("Rest".to_string()),
                self.item_name(step + 1).map(NextLabel::PrepareFor),
            ),
            SequencerState::Completed => (None, Some("Namaste".to_string()), None),
            SequencerState::Idle | SequencerState::Aborted => (None, None, None),
        };

        SessionSnapshot {
            state: self.state,
            step_index,
            step_count: self.step_count,
            step_name,
            remaining_seconds,
            total_seconds,
            progress,
            next_label,
        }
    }

    fn item_name(&self, index: usize) -> Option<String> {
        self.queue
            .as_ref()
            .and_then(|q| q.get(index))
            .map(|i| i.name.clone())
    }

    fn on_elapsed(&mut self, now: DateTime<Utc>) -> Vec<Effect> {
        match self.state {
            SequencerState::RunningActive { step } => {
                let Some(is_last) = self.queue.as_ref().map(|q| q.is_last(step)) else {
                    return Vec::new();
                };

                let mut effects = vec![Effect::PlayCue(CueKind::EndOfExercise)];
                if is_last {
                    effects.extend(self.complete(now));
                } else if self.cooldown_seconds > 0 {
                    self.set_state(SequencerState::RunningCooldown { step });
                    let tick = self.countdown.start(self.cooldown_seconds);
                    effects.push(Effect::Tick(tick));
                } else {
                    effects.extend(self.enter_active(step + 1));
                }
                effects
            }
            SequencerState::RunningCooldown { step } => {
                let mut effects = vec![Effect::PlayCue(CueKind::StartOfNext)];
                effects.extend(self.enter_active(step + 1));
                effects
            }
            SequencerState::Idle | SequencerState::Completed | SequencerState::Aborted => {
                Vec::new()
            }
        }
    }

    fn enter_active(&mut self, step: usize) -> Vec<Effect> {
        let Some(duration) = self
            .queue
            .as_ref()
            .and_then(|q| q.get(step))
            .map(|i| i.duration_seconds)
        else {
            return Vec::new();
        };

        self.set_state(SequencerState::RunningActive { step });
        vec![Effect::Tick(self.countdown.start(duration))]
    }

    fn complete(&mut self, now: DateTime<Utc>) -> Vec<Effect> {
        let Some(queue) = self.queue.take() else {
            return Vec::new();
        };
        let entry = SessionLogEntry::for_queue(&queue, now);
        self.set_state(SequencerState::Completed);
        tracing::info!(
            "Session complete: {} exercises, {}s",
            entry.item_names.len(),
            entry.total_duration_seconds
        );

        vec![
            Effect::PlayCue(CueKind::SessionFinish),
            Effect::AppendLog(entry),
            Effect::ReleaseWakeLock,
            Effect::ReturnToIdleAfter(self.grace),
        ]
    }

    fn set_state(&mut self, next: SequencerState) {
        tracing::debug!("Sequencer {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}
