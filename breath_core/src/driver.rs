//! Session dispatcher.
//!
//! Forwards commands to the [`Sequencer`] and carries out the effects it
//! returns against the cue player, wake lock and history. All mutation goes
//! through one `&mut SessionDriver`, so callers that tick from another
//! thread must funnel commands to the owning thread.

use crate::ports::{CuePlayer, WakeLock};
use crate::sequencer::{Effect, SessionSnapshot, Sequencer, SequencerState};
use crate::wal::HistorySink;
use crate::{Catalog, HistoryStore, Result};
use chrono::{DateTime, Utc};

pub struct SessionDriver<C: CuePlayer, W: WakeLock, S: HistorySink> {
    sequencer: Sequencer,
    history: HistoryStore,
    cues: C,
    audio_ready: bool,
    wake_lock: W,
    held: Option<W::Handle>,
    sink: S,
    log_saved: bool,
}

impl<C: CuePlayer, W: WakeLock, S: HistorySink> SessionDriver<C, W, S> {
    pub fn new(sequencer: Sequencer, history: HistoryStore, cues: C, wake_lock: W, sink: S) -> Self {
        Self {
            sequencer,
            history,
            cues,
            audio_ready: false,
            wake_lock,
            held: None,
            sink,
            log_saved: false,
        }
    }

    /// Start a session; see [`Sequencer::start`]
    pub fn start(&mut self, catalog: &Catalog, cooldown_seconds: i64) -> Result<Vec<Effect>> {
        let effects = self.sequencer.start(catalog, cooldown_seconds)?;
        self.log_saved = false;
        Ok(self.apply(effects))
    }

    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<Effect> {
        let effects = self.sequencer.tick(now);
        self.apply(effects)
    }

    pub fn stop(&mut self) -> Vec<Effect> {
        let effects = self.sequencer.stop();
        self.apply(effects)
    }

    pub fn return_to_idle(&mut self) {
        self.sequencer.return_to_idle();
    }

    /// Wipe the history in memory and on disk
    pub fn clear_history(&mut self) -> Result<()> {
        self.history.clear(&mut self.sink)
    }

    pub fn state(&self) -> SequencerState {
        self.sequencer.state()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.sequencer.snapshot()
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn cues(&self) -> &C {
        &self.cues
    }

    pub fn wake_lock(&self) -> &W {
        &self.wake_lock
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Whether the last completed session reached the history sink
    pub fn log_saved(&self) -> bool {
        self.log_saved
    }

    pub fn holds_wake_lock(&self) -> bool {
        self.held.is_some()
    }

    fn apply(&mut self, effects: Vec<Effect>) -> Vec<Effect> {
        for effect in &effects {
            match effect {
                Effect::InitAudio => {
                    self.audio_ready = match self.cues.init() {
                        Ok(()) => true,
                        Err(e) => {
                            tracing::warn!("Audio unavailable, continuing without cues: {}", e);
                            false
                        }
                    };
                }
                Effect::AcquireWakeLock => {
                    self.release_wake_lock();
                    match self.wake_lock.acquire() {
                        Ok(handle) => self.held = Some(handle),
                        Err(e) => tracing::warn!("Wake lock failed: {}", e),
                    }
                }
                Effect::ReleaseWakeLock => self.release_wake_lock(),
                Effect::PlayCue(kind) => {
                    if self.audio_ready {
                        self.cues.play(*kind);
                    }
                }
                Effect::AppendLog(entry) => {
                    match self.history.append(entry.clone(), &mut self.sink) {
                        Ok(()) => self.log_saved = true,
                        Err(e) => {
                            tracing::error!("Failed to persist session {}: {}", entry.id, e)
                        }
                    }
                }
                Effect::Tick(_) | Effect::ReturnToIdleAfter(_) => {}
            }
        }
        effects
    }

    fn release_wake_lock(&mut self) {
        if let Some(handle) = self.held.take() {
            self.wake_lock.release(handle);
        }
    }
}
