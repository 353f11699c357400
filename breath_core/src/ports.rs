//! Boundaries to platform services the session calls into.

use crate::{CueKind, Result};

/// Audible phase cues. Playback is fire-and-forget.
pub trait CuePlayer {
    /// Prepare the output device. Called once per session start.
    fn init(&mut self) -> Result<()>;
    fn play(&mut self, cue: CueKind);
}

/// Keeps the machine awake while a session runs
pub trait WakeLock {
    type Handle;

    fn acquire(&mut self) -> Result<Self::Handle>;
    fn release(&mut self, handle: Self::Handle);
}

/// Cue player that makes no sound
#[derive(Debug, Default)]
pub struct SilentCues;

impl CuePlayer for SilentCues {
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    fn play(&mut self, _cue: CueKind) {}
}

/// Wake lock that holds nothing
#[derive(Debug, Default)]
pub struct NoWakeLock;

impl WakeLock for NoWakeLock {
    type Handle = ();

    fn acquire(&mut self) -> Result<()> {
        Ok(())
    }

    fn release(&mut self, _handle: ()) {}
}
