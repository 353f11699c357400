//! Terminal cue player and systemd-based wake lock.

use breath_core::{CueKind, CuePlayer, Error, NoWakeLock, Result, SilentCues, WakeLock};
use std::io::{IsTerminal, Write};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// How long a fresh inhibitor gets to fail before it counts as held
const INHIBIT_STARTUP: Duration = Duration::from_millis(50);

/// Rings the terminal bell: one ring to end an exercise, two to start the
/// next, three to finish the session
#[derive(Debug, Default)]
pub struct TerminalBell;

impl CuePlayer for TerminalBell {
    fn init(&mut self) -> Result<()> {
        if !std::io::stdout().is_terminal() {
            return Err(Error::ResourceAcquisition(
                "stdout is not a terminal".into(),
            ));
        }
        Ok(())
    }

    fn play(&mut self, cue: CueKind) {
        let rings = match cue {
            CueKind::EndOfExercise => 1,
            CueKind::StartOfNext => 2,
            CueKind::SessionFinish => 3,
        };
        let mut out = std::io::stdout();
        let _ = out.write_all("\x07".repeat(rings).as_bytes());
        let _ = out.flush();
    }
}

pub enum Cues {
    Bell(TerminalBell),
    Silent(SilentCues),
}

impl Cues {
    pub fn new(enabled: bool) -> Self {
        if enabled {
            Cues::Bell(TerminalBell)
        } else {
            Cues::Silent(SilentCues)
        }
    }
}

impl CuePlayer for Cues {
    fn init(&mut self) -> Result<()> {
        match self {
            Cues::Bell(bell) => bell.init(),
            Cues::Silent(silent) => silent.init(),
        }
    }

    fn play(&mut self, cue: CueKind) {
        match self {
            Cues::Bell(bell) => bell.play(cue),
            Cues::Silent(silent) => silent.play(cue),
        }
    }
}

/// Holds an idle/sleep inhibitor via `systemd-inhibit` for as long as the
/// child process lives
#[derive(Debug, Default)]
pub struct SystemdInhibit;

impl WakeLock for SystemdInhibit {
    type Handle = Child;

    fn acquire(&mut self) -> Result<Child> {
        let mut child = Command::new("systemd-inhibit")
            .args([
                "--what=idle:sleep",
                "--who=breathe",
                "--why=Breathing session in progress",
                "--mode=block",
                "sleep",
                "infinity",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::ResourceAcquisition(format!("systemd-inhibit: {}", e)))?;

        // An inhibitor that could not reach logind exits right away
        ensure_running(&mut child, INHIBIT_STARTUP)?;

        tracing::debug!("Acquired wake lock (pid {})", child.id());
        Ok(child)
    }

    fn release(&mut self, mut handle: Child) {
        if let Err(e) = handle.kill() {
            tracing::debug!("Wake lock process already gone: {}", e);
        }
        let _ = handle.wait();
        tracing::debug!("Released wake lock");
    }
}

/// Polls `child` for `window`; an exit inside it is an acquisition failure
fn ensure_running(child: &mut Child, window: Duration) -> Result<()> {
    let deadline = Instant::now() + window;
    loop {
        if let Some(status) = child.try_wait()? {
            return Err(Error::ResourceAcquisition(format!(
                "systemd-inhibit exited with {}",
                status
            )));
        }
        if Instant::now() >= deadline {
            return Ok(());
        }
        thread::sleep(Duration::from_millis(10));
    }
}

pub enum Inhibitor {
    Systemd(SystemdInhibit),
    Off(NoWakeLock),
}

impl Inhibitor {
    pub fn new(enabled: bool) -> Self {
        if enabled {
            Inhibitor::Systemd(SystemdInhibit)
        } else {
            Inhibitor::Off(NoWakeLock)
        }
    }
}

impl WakeLock for Inhibitor {
    type Handle = Option<Child>;

    fn acquire(&mut self) -> Result<Option<Child>> {
        match self {
            Inhibitor::Systemd(lock) => lock.acquire().map(Some),
            Inhibitor::Off(lock) => lock.acquire().map(|()| None),
        }
    }

    fn release(&mut self, handle: Option<Child>) {
        match (self, handle) {
            (Inhibitor::Systemd(lock), Some(child)) => lock.release(child),
            (Inhibitor::Off(lock), _) => lock.release(()),
            (Inhibitor::Systemd(_), None) => {}
        }
    }
}
