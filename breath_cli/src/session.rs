//! Live session loop.
//!
//! The driver is owned by this thread. A ticker thread and a stdin reader
//! feed it through one channel so every state change happens in order.

use crate::render::SessionView;
use breath_core::{
    Catalog, CuePlayer, Effect, HistorySink, Result, SequencerState, SessionDriver, WakeLock,
};
use chrono::Utc;
use std::io::BufRead;
use std::sync::mpsc::{channel, Sender};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug)]
enum Message {
    Tick,
    Stop,
}

/// How a session ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Stopped,
}

pub fn run<C, W, S>(
    driver: &mut SessionDriver<C, W, S>,
    catalog: &Catalog,
    cooldown_seconds: i64,
    tick: Duration,
) -> Result<Outcome>
where
    C: CuePlayer,
    W: WakeLock,
    S: HistorySink,
{
    driver.start(catalog, cooldown_seconds)?;

    let (tx, rx) = channel::<Message>();
    spawn_ticker(tx.clone(), tick);
    spawn_stdin_listener(tx);

    let mut view = SessionView::for_stdout();
    view.render(&driver.snapshot());

    let mut outcome = Outcome::Stopped;
    for message in rx {
        let effects = match message {
            Message::Tick => driver.tick(Utc::now()),
            Message::Stop => driver.stop(),
        };

        let state = driver.state();
        if state != SequencerState::Aborted {
            view.render(&driver.snapshot());
        }

        let grace = effects.iter().find_map(|e| match e {
            Effect::ReturnToIdleAfter(d) => Some(*d),
            _ => None,
        });
        if let Some(grace) = grace {
            view.finish_line();
            if state == SequencerState::Completed {
                outcome = Outcome::Completed;
            }
            thread::sleep(grace);
            driver.return_to_idle();
            break;
        }
    }

    Ok(outcome)
}

/// Sends a tick every `period`, scheduled against a fixed start so the
/// session doesn't drift
fn spawn_ticker(tx: Sender<Message>, period: Duration) {
    thread::spawn(move || {
        let mut next = Instant::now();
        loop {
            next += period;
            thread::sleep(next.saturating_duration_since(Instant::now()));
            if tx.send(Message::Tick).is_err() {
                break;
            }
        }
    });
}

/// `q` + Enter stops the session. EOF only ends the listener.
fn spawn_stdin_listener(tx: Sender<Message>) {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if matches!(line.trim().to_lowercase().as_str(), "q" | "quit" | "stop") {
                let _ = tx.send(Message::Stop);
                break;
            }
        }
    });
}
