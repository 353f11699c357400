//! One-second countdown engine.
//!
//! The countdown has no internal thread. The owner calls [`Countdown::tick`]
//! once per elapsed second and reacts to the returned event.
//!
//! ```text
//! start(3) -> Tick 3/3
//! tick()   -> Tick 2/3
//! tick()   -> Tick 1/3
//! tick()   -> Elapsed
//! tick()   -> None
//! ```

/// Snapshot of a running countdown, emitted on start and on every tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tick {
    /// Seconds left, never below zero
    pub remaining: u32,
    pub total: u32,
}

impl Tick {
    /// Fraction of the phase still to go, within `0.0..=1.0`
    pub fn progress(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.remaining as f64 / self.total as f64).clamp(0.0, 1.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerEvent {
    Tick(Tick),
    /// The run reached zero. Produced once per run.
    Elapsed,
}

#[derive(Clone, Copy, Debug)]
struct Run {
    remaining: i64,
    total: u32,
}

/// Countdown that runs at most one timer at a time
#[derive(Clone, Debug, Default)]
pub struct Countdown {
    run: Option<Run>,
}

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin counting down from `total` seconds.
    ///
    /// Any run already in flight is dropped without producing `Elapsed`.
    pub fn start(&mut self, total: u32) -> Tick {
        if self.run.is_some() {
            tracing::debug!("Countdown restarted while running; previous run discarded");
        }
        self.run = Some(Run {
            remaining: i64::from(total),
            total,
        });
        Tick {
            remaining: total,
            total,
        }
    }

    /// Advance by one second
    pub fn tick(&mut self) -> Option<TimerEvent> {
        let run = self.run.as_mut()?;
        run.remaining -= 1;

        if run.remaining <= 0 {
            self.run = None;
            return Some(TimerEvent::Elapsed);
        }

        Some(TimerEvent::Tick(Tick {
            remaining: clamp_remaining(run.remaining),
            total: run.total,
        }))
    }

    /// Stop the current run. A cancelled run never elapses.
    pub fn cancel(&mut self) {
        self.run = None;
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// Current state, or `None` when idle
    pub fn current(&self) -> Option<Tick> {
        self.run.map(|r| Tick {
            remaining: clamp_remaining(r.remaining),
            total: r.total,
        })
    }
}

fn clamp_remaining(remaining: i64) -> u32 {
    u32::try_from(remaining.max(0)).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_to_completion(countdown: &mut Countdown) -> (Vec<u32>, usize) {
        let mut seen = Vec::new();
        let mut elapsed = 0;
        for _ in 0..100 {
            match countdown.tick() {
                Some(TimerEvent::Tick(t)) => seen.push(t.remaining),
                Some(TimerEvent::Elapsed) => elapsed += 1,
                None => break,
            }
        }
        (seen, elapsed)
    }

    #[test]
    fn test_start_reports_full_duration() {
        let mut countdown = Countdown::new();
        let tick = countdown.start(5);
        assert_eq!(tick, Tick { remaining: 5, total: 5 });
        assert_eq!(tick.progress(), 1.0);
    }

    #[test]
    fn test_elapses_exactly_once_after_duration_ticks() {
        let mut countdown = Countdown::new();
        countdown.start(3);
        assert_eq!(countdown.tick(), Some(TimerEvent::Tick(Tick { remaining: 2, total: 3 })));
        assert_eq!(countdown.tick(), Some(TimerEvent::Tick(Tick { remaining: 1, total: 3 })));
        assert_eq!(countdown.tick(), Some(TimerEvent::Elapsed));
        assert_eq!(countdown.tick(), None);
        assert!(!countdown.is_running());
    }

    #[test]
    fn test_zero_duration_elapses_on_first_tick() {
        let mut countdown = Countdown::new();
        let tick = countdown.start(0);
        assert_eq!(tick.progress(), 0.0);
        assert_eq!(countdown.tick(), Some(TimerEvent::Elapsed));
        assert_eq!(countdown.tick(), None);
    }

    #[test]
    fn test_cancel_prevents_elapse() {
        let mut countdown = Countdown::new();
        countdown.start(2);
        countdown.tick();
        countdown.cancel();
        let (ticks, elapsed) = run_to_completion(&mut countdown);
        assert!(ticks.is_empty());
        assert_eq!(elapsed, 0);
    }

    #[test]
    fn test_restart_replaces_in_flight_run() {
        let mut countdown = Countdown::new();
        countdown.start(2);
        countdown.tick();
        countdown.start(4);
        let (ticks, elapsed) = run_to_completion(&mut countdown);
        assert_eq!(ticks, vec![3, 2, 1]);
        assert_eq!(elapsed, 1);
    }

    #[test]
    fn test_progress_is_clamped() {
        assert_eq!(Tick { remaining: 10, total: 5 }.progress(), 1.0);
        assert_eq!(Tick { remaining: 1, total: 4 }.progress(), 0.25);
        assert_eq!(clamp_remaining(-3), 0);
    }
}
