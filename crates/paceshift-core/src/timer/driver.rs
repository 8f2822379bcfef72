//! Async driver for the interval timer.
//!
//! [`IntervalTimer`] is a pure state machine; this layer gives it the
//! one-second cadence. A tokio task ticks the engine while it runs and
//! retires itself the moment the engine's generation moves on, so
//! `pause`/`reset`/`dispose` cancel ticking immediately with no drain and a
//! quick pause/start cycle can never leave two tickers racing.
//!
//! Must be used from within a tokio runtime.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};

use super::engine::IntervalTimer;
use super::formula::Formula;
use super::state::{SavedTimer, TimerHooks, TimerState};

/// A ticking workout: an [`IntervalTimer`] plus its one-second tick source.
///
/// Commands are for the host side of the boundary. Hooks run inline with the
/// tick and must stay fire-and-forget -- a hook that calls back into the
/// same `WorkoutTimer` would block the tick it is running on.
pub struct WorkoutTimer {
    engine: Arc<Mutex<IntervalTimer>>,
}

impl WorkoutTimer {
    pub fn new(formula: Formula, hooks: impl TimerHooks + 'static) -> Self {
        Self {
            engine: Arc::new(Mutex::new(IntervalTimer::new(formula, hooks))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, IntervalTimer> {
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> TimerState {
        self.lock().state()
    }

    /// Watch the snapshot stream; the receiver always holds the latest value.
    pub fn subscribe(&self) -> watch::Receiver<TimerState> {
        self.lock().subscribe()
    }

    /// Begin or resume the countdown and spawn the ticker for it.
    pub fn start(&self) {
        let generation = {
            let mut engine = self.lock();
            engine.start();
            if !engine.is_running() {
                return;
            }
            engine.generation()
        };
        self.spawn_ticker(generation);
    }

    pub fn pause(&self) {
        self.lock().pause();
    }

    pub fn reset(&self) {
        self.lock().reset();
    }

    /// Restore from a persisted snapshot; resumes ticking when the snapshot
    /// was taken mid-run.
    pub fn restore_state(&self, saved: SavedTimer) {
        let generation = {
            let mut engine = self.lock();
            engine.restore_state(
                saved.time_remaining_secs,
                saved.current_interval,
                saved.phase,
                saved.is_running,
            );
            if !engine.is_running() {
                return;
            }
            engine.generation()
        };
        self.spawn_ticker(generation);
    }

    pub fn dispose(&self) {
        self.lock().dispose();
    }

    fn spawn_ticker(&self, generation: u64) {
        let engine = Arc::clone(&self.engine);
        tokio::spawn(async move {
            let mut ticks = time::interval(Duration::from_secs(1));
            // Catch up after scheduler lag; the engine's cue failsafe covers
            // the late ticks.
            ticks.set_missed_tick_behavior(MissedTickBehavior::Burst);
            ticks.tick().await; // first tick resolves immediately
            loop {
                ticks.tick().await;
                let mut engine = engine.lock().unwrap_or_else(PoisonError::into_inner);
                if engine.generation() != generation || !engine.is_running() {
                    break;
                }
                engine.tick();
            }
            tracing::debug!(generation, "ticker retired");
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::formula::PatternKind;
    use crate::timer::state::{NullHooks, Phase};

    fn formula(slow: u32, fast: u32, rounds: u32) -> Formula {
        Formula::new("Test", PatternKind::Interval, slow, fast, rounds, false).unwrap()
    }

    async fn wait_for_completion(rx: &mut watch::Receiver<TimerState>) {
        loop {
            rx.changed().await.expect("timer dropped");
            if rx.borrow().current_phase == Phase::Completed {
                return;
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn drives_a_workout_to_completion() {
        let timer = WorkoutTimer::new(formula(2, 1, 1), NullHooks);
        let mut rx = timer.subscribe();
        timer.start();
        time::timeout(Duration::from_secs(60), wait_for_completion(&mut rx))
            .await
            .expect("workout should complete");
        let s = timer.state();
        assert_eq!(s.elapsed_secs, 3);
        assert!(!s.is_running);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_stops_ticking_immediately() {
        let timer = WorkoutTimer::new(formula(5, 5, 1), NullHooks);
        timer.start();
        time::sleep(Duration::from_millis(2500)).await;
        timer.pause();
        let frozen = timer.state().time_remaining_secs;
        assert_eq!(frozen, 3);
        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(timer.state().time_remaining_secs, frozen);
        assert!(!timer.state().is_running);
    }

    #[tokio::test(start_paused = true)]
    async fn quick_pause_start_cycle_keeps_a_single_cadence() {
        let timer = WorkoutTimer::new(formula(10, 5, 1), NullHooks);
        timer.start();
        time::sleep(Duration::from_millis(2500)).await;
        timer.pause();
        timer.start();
        // A stale ticker alongside the new one would double the rate.
        time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(timer.state().time_remaining_secs, 10 - 2 - 3);
    }

    #[tokio::test(start_paused = true)]
    async fn restore_running_snapshot_resumes_ticking() {
        let timer = WorkoutTimer::new(formula(3, 2, 1), NullHooks);
        let mut rx = timer.subscribe();
        timer.restore_state(SavedTimer {
            time_remaining_secs: 1,
            current_interval: 1,
            phase: Phase::Fast,
            is_running: true,
        });
        time::timeout(Duration::from_secs(60), wait_for_completion(&mut rx))
            .await
            .expect("restored workout should complete");
    }

    #[tokio::test(start_paused = true)]
    async fn dispose_retires_the_ticker() {
        let timer = WorkoutTimer::new(formula(5, 5, 1), NullHooks);
        timer.start();
        time::sleep(Duration::from_millis(1500)).await;
        let last = timer.state();
        timer.dispose();
        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(timer.state(), last);
    }
}
