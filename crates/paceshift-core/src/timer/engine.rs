//! Interval timer state machine.
//!
//! The engine is a deterministic state machine: one `tick()` advances the
//! workout by exactly one second. It has no internal thread and no clock --
//! the driver layer (or a test) supplies the cadence.
//!
//! ## State Transitions
//!
//! ```text
//! Idle{Slow|Fast} -> Running{Slow|Fast} <-> Paused{Slow|Fast} -> Completed
//! ```
//!
//! Phase-change cues are anticipatory: a cue for the *next* phase fires once
//! the remaining time crosses the notification lead, so a spoken announcement
//! finishes just as the boundary is crossed. If a tick is lost to scheduler
//! lag the boundary tick itself fires the cue, keeping delivery exactly once
//! per sub-phase.

use tokio::sync::watch;

use super::formula::Formula;
use super::state::{Phase, TimerHooks, TimerState};

/// Longest anticipatory cue lead, in milliseconds.
const MAX_LEAD_MS: u64 = 2500;
/// Shortest lead; sub-phases of a second or two still get a boundary cue.
const MIN_LEAD_MS: u64 = 500;

/// Core timer state machine.
///
/// Owns the published [`TimerState`] snapshot exclusively; hosts observe it
/// through [`subscribe`](Self::subscribe) and command transitions through the
/// public methods. All mutation happens on the caller's thread of control.
pub struct IntervalTimer {
    formula: Formula,
    hooks: Box<dyn TimerHooks>,
    /// Fully completed slow+fast pairs.
    completed_intervals: u32,
    /// Which half of the current interval is active.
    slow_phase: bool,
    /// Public phase identity; must agree with `slow_phase` while running.
    phase: Phase,
    /// Nominal duration of the active sub-phase.
    phase_total_secs: u32,
    time_remaining_secs: u32,
    /// 1-indexed public interval counter; 0 before any tick.
    current_interval: u32,
    /// Seconds accumulated in fully finished sub-phases.
    elapsed_before_secs: u32,
    /// Anticipatory cue already fired for the active countdown.
    notified: bool,
    /// Lead for the armed countdown, derived from its length.
    lead_ms: u64,
    running: bool,
    disposed: bool,
    /// Bumped on every start/stop edge; an in-flight ticker that observes a
    /// stale generation must stop.
    generation: u64,
    state_tx: watch::Sender<TimerState>,
}

impl IntervalTimer {
    /// Create a timer positioned at the formula's opening phase.
    pub fn new(formula: Formula, hooks: impl TimerHooks + 'static) -> Self {
        let slow_phase = !formula.starts_with_fast;
        let phase = if slow_phase { Phase::Slow } else { Phase::Fast };
        let phase_total_secs = if slow_phase {
            formula.slow_secs
        } else {
            formula.fast_secs
        };
        let initial = TimerState {
            current_phase: phase,
            time_remaining_secs: phase_total_secs,
            current_interval: 0,
            total_intervals: formula.total_intervals(),
            is_running: false,
            elapsed_secs: 0,
        };
        let (state_tx, _) = watch::channel(initial);
        Self {
            formula,
            hooks: Box::new(hooks),
            completed_intervals: 0,
            slow_phase,
            phase,
            phase_total_secs,
            time_remaining_secs: phase_total_secs,
            current_interval: 0,
            elapsed_before_secs: 0,
            notified: false,
            lead_ms: 0,
            running: false,
            disposed: false,
            generation: 0,
            state_tx,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state_tx.borrow().clone()
    }

    /// Watch the snapshot stream; the receiver always holds the latest value.
    pub fn subscribe(&self) -> watch::Receiver<TimerState> {
        self.state_tx.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn formula(&self) -> &Formula {
        &self.formula
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    fn elapsed_secs(&self) -> u32 {
        let in_phase = self.phase_total_secs.saturating_sub(self.time_remaining_secs);
        self.elapsed_before_secs
            .saturating_add(in_phase)
            .min(self.formula.total_duration_secs())
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin or resume the countdown.
    ///
    /// A first-ever start announces the opening phase; a resume after
    /// `pause()` stays silent. If the countdown is already exhausted the
    /// timer rewinds to the opening phase and announces it.
    pub fn start(&mut self) {
        if self.disposed || self.running {
            return;
        }
        if self.time_remaining_secs > 0 {
            if self.elapsed_secs() == 0 {
                // First-ever start, never ticked.
                let phase = self.phase;
                self.hooks.on_phase_change(phase);
            }
        } else {
            // Exhausted (natural completion or corrupt snapshot): fresh run.
            self.rewind();
            let phase = self.phase;
            self.hooks.on_phase_change(phase);
        }
        self.arm(self.time_remaining_secs);
        self.running = true;
        self.generation = self.generation.wrapping_add(1);
        tracing::debug!(
            phase = ?self.phase,
            remaining_secs = self.time_remaining_secs,
            "timer started"
        );
        self.publish();
    }

    /// Stop the countdown, keeping position. Resumable via `start()`.
    pub fn pause(&mut self) {
        if self.disposed || !self.running {
            return;
        }
        self.generation = self.generation.wrapping_add(1);
        self.running = false;
        tracing::debug!(remaining_secs = self.time_remaining_secs, "timer paused");
        self.publish();
    }

    /// Cancel the countdown and rewind to the opening phase.
    ///
    /// Unlike a pause/resume cycle this always re-announces the opening
    /// phase.
    pub fn reset(&mut self) {
        if self.disposed {
            return;
        }
        self.generation = self.generation.wrapping_add(1);
        self.running = false;
        self.rewind();
        tracing::debug!("timer reset");
        self.publish();
        let phase = self.phase;
        self.hooks.on_phase_change(phase);
    }

    /// Reconstruct position from an externally persisted snapshot.
    ///
    /// Back-derives the interval bookkeeping from the four scalars, announces
    /// the restored phase, and resumes ticking when the snapshot was taken
    /// mid-run. Assumes a coherent snapshot (e.g. `current_interval` of zero
    /// with a `Fast` phase is a host bug and handled best-effort only).
    pub fn restore_state(
        &mut self,
        time_remaining_secs: u32,
        current_interval: u32,
        phase: Phase,
        is_running: bool,
    ) {
        if self.disposed {
            return;
        }
        self.generation = self.generation.wrapping_add(1);
        self.running = false;
        let total = self.formula.total_duration_secs();
        match phase {
            Phase::Completed => {
                self.slow_phase = false;
                self.phase = Phase::Completed;
                self.completed_intervals = self.formula.total_intervals();
                self.phase_total_secs = 0;
                self.time_remaining_secs = 0;
                self.elapsed_before_secs = total;
                self.current_interval = current_interval;
                self.notified = true;
            }
            Phase::Slow | Phase::Fast => {
                self.slow_phase = phase == Phase::Slow;
                self.phase = phase;
                self.phase_total_secs = if self.slow_phase {
                    self.formula.slow_secs
                } else {
                    self.formula.fast_secs
                };
                self.time_remaining_secs = time_remaining_secs;
                // Mid-slow the current interval is still open; mid-fast the
                // snapshot's interval counts as done.
                let done = if self.slow_phase {
                    current_interval.saturating_sub(1)
                } else {
                    current_interval
                };
                self.completed_intervals = done;
                self.elapsed_before_secs = done
                    .saturating_mul(self.formula.slow_secs + self.formula.fast_secs)
                    .min(total);
                self.current_interval = current_interval;
                self.notified = false;
            }
        }
        tracing::debug!(
            ?phase,
            remaining_secs = self.time_remaining_secs,
            interval = self.current_interval,
            resume = is_running,
            "timer state restored"
        );
        self.publish();
        // Restoration always re-announces, even mid-run.
        self.hooks.on_phase_change(phase);
        if is_running && self.time_remaining_secs > 0 {
            self.arm(self.time_remaining_secs);
            self.running = true;
            self.generation = self.generation.wrapping_add(1);
            self.publish();
        }
    }

    /// Cancel the countdown for good. Idempotent; the last published
    /// snapshot is left untouched.
    pub fn dispose(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.disposed = true;
    }

    /// Advance the workout by one second. No-op unless running.
    pub fn tick(&mut self) {
        if self.disposed || !self.running || self.time_remaining_secs == 0 {
            return;
        }
        self.time_remaining_secs -= 1;
        self.current_interval = self.completed_intervals + 1;
        if !self.notified && u64::from(self.time_remaining_secs) * 1000 <= self.lead_ms {
            self.notified = true;
            let next = self.upcoming_phase();
            self.hooks.on_phase_change(next);
        }
        if self.time_remaining_secs == 0 {
            self.finish_phase();
        }
        self.publish();
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// The phase the workout is heading into, needed ahead of the actual
    /// transition so the anticipatory cue names the right one.
    fn upcoming_phase(&self) -> Phase {
        if self.slow_phase {
            Phase::Fast
        } else if self.completed_intervals + 1 >= self.formula.total_intervals() {
            Phase::Completed
        } else {
            Phase::Slow
        }
    }

    fn finish_phase(&mut self) {
        let total = self.formula.total_duration_secs();
        self.elapsed_before_secs = self
            .elapsed_before_secs
            .saturating_add(self.phase_total_secs)
            .min(total);
        if self.slow_phase {
            self.slow_phase = false;
            self.begin_phase();
        } else {
            self.completed_intervals += 1;
            self.hooks.on_interval_complete();
            if self.completed_intervals >= self.formula.total_intervals() {
                self.complete();
            } else {
                self.slow_phase = true;
                self.begin_phase();
            }
        }
    }

    /// Open the next sub-phase: fresh countdown, fresh cue guard.
    fn begin_phase(&mut self) {
        self.phase = if self.slow_phase {
            Phase::Slow
        } else {
            Phase::Fast
        };
        self.phase_total_secs = if self.slow_phase {
            self.formula.slow_secs
        } else {
            self.formula.fast_secs
        };
        self.time_remaining_secs = self.phase_total_secs;
        self.current_interval = self.completed_intervals + 1;
        self.notified = false;
        self.arm(self.phase_total_secs);
        tracing::debug!(
            phase = ?self.phase,
            interval = self.current_interval,
            duration_secs = self.phase_total_secs,
            "sub-phase started"
        );
    }

    fn complete(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.running = false;
        self.phase = Phase::Completed;
        self.phase_total_secs = 0;
        self.time_remaining_secs = 0;
        self.elapsed_before_secs = self.formula.total_duration_secs();
        self.current_interval = self.formula.total_intervals();
        tracing::debug!(
            elapsed_secs = self.elapsed_before_secs,
            "workout completed"
        );
    }

    fn rewind(&mut self) {
        self.completed_intervals = 0;
        self.elapsed_before_secs = 0;
        self.current_interval = 0;
        self.slow_phase = !self.formula.starts_with_fast;
        self.phase = if self.slow_phase {
            Phase::Slow
        } else {
            Phase::Fast
        };
        self.phase_total_secs = if self.slow_phase {
            self.formula.slow_secs
        } else {
            self.formula.fast_secs
        };
        self.time_remaining_secs = self.phase_total_secs;
        self.notified = false;
    }

    /// Arm the cue lead for a countdown of `countdown_secs`. The lead is
    /// derived from the countdown actually being run -- a resume arms the
    /// remaining time, not the nominal phase duration.
    fn arm(&mut self, countdown_secs: u32) {
        let lead = u64::from(countdown_secs.saturating_sub(1)) * 1000;
        self.lead_ms = lead.min(MAX_LEAD_MS).max(MIN_LEAD_MS);
    }

    fn publish(&self) {
        self.state_tx.send_replace(TimerState {
            current_phase: self.phase,
            time_remaining_secs: self.time_remaining_secs,
            current_interval: self.current_interval,
            total_intervals: self.formula.total_intervals(),
            is_running: self.running,
            elapsed_secs: self.elapsed_secs(),
        });
    }
}
