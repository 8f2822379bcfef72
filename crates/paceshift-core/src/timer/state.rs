use serde::{Deserialize, Serialize};

/// The sub-phase a workout is in. `Completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Slow,
    Fast,
    Completed,
}

/// Externally observable timer snapshot.
///
/// Replaced wholesale on every tick, transition, pause, reset, or restore;
/// observers only ever see a complete, consistent value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub current_phase: Phase,
    /// Countdown within the current sub-phase.
    pub time_remaining_secs: u32,
    /// 1-indexed once the workout has ticked; 0 before any tick.
    pub current_interval: u32,
    pub total_intervals: u32,
    pub is_running: bool,
    /// Monotonically non-decreasing within a run, clamped to the formula's
    /// total duration.
    pub elapsed_secs: u32,
}

/// Notification port consumed by the timer engine.
///
/// Both methods are called synchronously from inside the tick and must
/// return quickly; delivery is fire-and-forget. The engine never awaits a
/// result and never retries -- whether a cue is spoken, buzzed, or dropped
/// is the receiver's business.
pub trait TimerHooks: Send {
    /// The phase is about to change (anticipatory -- fired slightly ahead of
    /// the boundary so a spoken cue can finish as the phase flips), or a
    /// fresh/reset/restored phase is being announced.
    fn on_phase_change(&mut self, phase: Phase);

    /// One full slow+fast pair just finished.
    fn on_interval_complete(&mut self);
}

/// Hooks that ignore every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHooks;

impl TimerHooks for NullHooks {
    fn on_phase_change(&mut self, _phase: Phase) {}
    fn on_interval_complete(&mut self) {}
}

/// The four scalars a host persists across process death.
///
/// Feed a stored value back through
/// [`IntervalTimer::restore_state`](crate::IntervalTimer::restore_state)
/// to pick a workout back up after a restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedTimer {
    pub time_remaining_secs: u32,
    pub current_interval: u32,
    pub phase: Phase,
    pub is_running: bool,
}

impl From<&TimerState> for SavedTimer {
    fn from(state: &TimerState) -> Self {
        Self {
            time_remaining_secs: state.time_remaining_secs,
            current_interval: state.current_interval,
            phase: state.current_phase,
            is_running: state.is_running,
        }
    }
}
