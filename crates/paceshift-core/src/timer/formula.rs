use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Phase durations are user-configurable within 1 second .. 1 hour.
pub const MIN_PHASE_SECS: u32 = 1;
pub const MAX_PHASE_SECS: u32 = 3600;

/// How a formula's rounds map onto the slow/fast alternation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    /// One round = one slow+fast pair.
    Interval,
    /// One circuit = two slow+fast pairs; rounds count double.
    Circuit,
}

/// Immutable description of a training pattern.
///
/// A formula never changes once built; everything the timer needs is either
/// stored here or derived on demand, so the derived values can never drift
/// out of sync with the inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formula {
    pub name: String,
    pub kind: PatternKind,
    /// Slow sub-phase duration in seconds.
    pub slow_secs: u32,
    /// Fast sub-phase duration in seconds.
    pub fast_secs: u32,
    /// User-facing round count. See [`Formula::total_intervals`].
    pub rounds: u32,
    /// Whether interval 1 opens with the fast sub-phase.
    #[serde(default)]
    pub starts_with_fast: bool,
}

impl Formula {
    /// Build a validated formula.
    ///
    /// # Errors
    /// Returns an error if either phase duration falls outside
    /// `1..=3600` seconds, `rounds` is zero, or `name` is empty.
    pub fn new(
        name: impl Into<String>,
        kind: PatternKind,
        slow_secs: u32,
        fast_secs: u32,
        rounds: u32,
        starts_with_fast: bool,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        for (phase, secs) in [("slow", slow_secs), ("fast", fast_secs)] {
            if !(MIN_PHASE_SECS..=MAX_PHASE_SECS).contains(&secs) {
                return Err(ValidationError::DurationOutOfRange { phase, secs });
            }
        }
        if rounds == 0 {
            return Err(ValidationError::ZeroRounds);
        }
        Ok(Self {
            name,
            kind,
            slow_secs,
            fast_secs,
            rounds,
            starts_with_fast,
        })
    }

    /// Engine-facing interval count: a circuit round drives two slow/fast
    /// alternations, an interval round drives one.
    pub fn total_intervals(&self) -> u32 {
        match self.kind {
            PatternKind::Interval => self.rounds,
            PatternKind::Circuit => self.rounds.saturating_mul(2),
        }
    }

    /// Total workout length. Always recomputed from the inputs.
    pub fn total_duration_secs(&self) -> u32 {
        (self.slow_secs + self.fast_secs).saturating_mul(self.total_intervals())
    }

    /// Duration key used when recording a completed workout:
    /// whole minutes, floor-rounded, never less than one.
    pub fn session_minutes(&self) -> u32 {
        (self.total_duration_secs() / 60).max(1)
    }

    // ── Presets ──────────────────────────────────────────────────────

    /// The classic interval walk: 3 minutes slow, 3 minutes fast, 5 rounds.
    pub fn classic() -> Self {
        Self {
            name: "Classic Walk".into(),
            kind: PatternKind::Interval,
            slow_secs: 180,
            fast_secs: 180,
            rounds: 5,
            starts_with_fast: false,
        }
    }

    /// Shorter starter pattern for new walkers.
    pub fn starter() -> Self {
        Self {
            name: "Starter Walk".into(),
            kind: PatternKind::Interval,
            slow_secs: 120,
            fast_secs: 60,
            rounds: 6,
            starts_with_fast: false,
        }
    }

    /// Circuit session: opens fast, each circuit counts as two intervals.
    pub fn circuit() -> Self {
        Self {
            name: "Circuit Session".into(),
            kind: PatternKind::Circuit,
            slow_secs: 90,
            fast_secs: 45,
            rounds: 3,
            starts_with_fast: true,
        }
    }

    /// All built-in presets.
    pub fn presets() -> Vec<Self> {
        vec![Self::classic(), Self::starter(), Self::circuit()]
    }
}

impl Default for Formula {
    fn default() -> Self {
        Self::classic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_accepts_valid_input() {
        let f = Formula::new("Walk", PatternKind::Interval, 180, 120, 4, false).unwrap();
        assert_eq!(f.total_intervals(), 4);
        assert_eq!(f.total_duration_secs(), 4 * 300);
    }

    #[test]
    fn new_rejects_out_of_range_durations() {
        assert_eq!(
            Formula::new("Walk", PatternKind::Interval, 0, 120, 4, false),
            Err(ValidationError::DurationOutOfRange {
                phase: "slow",
                secs: 0
            })
        );
        assert_eq!(
            Formula::new("Walk", PatternKind::Interval, 180, 3601, 4, false),
            Err(ValidationError::DurationOutOfRange {
                phase: "fast",
                secs: 3601
            })
        );
    }

    #[test]
    fn new_rejects_zero_rounds_and_empty_name() {
        assert_eq!(
            Formula::new("Walk", PatternKind::Interval, 180, 120, 0, false),
            Err(ValidationError::ZeroRounds)
        );
        assert_eq!(
            Formula::new("  ", PatternKind::Interval, 180, 120, 4, false),
            Err(ValidationError::EmptyName)
        );
    }

    #[test]
    fn circuit_rounds_count_double() {
        let f = Formula::circuit();
        assert_eq!(f.rounds, 3);
        assert_eq!(f.total_intervals(), 6);
        assert_eq!(f.total_duration_secs(), (90 + 45) * 6);
    }

    #[test]
    fn session_minutes_floors_with_minimum_one() {
        let f = Formula::new("Tiny", PatternKind::Interval, 10, 9, 1, false).unwrap();
        assert_eq!(f.total_duration_secs(), 19);
        assert_eq!(f.session_minutes(), 1);

        let f = Formula::new("Odd", PatternKind::Interval, 100, 50, 1, false).unwrap();
        assert_eq!(f.total_duration_secs(), 150);
        assert_eq!(f.session_minutes(), 2);

        assert_eq!(Formula::classic().session_minutes(), 30);
    }

    #[test]
    fn default_is_classic() {
        assert_eq!(Formula::default(), Formula::classic());
    }
}
