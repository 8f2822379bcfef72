//! # Paceshift Core Library
//!
//! Core business logic for Paceshift, a two-phase (slow/fast) interval
//! walking timer. It implements a CLI-first philosophy: every operation is
//! available through the standalone `paceshift` binary, and any GUI front end
//! is expected to be a thin layer over this same library.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a deterministic state machine advanced one second per
//!   `tick()`; the async driver layer supplies the one-second cadence
//! - **Storage**: SQLite-based workout history and TOML-based configuration
//! - **Notification Port**: phase-change and interval-complete cues are
//!   delivered through the [`TimerHooks`] trait; rendering (speech,
//!   vibration, terminal output) is the host's concern
//!
//! ## Key Components
//!
//! - [`IntervalTimer`]: the timer state machine
//! - [`WorkoutTimer`]: async driver that ticks an [`IntervalTimer`] once a second
//! - [`Formula`]: immutable description of a training pattern
//! - [`Database`]: workout history and statistics persistence
//! - [`Config`]: application configuration management

pub mod error;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use storage::{Config, Database, WorkoutRecord, WorkoutStats};
pub use timer::{
    Formula, IntervalTimer, NullHooks, PatternKind, Phase, SavedTimer, TimerHooks, TimerState,
    WorkoutTimer,
};
