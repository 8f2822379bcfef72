mod driver;
mod engine;
mod formula;
mod state;

pub use driver::WorkoutTimer;
pub use engine::IntervalTimer;
pub use formula::{Formula, PatternKind};
pub use state::{NullHooks, Phase, SavedTimer, TimerHooks, TimerState};
