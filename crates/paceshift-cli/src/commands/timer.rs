use std::io::Write as _;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use clap::Subcommand;
use paceshift_core::storage::{CuesConfig, Database};
use paceshift_core::timer::{Formula, Phase, SavedTimer, TimerHooks, TimerState, WorkoutTimer};
use paceshift_core::Config;

use super::formula::find_preset;

const SNAPSHOT_KEY: &str = "saved_timer";

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run a workout in the foreground (Ctrl-C pauses and saves)
    Run {
        /// Resume from the saved snapshot instead of starting fresh
        #[arg(long)]
        resume: bool,
        /// Use a named preset instead of the configured formula
        #[arg(long)]
        preset: Option<String>,
    },
    /// Print the saved timer snapshot as JSON
    Status,
    /// Discard the saved timer snapshot
    Reset,
}

/// Host-side cue rendering and workout recording.
///
/// The engine fires phase cues; whether they are spoken or buzzed is decided
/// here, outside the timer's concern. Speech becomes a printed line, the
/// vibration motor becomes the terminal bell.
struct CliHooks {
    db: Arc<Mutex<Database>>,
    cues: CuesConfig,
    formula_name: String,
    session_minutes: u32,
    total_intervals: u32,
    intervals_done: u32,
}

impl CliHooks {
    fn spoken_line(phase: Phase) -> &'static str {
        match phase {
            Phase::Slow => "ease into a slow pace",
            Phase::Fast => "pick up a fast pace",
            Phase::Completed => "workout complete, well done",
        }
    }
}

impl TimerHooks for CliHooks {
    fn on_phase_change(&mut self, phase: Phase) {
        if self.cues.voice {
            println!("\ncue: {}", Self::spoken_line(phase));
        }
        if self.cues.vibration {
            print!("\x07");
            let _ = std::io::stdout().flush();
        }
        if phase == Phase::Completed {
            let db = self.db.lock().unwrap_or_else(|p| p.into_inner());
            if let Err(e) = db.record_workout(&self.formula_name, self.session_minutes, Utc::now())
            {
                tracing::warn!(error = %e, "failed to record workout");
            }
        }
    }

    fn on_interval_complete(&mut self) {
        self.intervals_done += 1;
        tracing::info!(
            interval = self.intervals_done,
            total = self.total_intervals,
            "interval complete"
        );
    }
}

fn load_snapshot(db: &Database) -> Option<SavedTimer> {
    let json = db.kv_get(SNAPSHOT_KEY).ok()??;
    serde_json::from_str(&json).ok()
}

fn save_snapshot(db: &Database, saved: &SavedTimer) -> Result<(), Box<dyn std::error::Error>> {
    db.kv_set(SNAPSHOT_KEY, &serde_json::to_string(saved)?)?;
    Ok(())
}

fn mmss(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn status_line(state: &TimerState) -> String {
    let phase = match state.current_phase {
        Phase::Slow => "slow",
        Phase::Fast => "fast",
        Phase::Completed => "done",
    };
    format!(
        "[{phase}] {}  interval {}/{}  elapsed {}",
        mmss(state.time_remaining_secs),
        state.current_interval,
        state.total_intervals,
        mmss(state.elapsed_secs),
    )
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TimerAction::Run { resume, preset } => run_workout(resume, preset),
        TimerAction::Status => {
            let db = Database::open()?;
            match load_snapshot(&db) {
                Some(saved) => println!("{}", serde_json::to_string_pretty(&saved)?),
                None => println!("no saved workout"),
            }
            Ok(())
        }
        TimerAction::Reset => {
            let db = Database::open()?;
            db.kv_delete(SNAPSHOT_KEY)?;
            println!("saved workout cleared");
            Ok(())
        }
    }
}

fn run_workout(resume: bool, preset: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let formula = match preset {
        Some(name) => find_preset(&name).ok_or_else(|| format!("unknown preset: {name}"))?,
        None => config.formula()?,
    };
    let db = Arc::new(Mutex::new(Database::open()?));

    let hooks = CliHooks {
        db: Arc::clone(&db),
        cues: config.cues.clone(),
        formula_name: formula.name.clone(),
        session_minutes: formula.session_minutes(),
        total_intervals: formula.total_intervals(),
        intervals_done: 0,
    };

    println!(
        "{}: {} slow / {} fast, {} intervals ({} min total)",
        formula.name,
        mmss(formula.slow_secs),
        mmss(formula.fast_secs),
        formula.total_intervals(),
        formula.session_minutes(),
    );

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(drive(formula, hooks, db, resume))
}

async fn drive(
    formula: Formula,
    hooks: CliHooks,
    db: Arc<Mutex<Database>>,
    resume: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let timer = WorkoutTimer::new(formula, hooks);
    let mut updates = timer.subscribe();

    if resume {
        let saved = {
            let db = db.lock().unwrap_or_else(|p| p.into_inner());
            load_snapshot(&db)
        };
        match saved {
            Some(saved) => timer.restore_state(saved),
            None => println!("no saved workout, starting fresh"),
        }
    }
    if !timer.state().is_running {
        timer.start();
    }

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow().clone();
                print!("\r{}", status_line(&state));
                std::io::stdout().flush()?;
                if state.current_phase == Phase::Completed {
                    let db = db.lock().unwrap_or_else(|p| p.into_inner());
                    db.kv_delete(SNAPSHOT_KEY)?;
                    println!();
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                timer.pause();
                let saved = SavedTimer::from(&timer.state());
                let db = db.lock().unwrap_or_else(|p| p.into_inner());
                save_snapshot(&db, &saved)?;
                println!("\npaused -- resume with `paceshift timer run --resume`");
                break;
            }
        }
    }
    timer.dispose();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mmss_formats_minutes_and_seconds() {
        assert_eq!(mmss(0), "00:00");
        assert_eq!(mmss(59), "00:59");
        assert_eq!(mmss(61), "01:01");
        assert_eq!(mmss(3600), "60:00");
    }

    #[test]
    fn status_line_shows_phase_and_progress() {
        let state = TimerState {
            current_phase: Phase::Fast,
            time_remaining_secs: 95,
            current_interval: 2,
            total_intervals: 5,
            is_running: true,
            elapsed_secs: 265,
        };
        assert_eq!(
            status_line(&state),
            "[fast] 01:35  interval 2/5  elapsed 04:25"
        );
    }
}
