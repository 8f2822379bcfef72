mod config;
pub mod database;

pub use config::{Config, CuesConfig, WorkoutConfig};
pub use database::{Database, WorkoutRecord, WorkoutStats};

use std::path::PathBuf;

/// Returns `~/.config/paceshift[-dev]/` based on PACESHIFT_ENV.
///
/// Set PACESHIFT_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if the config directory cannot be created.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("PACESHIFT_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("paceshift-dev")
    } else {
        base_dir.join("paceshift")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
