//! TOML-based application configuration.
//!
//! Stores user preferences:
//! - The workout pattern (slow/fast minutes, rounds, opening phase)
//! - Cue delivery toggles (voice, vibration)
//! - An optional custom formula override
//!
//! Configuration is stored at `data_dir()/config.toml`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ValidationError};
use crate::timer::{Formula, PatternKind};

use super::data_dir;

/// Workout pattern configuration. Durations are minutes within 1..=60,
/// matching what the pattern editor UI offers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutConfig {
    #[serde(default = "default_slow_min")]
    pub slow_min: u32,
    #[serde(default = "default_fast_min")]
    pub fast_min: u32,
    #[serde(default = "default_rounds")]
    pub rounds: u32,
    #[serde(default)]
    pub starts_with_fast: bool,
    /// Circuit rounds count double; see [`PatternKind`].
    #[serde(default)]
    pub circuit: bool,
}

/// Cue delivery configuration. The timer engine fires phase-change cues
/// regardless; these toggles decide how the host renders them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CuesConfig {
    #[serde(default = "default_true")]
    pub voice: bool,
    #[serde(default = "default_true")]
    pub vibration: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `data_dir()/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub workout: WorkoutConfig,
    #[serde(default)]
    pub cues: CuesConfig,
    /// Full formula override; when set it wins over `workout`.
    #[serde(default)]
    pub custom_formula: Option<Formula>,
}

fn default_slow_min() -> u32 {
    3
}
fn default_fast_min() -> u32 {
    3
}
fn default_rounds() -> u32 {
    5
}
fn default_true() -> bool {
    true
}

impl Default for WorkoutConfig {
    fn default() -> Self {
        Self {
            slow_min: default_slow_min(),
            fast_min: default_fast_min(),
            rounds: default_rounds(),
            starts_with_fast: false,
            circuit: false,
        }
    }
}

impl Default for CuesConfig {
    fn default() -> Self {
        Self {
            voice: true,
            vibration: true,
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk, writing the default config on first run.
    ///
    /// # Errors
    /// Returns an error if an existing config file cannot be parsed, or if
    /// the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Load from disk, returning default on error. Never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Persist to disk.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// The formula a workout runs with: the custom override if present,
    /// otherwise one built from the `workout` section.
    ///
    /// # Errors
    /// Returns an error if the configured values fail formula validation
    /// (e.g. a hand-edited config with zero rounds).
    pub fn formula(&self) -> Result<Formula, ValidationError> {
        if let Some(ref custom) = self.custom_formula {
            return Ok(custom.clone());
        }
        let w = &self.workout;
        let (name, kind) = if w.circuit {
            ("Circuit Walk", PatternKind::Circuit)
        } else {
            ("Interval Walk", PatternKind::Interval)
        };
        Formula::new(
            name,
            kind,
            w.slow_min.saturating_mul(60),
            w.fast_min.saturating_mul(60),
            w.rounds,
            w.starts_with_fast,
        )
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let pointer = format!("/{}", key.replace('.', "/"));
        match json.pointer(&pointer)? {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key and persist the result.
    ///
    /// The new value is parsed according to the type the key already holds.
    ///
    /// # Errors
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        let pointer = format!("/{}", key.replace('.', "/"));
        let slot = json
            .pointer_mut(&pointer)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        *slot = parse_as_existing(slot, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.save()
    }
}

/// Parse `value` into the same JSON shape `existing` already has.
fn parse_as_existing(
    existing: &serde_json::Value,
    key: &str,
    value: &str,
) -> Result<serde_json::Value, ConfigError> {
    let invalid = |message: String| ConfigError::InvalidValue {
        key: key.to_string(),
        message,
    };
    match existing {
        serde_json::Value::Bool(_) => value
            .parse::<bool>()
            .map(serde_json::Value::Bool)
            .map_err(|e| invalid(e.to_string())),
        serde_json::Value::Number(_) => value
            .parse::<u64>()
            .map(|n| serde_json::Value::Number(n.into()))
            .map_err(|_| invalid(format!("cannot parse '{value}' as number"))),
        serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
            serde_json::from_str(value).map_err(|e| invalid(e.to_string()))
        }
        _ => Ok(serde_json::Value::String(value.into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.workout.slow_min, 3);
        assert_eq!(parsed.workout.rounds, 5);
        assert!(parsed.cues.voice);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("workout.slow_min").as_deref(), Some("3"));
        assert_eq!(cfg.get("cues.voice").as_deref(), Some("true"));
        assert!(cfg.get("workout.missing_key").is_none());
    }

    #[test]
    fn parse_as_existing_respects_types() {
        let bool_slot = serde_json::Value::Bool(true);
        assert_eq!(
            parse_as_existing(&bool_slot, "cues.voice", "false").unwrap(),
            serde_json::Value::Bool(false)
        );
        assert!(parse_as_existing(&bool_slot, "cues.voice", "maybe").is_err());

        let num_slot = serde_json::Value::Number(3.into());
        assert_eq!(
            parse_as_existing(&num_slot, "workout.rounds", "7").unwrap(),
            serde_json::Value::Number(7.into())
        );
        assert!(parse_as_existing(&num_slot, "workout.rounds", "many").is_err());
    }

    #[test]
    fn formula_from_workout_section() {
        let cfg = Config::default();
        let f = cfg.formula().unwrap();
        assert_eq!(f.slow_secs, 180);
        assert_eq!(f.fast_secs, 180);
        assert_eq!(f.rounds, 5);
        assert_eq!(f.kind, PatternKind::Interval);
        assert!(!f.starts_with_fast);
    }

    #[test]
    fn circuit_flag_selects_circuit_kind() {
        let cfg = Config {
            workout: WorkoutConfig {
                circuit: true,
                ..WorkoutConfig::default()
            },
            ..Config::default()
        };
        let f = cfg.formula().unwrap();
        assert_eq!(f.kind, PatternKind::Circuit);
        assert_eq!(f.total_intervals(), 10);
    }

    #[test]
    fn custom_formula_wins_over_workout_section() {
        let cfg = Config {
            custom_formula: Some(Formula::circuit()),
            ..Config::default()
        };
        assert_eq!(cfg.formula().unwrap(), Formula::circuit());
    }

    #[test]
    fn invalid_workout_section_fails_validation() {
        let cfg = Config {
            workout: WorkoutConfig {
                rounds: 0,
                ..WorkoutConfig::default()
            },
            ..Config::default()
        };
        assert_eq!(cfg.formula(), Err(ValidationError::ZeroRounds));
    }
}
