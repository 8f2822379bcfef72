//! SQLite-based workout history and statistics.
//!
//! Provides persistent storage for:
//! - Completed workouts (one row per finished session)
//! - Workout statistics (daily and all-time)
//! - Key-value store for application state (e.g. the saved timer snapshot)

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::error::DatabaseError;

use super::data_dir;

/// One completed workout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutRecord {
    pub id: i64,
    /// Display name of the formula that was walked.
    pub formula: String,
    /// Whole minutes, floor-rounded, never less than one.
    pub duration_min: u32,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WorkoutStats {
    pub total_workouts: u64,
    pub total_minutes: u64,
    pub today_workouts: u64,
    pub today_minutes: u64,
}

/// SQLite database for workout history.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `data_dir()/paceshift.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, DatabaseError> {
        let path = data_dir()?.join("paceshift.db");
        Self::open_at(&path)
    }

    /// Open a database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "database opened");
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::Query)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS workouts (
                    id           INTEGER PRIMARY KEY AUTOINCREMENT,
                    formula      TEXT NOT NULL,
                    duration_min INTEGER NOT NULL,
                    completed_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_workouts_completed_at
                    ON workouts(completed_at);",
            )
            .map_err(DatabaseError::MigrationFailed)
    }

    /// Record a completed workout.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn record_workout(
        &self,
        formula: &str,
        duration_min: u32,
        completed_at: DateTime<Utc>,
    ) -> Result<i64, DatabaseError> {
        self.conn.execute(
            "INSERT INTO workouts (formula, duration_min, completed_at)
             VALUES (?1, ?2, ?3)",
            params![formula, duration_min.max(1), completed_at.to_rfc3339()],
        )?;
        tracing::info!(formula, duration_min, "workout recorded");
        Ok(self.conn.last_insert_rowid())
    }

    pub fn stats_today(&self) -> Result<WorkoutStats, DatabaseError> {
        let midnight = Utc::now().format("%Y-%m-%dT00:00:00+00:00").to_string();
        let (count, minutes) = self.count_and_minutes_since(Some(&midnight))?;
        Ok(WorkoutStats {
            total_workouts: count,
            total_minutes: minutes,
            today_workouts: count,
            today_minutes: minutes,
        })
    }

    pub fn stats_all(&self) -> Result<WorkoutStats, DatabaseError> {
        let (total_workouts, total_minutes) = self.count_and_minutes_since(None)?;
        let midnight = Utc::now().format("%Y-%m-%dT00:00:00+00:00").to_string();
        let (today_workouts, today_minutes) = self.count_and_minutes_since(Some(&midnight))?;
        Ok(WorkoutStats {
            total_workouts,
            total_minutes,
            today_workouts,
            today_minutes,
        })
    }

    fn count_and_minutes_since(&self, since: Option<&str>) -> Result<(u64, u64), DatabaseError> {
        let row = match since {
            Some(since) => self.conn.query_row(
                "SELECT COUNT(*), COALESCE(SUM(duration_min), 0)
                 FROM workouts WHERE completed_at >= ?1",
                params![since],
                |row| Ok((row.get::<_, u64>(0)?, row.get::<_, u64>(1)?)),
            )?,
            None => self.conn.query_row(
                "SELECT COUNT(*), COALESCE(SUM(duration_min), 0) FROM workouts",
                [],
                |row| Ok((row.get::<_, u64>(0)?, row.get::<_, u64>(1)?)),
            )?,
        };
        Ok(row)
    }

    /// Most recent workouts, newest first.
    pub fn recent_workouts(&self, limit: u32) -> Result<Vec<WorkoutRecord>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, formula, duration_min, completed_at
             FROM workouts ORDER BY completed_at DESC, id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, u32>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, formula, duration_min, completed_at) = row?;
            let completed_at = completed_at
                .parse::<DateTime<Utc>>()
                .unwrap_or_else(|_| Utc::now());
            records.push(WorkoutRecord {
                id,
                formula,
                duration_min,
                completed_at,
            });
        }
        Ok(records)
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Remove a value from the kv store.
    pub fn kv_delete(&self, key: &str) -> Result<(), DatabaseError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_and_query() {
        let db = Database::open_memory().unwrap();
        let now = Utc::now();
        db.record_workout("Classic Walk", 30, now).unwrap();
        db.record_workout("Starter Walk", 18, now).unwrap();
        let stats = db.stats_all().unwrap();
        assert_eq!(stats.total_workouts, 2);
        assert_eq!(stats.total_minutes, 48);
        assert_eq!(stats.today_workouts, 2);
    }

    #[test]
    fn zero_minutes_is_stored_as_one() {
        let db = Database::open_memory().unwrap();
        db.record_workout("Tiny", 0, Utc::now()).unwrap();
        let stats = db.stats_all().unwrap();
        assert_eq!(stats.total_minutes, 1);
    }

    #[test]
    fn recent_workouts_newest_first() {
        let db = Database::open_memory().unwrap();
        let earlier = Utc::now() - chrono::Duration::hours(2);
        db.record_workout("Old", 30, earlier).unwrap();
        db.record_workout("New", 18, Utc::now()).unwrap();
        let recent = db.recent_workouts(10).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].formula, "New");
        assert_eq!(recent[1].formula, "Old");
    }

    #[test]
    fn recent_workouts_honors_limit() {
        let db = Database::open_memory().unwrap();
        for _ in 0..5 {
            db.record_workout("Walk", 30, Utc::now()).unwrap();
        }
        assert_eq!(db.recent_workouts(3).unwrap().len(), 3);
    }

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
        db.kv_delete("test").unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
    }

    #[test]
    fn open_at_creates_file_backed_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("walks.db");
        {
            let db = Database::open_at(&path).unwrap();
            db.record_workout("Classic Walk", 30, Utc::now()).unwrap();
        }
        let db = Database::open_at(&path).unwrap();
        assert_eq!(db.stats_all().unwrap().total_workouts, 1);
    }
}
