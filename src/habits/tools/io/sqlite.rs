//! Habit statistics read from a Loop Habit Tracker backup database.
//!
//! # Invariants
//! - Backups are opened read-only; extraction never mutates the artifact.
//! - Only repetitions marked as completed by the user are counted.
//! - Rows are ordered by habit name, then habit id.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags, params};
use tracing::{debug, instrument};

use crate::habits::tools::error::{Result, SyncError};
use crate::habits::tools::model::{HabitStat, TimeWindow};

/// Repetition value stored for a check-in the user entered manually.
pub const COMPLETED_VALUE: i64 = 2;

const ALL_HABITS_QUERY: &str = "SELECT Habits.id, Habits.name, COUNT(Repetitions.id)
    FROM Habits
    JOIN Repetitions ON Habits.id = Repetitions.habit
    WHERE NOT Habits.archived
      AND Repetitions.value = ?1
      AND Repetitions.timestamp >= ?2
      AND Repetitions.timestamp <= ?3
    GROUP BY Habits.id
    ORDER BY Habits.name, Habits.id";

/// Aggregated view over one cached backup.
pub trait StatsSource {
    fn all_habits(&self, window: &TimeWindow) -> Result<Vec<HabitStat>>;
}

/// Opens cached artifacts by name.
pub trait StatsOpener {
    fn open(&self, name: &str) -> Result<Box<dyn StatsSource>>;
}

/// Opens backups stored in a cache directory as SQLite databases.
#[derive(Debug, Clone)]
pub struct SqliteStatsOpener {
    dir: PathBuf,
}

impl SqliteStatsOpener {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl StatsOpener for SqliteStatsOpener {
    fn open(&self, name: &str) -> Result<Box<dyn StatsSource>> {
        let stats = SqliteStats::open(self.dir.join(name))?;
        Ok(Box::new(stats))
    }
}

/// Read-only connection to a backup database.
pub struct SqliteStats {
    conn: Connection,
    artifact: String,
}

impl SqliteStats {
    /// Opens the database at `path` without creating it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let artifact = path.display().to_string();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| SyncError::Extraction {
            artifact: artifact.clone(),
            source,
        })?;
        Ok(Self { conn, artifact })
    }

    /// Wraps an already opened connection, mostly useful for in-memory
    /// fixtures.
    pub fn from_connection(conn: Connection, artifact: impl Into<String>) -> Self {
        Self {
            conn,
            artifact: artifact.into(),
        }
    }
}

impl StatsSource for SqliteStats {
    #[instrument(level = "debug", skip(self), fields(artifact = %self.artifact))]
    fn all_habits(&self, window: &TimeWindow) -> Result<Vec<HabitStat>> {
        let extraction_error = |source| SyncError::Extraction {
            artifact: self.artifact.clone(),
            source,
        };

        let mut statement = self
            .conn
            .prepare(ALL_HABITS_QUERY)
            .map_err(extraction_error)?;
        let rows = statement
            .query_map(
                params![
                    COMPLETED_VALUE,
                    window.from().timestamp_millis(),
                    window.to().timestamp_millis()
                ],
                |row| {
                    Ok(HabitStat {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        count: row.get(2)?,
                    })
                },
            )
            .map_err(extraction_error)?;
        let stats = rows
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(extraction_error)?;

        debug!(habit_count = stats.len(), "aggregated habit stats");
        Ok(stats)
    }
}
