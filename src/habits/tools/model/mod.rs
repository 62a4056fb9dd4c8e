use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::habits::tools::error::{Result, SyncError};

/// Identifier assigned to a file by the drive. It is opaque to the
/// orchestrator and only ever handed back to the same drive.
pub type FileId = String;

/// A file discovered on the drive, either a backup or a spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    /// Drive-specific identifier used for downloads and spreadsheet access.
    pub id: FileId,
    /// File name, also used as the local cache key for backups.
    pub name: String,
    /// Last modification time as reported by the drive, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
}

impl RemoteFile {
    /// Creates a descriptor without modification metadata.
    pub fn new(id: impl Into<FileId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            modified: None,
        }
    }
}

/// Completion count of one non-archived habit inside a [`TimeWindow`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitStat {
    pub id: i64,
    pub name: String,
    pub count: i64,
}

impl HabitStat {
    pub fn new(id: i64, name: impl Into<String>, count: i64) -> Self {
        Self {
            id,
            name: name.into(),
            count,
        }
    }
}

/// Closed time interval used to select repetitions. Both bounds are
/// inclusive.
///
/// The `Default` value, with both bounds at the Unix epoch, is the "zero"
/// window: it marks an interval that was never resolved and is rejected by the
/// sync service. A resolved window always ends on the last nanosecond of a
/// day, so it never equals the zero window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    from: DateTime<Utc>,
    to: DateTime<Utc>,
}

impl TimeWindow {
    /// Builds a window, rejecting reversed bounds.
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Self> {
        if from > to {
            return Err(SyncError::Validation(format!(
                "window start {from} is after its end {to}"
            )));
        }
        Ok(Self { from, to })
    }

    pub fn from(&self) -> DateTime<Utc> {
        self.from
    }

    pub fn to(&self) -> DateTime<Utc> {
        self.to
    }

    /// Returns `true` for the unresolved `Default` window.
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    /// Returns `true` when `instant` lies inside the window, bounds included.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.from <= instant && instant <= self.to
    }
}

/// A single spreadsheet cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        // Spreadsheet numbers are doubles; exact up to 2^53.
        Cell::Number(value as f64)
    }
}

/// A sheet materialised in memory, anchored at cell `A1`.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub sheet_name: String,
    pub rows: Vec<Vec<Cell>>,
}

impl SheetTable {
    pub fn empty(sheet_name: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            rows: Vec::new(),
        }
    }
}

/// All sheets of a workbook, in tab order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkbookData {
    pub tables: Vec<SheetTable>,
}

impl WorkbookData {
    pub fn sheet(&self, name: &str) -> Option<&SheetTable> {
        self.tables.iter().find(|table| table.sheet_name == name)
    }

    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut SheetTable> {
        self.tables.iter_mut().find(|table| table.sheet_name == name)
    }
}
