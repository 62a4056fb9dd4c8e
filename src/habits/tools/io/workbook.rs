use std::path::PathBuf;

use tracing::{debug, info, instrument};

use crate::habits::tools::error::{Result, SyncError};
use crate::habits::tools::io::drive::MountedDrive;
use crate::habits::tools::io::{excel_read, excel_write};
use crate::habits::tools::model::{Cell, HabitStat, SheetTable};

/// Column headers written above the stats.
pub const HEADER: [&str; 3] = ["ID", "Name", "Count"];

/// Destination of the extracted stats.
pub trait SheetPublisher {
    /// Ensures `sheet` exists in the spreadsheet. Does nothing when it is
    /// already there.
    fn create_sheet(&self, spreadsheet_id: &str, sheet: &str) -> Result<()>;

    /// Replaces the whole content of `sheet` with a header row followed by
    /// one row per stat.
    fn update_sheet(&self, spreadsheet_id: &str, sheet: &str, stats: &[HabitStat]) -> Result<()>;
}

/// Builds the rows written by [`SheetPublisher::update_sheet`].
pub fn stat_rows(stats: &[HabitStat]) -> Vec<Vec<Cell>> {
    let mut rows = Vec::with_capacity(stats.len() + 1);
    rows.push(HEADER.iter().map(|header| Cell::from(*header)).collect());
    rows.extend(stats.iter().map(|stat| {
        vec![
            Cell::from(stat.id),
            Cell::from(stat.name.clone()),
            Cell::from(stat.count),
        ]
    }));
    rows
}

/// Publishes into `.xlsx` spreadsheets living in a [`MountedDrive`]. The
/// spreadsheet id is the drive file id.
///
/// Every call rewrites the whole workbook. Other sheets keep their values and
/// order; cell formatting is not preserved.
#[derive(Debug, Clone)]
pub struct WorkbookPublisher {
    drive: MountedDrive,
}

impl WorkbookPublisher {
    pub fn new(drive: MountedDrive) -> Self {
        Self { drive }
    }

    fn path(&self, spreadsheet_id: &str) -> Result<PathBuf> {
        let path = self.drive.resolve(spreadsheet_id)?;
        if !path.is_file() {
            return Err(SyncError::NotFound(format!(
                "spreadsheet '{spreadsheet_id}' does not exist"
            )));
        }
        Ok(path)
    }
}

impl SheetPublisher for WorkbookPublisher {
    #[instrument(level = "debug", skip(self))]
    fn create_sheet(&self, spreadsheet_id: &str, sheet: &str) -> Result<()> {
        let path = self.path(spreadsheet_id)?;
        let mut workbook = excel_read::read_workbook(&path)?;
        if workbook.sheet(sheet).is_some() {
            debug!("sheet already present");
            return Ok(());
        }

        workbook.tables.push(SheetTable::empty(sheet));
        excel_write::write_workbook(&path, &workbook)?;
        info!("sheet created");
        Ok(())
    }

    #[instrument(level = "debug", skip(self, stats), fields(rows = stats.len()))]
    fn update_sheet(&self, spreadsheet_id: &str, sheet: &str, stats: &[HabitStat]) -> Result<()> {
        let path = self.path(spreadsheet_id)?;
        let mut workbook = excel_read::read_workbook(&path)?;
        let table = workbook.sheet_mut(sheet).ok_or_else(|| {
            SyncError::publish(spreadsheet_id, format!("sheet '{sheet}' does not exist"))
        })?;
        table.rows = stat_rows(stats);

        excel_write::write_workbook(&path, &workbook)?;
        info!("sheet overwritten");
        Ok(())
    }
}
