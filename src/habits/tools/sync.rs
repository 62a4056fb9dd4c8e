//! One sync run: find the newest backup, cache it, extract stats for the
//! window and overwrite the destination sheet.
//!
//! Every step is a hard failure point. The first error is returned as-is,
//! nothing is retried, and the sheet is only touched once extraction has
//! succeeded.

use std::io::Write;

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::habits::tools::cache::ArtifactCache;
use crate::habits::tools::error::{Result, SyncError};
use crate::habits::tools::io::drive::RemoteDrive;
use crate::habits::tools::io::sqlite::{StatsOpener, StatsSource};
use crate::habits::tools::io::workbook::SheetPublisher;
use crate::habits::tools::model::{HabitStat, RemoteFile, TimeWindow};

/// Everything a run needs, validated before any side effect.
#[derive(Debug, Clone)]
pub struct SyncRequest {
    /// Name prefix of the backup files on the drive.
    pub prefix: String,
    pub window: TimeWindow,
    /// Name, or name prefix, of the destination spreadsheet.
    pub spreadsheet: String,
    pub sheet: String,
}

impl SyncRequest {
    pub fn validate(&self) -> Result<()> {
        if self.window.is_zero() {
            return Err(SyncError::Validation(
                "from/to dates cannot be empty".to_string(),
            ));
        }
        if self.prefix.trim().is_empty() {
            return Err(SyncError::Validation("prefix cannot be empty".to_string()));
        }
        if self.spreadsheet.trim().is_empty() {
            return Err(SyncError::Validation(
                "spreadsheet cannot be empty".to_string(),
            ));
        }
        if self.sheet.trim().is_empty() {
            return Err(SyncError::Validation(
                "sheet name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// How the backup reached the local cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactSource {
    Reused,
    Downloaded,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncReport {
    pub backup: RemoteFile,
    pub artifact: ArtifactSource,
    pub window: TimeWindow,
    pub habits: Vec<HabitStat>,
    /// Destination spreadsheet; `None` when there was nothing to publish.
    pub spreadsheet_id: Option<String>,
}

impl SyncReport {
    pub fn habits_imported(&self) -> usize {
        if self.spreadsheet_id.is_some() {
            self.habits.len()
        } else {
            0
        }
    }
}

/// Coordinates the drive, the local cache, the stats extractor and the
/// spreadsheet publisher. Progress lines go to `output`.
pub struct SyncService<'a, W: Write> {
    drive: &'a dyn RemoteDrive,
    sheets: &'a dyn SheetPublisher,
    cache: &'a dyn ArtifactCache,
    stats: &'a dyn StatsOpener,
    output: W,
}

impl<'a, W: Write> SyncService<'a, W> {
    pub fn new(
        drive: &'a dyn RemoteDrive,
        sheets: &'a dyn SheetPublisher,
        cache: &'a dyn ArtifactCache,
        stats: &'a dyn StatsOpener,
        output: W,
    ) -> Self {
        Self {
            drive,
            sheets,
            cache,
            stats,
            output,
        }
    }

    /// Consumes the service and hands back the progress writer.
    pub fn into_output(self) -> W {
        self.output
    }

    #[instrument(
        level = "info",
        skip_all,
        fields(prefix = %request.prefix, spreadsheet = %request.spreadsheet, sheet = %request.sheet)
    )]
    pub fn handle(&mut self, request: &SyncRequest) -> Result<SyncReport> {
        request.validate()?;

        let backups = self.drive.list_by_prefix(&request.prefix)?;
        let found = backups.len();
        // The drive lists newest first.
        let Some(backup) = backups.into_iter().next() else {
            return Err(SyncError::NotFound(format!(
                "no backup found with prefix '{}'",
                request.prefix
            )));
        };
        writeln!(self.output, "Found {found} backup files")?;

        let (source, artifact) = self.open_or_download(&backup)?;
        let habits = source.all_habits(&request.window)?;
        info!(habit_count = habits.len(), ?artifact, "extracted habit stats");

        if habits.is_empty() {
            writeln!(
                self.output,
                "No habits completed between {} and {}, nothing to import",
                request.window.from().date_naive(),
                request.window.to().date_naive()
            )?;
            return Ok(SyncReport {
                backup,
                artifact,
                window: request.window,
                habits,
                spreadsheet_id: None,
            });
        }

        let spreadsheet_id = self.find_spreadsheet(&request.spreadsheet)?;

        writeln!(self.output, "Importing {} habits...", habits.len())?;
        self.sheets.create_sheet(&spreadsheet_id, &request.sheet)?;
        self.sheets
            .update_sheet(&spreadsheet_id, &request.sheet, &habits)?;
        writeln!(self.output, "Habits imported successfully")?;

        Ok(SyncReport {
            backup,
            artifact,
            window: request.window,
            habits,
            spreadsheet_id: Some(spreadsheet_id),
        })
    }

    #[instrument(level = "debug", skip(self))]
    fn find_spreadsheet(&self, spreadsheet: &str) -> Result<String> {
        let mut matches = self.drive.list_by_prefix(spreadsheet)?;
        match matches.len() {
            0 => Err(SyncError::NotFound(format!(
                "spreadsheet not found under the name of '{spreadsheet}'"
            ))),
            1 => Ok(matches.remove(0).id),
            count => Err(SyncError::Ambiguous {
                name: spreadsheet.to_string(),
                count,
            }),
        }
    }

    #[instrument(level = "debug", skip(self), fields(name = %backup.name))]
    fn open_or_download(
        &mut self,
        backup: &RemoteFile,
    ) -> Result<(Box<dyn StatsSource>, ArtifactSource)> {
        if self.cache.exists(&backup.name) {
            writeln!(
                self.output,
                "Newest backup file already downloaded: '{}'",
                backup.name
            )?;
            return Ok((self.stats.open(&backup.name)?, ArtifactSource::Reused));
        }

        writeln!(self.output, "Downloading newest backup: '{}'", backup.name)?;
        let bytes = self.drive.download(&backup.id)?;
        debug!(size = bytes.len(), "backup downloaded");
        self.cache.store(&backup.name, &bytes)?;

        Ok((self.stats.open(&backup.name)?, ArtifactSource::Downloaded))
    }
}
