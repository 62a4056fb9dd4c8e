use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::warn;

pub mod drive;
pub mod excel_read;
pub mod excel_write;
pub mod sqlite;
pub mod workbook;

pub use drive::{MountedDrive, RemoteDrive};
pub use sqlite::{SqliteStats, SqliteStatsOpener, StatsOpener, StatsSource};
pub use workbook::{SheetPublisher, WorkbookPublisher};

/// Suffix of files written aside and renamed into place once complete.
/// Drive listings never report them.
pub const PARTIAL_SUFFIX: &str = ".partial";

/// Sibling of `path` used while its content is being written.
pub(crate) fn partial_path(path: &Path) -> PathBuf {
    let mut partial = path.as_os_str().to_owned();
    partial.push(PARTIAL_SUFFIX);
    PathBuf::from(partial)
}

/// Removes a partial file left by a failed write. The original error is the
/// one reported, so a failed removal is only logged.
pub(crate) fn discard_partial(partial: &Path) {
    match std::fs::remove_file(partial) {
        Err(error) if error.kind() != ErrorKind::NotFound => {
            warn!(path = %partial.display(), %error, "failed to remove partial file");
        }
        _ => {}
    }
}
