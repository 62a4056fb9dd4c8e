use std::cmp::Reverse;
use std::fs;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, instrument};
use walkdir::WalkDir;

use crate::habits::tools::error::{Result, SyncError};
use crate::habits::tools::io::PARTIAL_SUFFIX;
use crate::habits::tools::model::RemoteFile;

/// Maximum number of files returned by a single listing.
pub const LIST_PAGE_SIZE: usize = 30;

/// Cloud drive holding the backups and the destination spreadsheets.
pub trait RemoteDrive {
    /// Lists files whose name starts with `prefix`, newest first. Files still
    /// being written are left out.
    fn list_by_prefix(&self, prefix: &str) -> Result<Vec<RemoteFile>>;

    /// Downloads the full content of the file identified by `id`.
    fn download(&self, id: &str) -> Result<Vec<u8>>;
}

/// Rejects prefixes the drive search cannot express safely.
///
/// Search queries quote the prefix with single quotes, so a quote inside the
/// prefix would terminate the literal.
pub fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.contains('\'') {
        return Err(SyncError::Validation(format!(
            "prefix '{prefix}' contains unsupported single quote character"
        )));
    }
    Ok(())
}

/// Drive mirrored to a local folder by the vendor's desktop client.
///
/// File ids are paths relative to the root, always `/`-separated.
#[derive(Debug, Clone)]
pub struct MountedDrive {
    root: PathBuf,
}

impl MountedDrive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves an id back to a path below the root.
    pub fn resolve(&self, id: &str) -> Result<PathBuf> {
        let relative = Path::new(id);
        let plain = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if id.is_empty() || !plain {
            return Err(SyncError::Validation(format!(
                "file id '{id}' does not name a file inside the drive"
            )));
        }
        Ok(self.root.join(relative))
    }

    fn file_id(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<&str> = relative
            .components()
            .map(|component| component.as_os_str().to_str())
            .collect::<Option<_>>()?;
        Some(parts.join("/"))
    }
}

impl RemoteDrive for MountedDrive {
    #[instrument(level = "debug", skip(self), fields(root = %self.root.display()))]
    fn list_by_prefix(&self, prefix: &str) -> Result<Vec<RemoteFile>> {
        validate_prefix(prefix)?;
        if !self.root.is_dir() {
            return Err(SyncError::NotFound(format!(
                "drive folder '{}' does not exist",
                self.root.display()
            )));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root).follow_links(false) {
            let entry = entry.map_err(|error| {
                let path = error.path().unwrap_or(&self.root).to_path_buf();
                SyncError::io_at(path, error.into())
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str() else {
                continue;
            };
            if !name.starts_with(prefix) || name.ends_with(PARTIAL_SUFFIX) {
                continue;
            }
            let Some(id) = self.file_id(entry.path()) else {
                continue;
            };
            let modified = entry
                .metadata()
                .ok()
                .and_then(|metadata| metadata.modified().ok())
                .map(DateTime::<Utc>::from);
            files.push(RemoteFile {
                id,
                name: name.to_string(),
                modified,
            });
        }

        files.sort_by(|lhs, rhs| {
            Reverse(lhs.modified)
                .cmp(&Reverse(rhs.modified))
                .then_with(|| rhs.name.cmp(&lhs.name))
        });
        files.truncate(LIST_PAGE_SIZE);

        debug!(matches = files.len(), "listed drive files");
        Ok(files)
    }

    #[instrument(level = "debug", skip(self), fields(root = %self.root.display()))]
    fn download(&self, id: &str) -> Result<Vec<u8>> {
        let path = self.resolve(id)?;
        let bytes = fs::read(&path).map_err(|source| SyncError::io_at(&path, source))?;
        debug!(size = bytes.len(), "file downloaded");
        Ok(bytes)
    }
}
