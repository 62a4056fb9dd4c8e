use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, instrument};

use crate::habits::tools::error::{Result, SyncError};
use crate::habits::tools::io::{discard_partial, partial_path};

/// Local store of downloaded backup artifacts keyed by their drive name.
///
/// A name that reports existing must be openable by the stats extractor.
/// Nothing is ever evicted.
pub trait ArtifactCache {
    fn exists(&self, name: &str) -> bool;
    fn store(&self, name: &str, bytes: &[u8]) -> Result<()>;
}

/// Cache backed by a single flat directory.
#[derive(Debug, Clone)]
pub struct DirCache {
    root: PathBuf,
}

impl DirCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of the artifact stored under `name`.
    pub fn path_for(&self, name: &str) -> Result<PathBuf> {
        validate_name(name)?;
        Ok(self.root.join(name))
    }
}

impl ArtifactCache for DirCache {
    fn exists(&self, name: &str) -> bool {
        self.path_for(name)
            .map(|path| path.is_file())
            .unwrap_or(false)
    }

    #[instrument(level = "debug", skip(self, bytes), fields(root = %self.root.display(), size = bytes.len()))]
    fn store(&self, name: &str, bytes: &[u8]) -> Result<()> {
        let target = self.path_for(name)?;
        fs::create_dir_all(&self.root).map_err(|source| SyncError::io_at(&self.root, source))?;

        // Written aside and renamed so a half-written artifact never shows up
        // under its final name.
        let partial = partial_path(&target);
        let written = fs::write(&partial, bytes)
            .map_err(|source| SyncError::io_at(&partial, source))
            .and_then(|()| restrict_permissions(&partial))
            .and_then(|()| {
                fs::rename(&partial, &target).map_err(|source| SyncError::io_at(&target, source))
            });
        if written.is_err() {
            discard_partial(&partial);
        }
        written?;

        debug!(path = %target.display(), "artifact stored");
        Ok(())
    }
}

/// Accepts only plain file names so remote names cannot escape the cache
/// directory.
fn validate_name(name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !name.contains(['/', '\\']) => Ok(()),
        _ => Err(SyncError::Validation(format!(
            "artifact name '{name}' is not a plain file name"
        ))),
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
        .map_err(|source| SyncError::io_at(path, source))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
