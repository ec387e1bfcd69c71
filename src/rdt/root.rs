use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::mountinfo;
use crate::settings::Settings;

/// Resolves and caches the mount point of the resource control filesystem.
///
/// The mount table is scanned at most once per successful resolution: the first
/// path found is kept for the lifetime of the resolver. Failures are not cached,
/// so a later call scans again, e.g. after the filesystem has been mounted.
///
/// One resolver is meant to be shared, typically behind an [`std::sync::Arc`], by
/// every [`super::Manager`] of a process.
#[derive(Debug)]
pub struct RootResolver {
    mountinfo_path: PathBuf,
    fs_type: String,
    root: Mutex<Option<PathBuf>>,
}

impl RootResolver {
    /// Creates a resolver that looks for `fs_type` in the mount table at `mountinfo_path`.
    pub fn new(mountinfo_path: impl Into<PathBuf>, fs_type: impl Into<String>) -> Self {
        Self {
            mountinfo_path: mountinfo_path.into(),
            fs_type: fs_type.into(),
            root: Mutex::new(None),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.mountinfo_path, &settings.fs_type)
    }

    pub fn fs_type(&self) -> &str {
        &self.fs_type
    }

    pub fn mountinfo_path(&self) -> &Path {
        &self.mountinfo_path
    }

    /// Returns the root of the resource control filesystem.
    ///
    /// # Errors
    ///
    /// Returns the [`mountinfo::Error`] of the failed scan; see
    /// [`mountinfo::find_validated_mount_point`]. [`mountinfo::Error::is_not_found`]
    /// tells whether the filesystem is simply not mounted.
    pub fn resolve(&self) -> mountinfo::Result<PathBuf> {
        let mut root = self.root.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(root) = root.as_ref() {
            return Ok(root.clone());
        }

        let found = mountinfo::find_validated_mount_point(self.mountinfo_path(), self.fs_type())?;
        log::debug!("Resolved `{}` root: {}", self.fs_type, found.display());
        *root = Some(found.clone());
        Ok(found)
    }

    /// Returns the cached root without scanning the mount table.
    pub fn cached(&self) -> Option<PathBuf> {
        self.root
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
