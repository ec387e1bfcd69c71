use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::{ContainerID, ResourceConfig};
use crate::fsutil;

use super::group::{self, CPUS_FILE, SCHEMAS_FILE, TASKS_FILE};
use super::root::RootResolver;
use super::stats::Stats;
use super::{Error, Result, collector};

/// Manages the allocation group of one container.
///
/// The group directory is named after the container id and lives directly below
/// the root of the resource control filesystem. Every operation that reads or
/// changes the group path runs under the manager's lock, so concurrent callers
/// always observe a consistent path.
///
/// # Example
///
/// ```no_run
/// # use std::sync::Arc;
/// # use rdt_manager::config::{ContainerID, ResourceConfig};
/// # use rdt_manager::rdt::{Manager, RootResolver};
/// let resolver = Arc::new(RootResolver::new("/proc/self/mountinfo", "rscctrl"));
/// let config = ResourceConfig {
///     l3_cache_schema: Some("L3:0=f0;".into()),
///     ..Default::default()
/// };
/// let manager = Manager::new(resolver, ContainerID::new("web-1")?, config.clone());
///
/// manager.apply(Some(4242))?;
/// manager.set(&config)?;
/// println!("{:?}", manager.get_stats()?);
/// manager.destroy()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct Manager {
    resolver: Arc<RootResolver>,
    container_id: ContainerID,
    config: ResourceConfig,
    path: Mutex<Option<PathBuf>>,
}

impl Manager {
    /// Creates a manager that has not joined its allocation group yet.
    pub fn new(
        resolver: Arc<RootResolver>,
        container_id: ContainerID,
        config: ResourceConfig,
    ) -> Self {
        Self {
            resolver,
            container_id,
            config,
            path: Mutex::new(None),
        }
    }

    /// Recreates a manager for a group joined earlier, e.g. from a path kept in
    /// a state file. An empty `path` yields a manager that has not joined.
    pub fn restore(
        resolver: Arc<RootResolver>,
        container_id: ContainerID,
        config: ResourceConfig,
        path: impl Into<PathBuf>,
    ) -> Self {
        let path = path.into();
        let manager = Self::new(resolver, container_id, config);
        if !path.as_os_str().is_empty() {
            *manager.lock_path() = Some(path);
        }
        manager
    }

    pub fn container_id(&self) -> &ContainerID {
        &self.container_id
    }

    /// Returns the configuration the manager was created with.
    pub fn config(&self) -> &ResourceConfig {
        &self.config
    }

    fn lock_path(&self) -> MutexGuard<'_, Option<PathBuf>> {
        self.path.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Joins the container's allocation group and attaches `pid` to it.
    ///
    /// The group is created if needed. Applying again attaches another pid to the
    /// same group. `None` joins without attaching a process.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if the resource control filesystem is not mounted.
    /// - [`Error::Mount`] if the mount table cannot be read.
    /// - [`Error::CreateDir`] or [`Error::Write`] if joining fails.
    pub fn apply(&self, pid: Option<u32>) -> Result<()> {
        let root = self.resolver.resolve()?;

        let mut path = self.lock_path();
        let joined = group::join(&root, self.container_id().as_ref(), pid)?;
        log::debug!("Container {} joined {}", self.container_id(), joined.display());
        *path = Some(joined);
        Ok(())
    }

    /// Writes the schemas and CPU bitmask of `config` to the allocation group.
    ///
    /// Settings that are absent or empty are left untouched. Writing stops at the
    /// first failure.
    ///
    /// # Errors
    ///
    /// - [`Error::NotJoined`] if there is something to write but no group was joined.
    /// - [`Error::Write`] if a write fails.
    pub fn set(&self, config: &ResourceConfig) -> Result<()> {
        let path = self.lock_path();

        // The schemas file holds one line per resource, e.g.
        //     L3:0=ff;1=c0
        //     MB:0=50;1=70
        // The kernel checks that each capacity bitmask is a contiguous run of bits
        // within the root group's bitmask.
        if let Some(schemas) = config.schemas() {
            group::write_param(joined_dir(&path, SCHEMAS_FILE)?, SCHEMAS_FILE, &schemas)?;
        }

        if let Some(cpus) = config.l3_cache_cpus.as_deref().filter(|cpus| !cpus.is_empty()) {
            group::write_param(joined_dir(&path, CPUS_FILE)?, CPUS_FILE, cpus)?;
        }

        Ok(())
    }

    /// Returns the pids attached to the allocation group.
    ///
    /// # Errors
    ///
    /// - [`Error::NotJoined`] if no group was joined.
    /// - [`Error::FileOpen`] or [`Error::Parse`] if reading the `tasks` file fails.
    pub fn get_pids(&self) -> Result<Vec<u32>> {
        let path = self.lock_path();
        group::read_tasks(joined_dir(&path, TASKS_FILE)?)
    }

    /// Returns a snapshot of the root parameters and, once joined, the group's.
    ///
    /// Either every value is read or the first failure is returned.
    ///
    /// # Errors
    ///
    /// Returns root resolution errors and the first failed parameter read.
    pub fn get_stats(&self) -> Result<Stats> {
        let path = self.lock_path();
        let root = self.resolver.resolve()?;

        let root_stats = collector::read_root_stats(&root)?;
        let group_stats = path
            .as_deref()
            .map(collector::read_group_stats)
            .transpose()?;

        Ok(Stats::new(root_stats, group_stats))
    }

    /// Removes the allocation group and forgets its path.
    ///
    /// Succeeds if no group was joined or the directory is already gone.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Remove`] if the directory cannot be removed; the path is
    /// kept in that case.
    pub fn destroy(&self) -> Result<()> {
        let mut path = self.lock_path();
        if let Some(dir) = path.as_deref() {
            fsutil::remove_group_dir(dir).map_err(|source| Error::Remove {
                path: dir.to_path_buf(),
                source,
            })?;
            log::debug!(
                "Removed allocation group {} of container {}",
                dir.display(),
                self.container_id()
            );
        }
        *path = None;
        Ok(())
    }

    /// Returns the path of the joined allocation group.
    pub fn get_path(&self) -> Option<PathBuf> {
        self.lock_path().clone()
    }
}

fn joined_dir<'a>(path: &'a Option<PathBuf>, file: &str) -> Result<&'a Path> {
    path.as_deref().ok_or_else(|| Error::NotJoined {
        file: file.to_owned(),
    })
}
