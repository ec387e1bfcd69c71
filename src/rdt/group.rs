//! Operations on a single allocation group directory.
//!
//! ```text
//! /sys/fs/rscctrl/            <- root of the resource control filesystem
//! ├── info/l3/max_cbm_len     <- read-only metadata
//! ├── schemas                 <- schema of the root group
//! ├── cpus
//! └── <container-id>/         <- allocation group
//!     ├── schemas             <- e.g. "L3:0=f;"
//!     ├── cpus                <- CPU bitmask bound to the schema
//!     └── tasks               <- pids attached to the group
//! ```

use std::path::{Path, PathBuf};

use crate::fsutil;

use super::stats;
use super::{Error, Result};

pub const TASKS_FILE: &str = "tasks";
pub const SCHEMAS_FILE: &str = "schemas";
pub const CPUS_FILE: &str = "cpus";

/// Creates the group `name` below `root` if needed and attaches `pid` to it.
///
/// With `pid == None` only the directory is created.
///
/// # Errors
///
/// - [`Error::CreateDir`] if the directory cannot be created.
/// - [`Error::Write`] if the pid cannot be written to the `tasks` file.
pub fn join(root: &Path, name: &str, pid: Option<u32>) -> Result<PathBuf> {
    let path = root.join(name);
    fsutil::create_group_dir(&path).map_err(|source| Error::CreateDir {
        path: path.clone(),
        source,
    })?;

    write_tasks(&path, pid)?;
    log::debug!("Joined allocation group {} with pid {:?}", path.display(), pid);
    Ok(path)
}

/// Attaches `pid` to the group at `dir`. Nothing is written for `None`.
///
/// # Errors
///
/// - [`Error::NotJoined`] if `dir` is empty.
/// - [`Error::Write`] if the write fails.
pub fn write_tasks(dir: &Path, pid: Option<u32>) -> Result<()> {
    match pid {
        Some(pid) => write_param(dir, TASKS_FILE, &pid.to_string()),
        None if dir.as_os_str().is_empty() => Err(Error::NotJoined {
            file: TASKS_FILE.to_owned(),
        }),
        None => Ok(()),
    }
}

/// Returns the pids attached to the group at `dir`.
///
/// # Errors
///
/// - [`Error::FileOpen`] if the `tasks` file cannot be opened.
/// - [`Error::Parse`] if a line is not a pid.
pub fn read_tasks(dir: &Path) -> Result<Vec<u32>> {
    let path = dir.join(TASKS_FILE);
    let reader = fsutil::open_file_reader(&path)?;
    stats::parse_tasks(reader).map_err(|source| Error::Parse { path, source })
}

/// Overwrites the parameter `file` of the group at `dir` with `data`.
///
/// # Errors
///
/// - [`Error::NotJoined`] if `dir` is empty.
/// - [`Error::Write`] carrying the target and the data if the write fails.
pub fn write_param(dir: &Path, file: &str, data: &str) -> Result<()> {
    if dir.as_os_str().is_empty() {
        return Err(Error::NotJoined {
            file: file.to_owned(),
        });
    }

    let path = dir.join(file);
    log::trace!("Writing `{}` to {}", data, path.display());
    fsutil::write_param_file(&path, data.as_bytes()).map_err(|source| Error::Write {
        path,
        data: data.to_owned(),
        source,
    })
}

/// Reads the parameter `file` below `dir` with surrounding whitespace trimmed.
///
/// # Errors
///
/// Returns [`Error::Read`] if the file cannot be read.
pub fn read_param_string(dir: &Path, file: &str) -> Result<String> {
    let path = dir.join(file);
    let contents = std::fs::read_to_string(&path).map_err(|source| Error::Read { path, source })?;
    Ok(contents.trim().to_owned())
}

/// Reads the parameter `file` below `dir` as an unsigned integer.
///
/// Negative values are read as `0`, see [`stats::parse_uint`].
///
/// # Errors
///
/// - [`Error::Read`] if the file cannot be read.
/// - [`Error::ParseUint`] naming the raw text and the file if it is not an integer.
pub fn read_param_uint(dir: &Path, file: &str) -> Result<u64> {
    let contents = read_param_string(dir, file)?;
    stats::parse_uint(&contents).map_err(|source| Error::ParseUint {
        value: contents.clone(),
        path: dir.join(file),
        source,
    })
}
