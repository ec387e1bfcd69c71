//! Runtime settings for locating and probing the resource control filesystem.
//!
//! | Variable             | Default                |
//! |----------------------|------------------------|
//! | `RDT_MOUNTINFO_PATH` | `/proc/self/mountinfo` |
//! | `RDT_CPUINFO_PATH`   | `/proc/cpuinfo`        |
//! | `RDT_MOUNT_DIR`      | `/sys/fs/rscctrl`      |
//! | `RDT_FS_TYPE`        | `rscctrl`              |

use std::ffi::OsString;
use std::path::PathBuf;

pub const DEFAULT_MOUNTINFO_PATH: &str = "/proc/self/mountinfo";
pub const DEFAULT_CPUINFO_PATH: &str = "/proc/cpuinfo";
pub const DEFAULT_MOUNT_DIR: &str = "/sys/fs/rscctrl";
pub const DEFAULT_FS_TYPE: &str = "rscctrl";

/// Paths and names used to find, probe and mount the resource control filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Mount table scanned for the filesystem root.
    pub mountinfo_path: PathBuf,
    /// CPU information file searched for the `rdt` flag.
    pub cpuinfo_path: PathBuf,
    /// Directory the filesystem is mounted on when it is missing.
    pub mount_dir: PathBuf,
    /// Filesystem type tag in the mount table.
    pub fs_type: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mountinfo_path: PathBuf::from(DEFAULT_MOUNTINFO_PATH),
            cpuinfo_path: PathBuf::from(DEFAULT_CPUINFO_PATH),
            mount_dir: PathBuf::from(DEFAULT_MOUNT_DIR),
            fs_type: DEFAULT_FS_TYPE.to_owned(),
        }
    }
}

impl Settings {
    /// Builds settings from the process environment, falling back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var_os(name))
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<OsString>) -> Self {
        let defaults = Self::default();
        let path = |name, default| lookup(name).map(PathBuf::from).unwrap_or(default);

        let settings = Self {
            mountinfo_path: path("RDT_MOUNTINFO_PATH", defaults.mountinfo_path),
            cpuinfo_path: path("RDT_CPUINFO_PATH", defaults.cpuinfo_path),
            mount_dir: path("RDT_MOUNT_DIR", defaults.mount_dir),
            fs_type: lookup("RDT_FS_TYPE")
                .and_then(|value| value.into_string().ok())
                .filter(|value| !value.is_empty())
                .unwrap_or(defaults.fs_type),
        };
        log::debug!("Settings: {settings:?}");
        settings
    }
}
