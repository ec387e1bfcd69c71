use super::{Error, Result};
use std::io::BufRead;
use std::path::Path;

use nix::mount::MsFlags;

use crate::fsutil;

/// CPU flag announcing that hardware and kernel support resource control.
pub const RDT_CPU_FLAG: &str = "rdt";

/// Mounts a filesystem of a given type.
///
/// [`SyscallMounter`] issues `mount(2)`; tests substitute their own implementation.
pub trait Mounter {
    fn mount(&self, fs_type: &str, target: &Path) -> nix::Result<()>;
}

/// [`Mounter`] backed by the `mount(2)` system call.
#[derive(Debug, Default, Clone, Copy)]
pub struct SyscallMounter;

impl Mounter for SyscallMounter {
    fn mount(&self, fs_type: &str, target: &Path) -> nix::Result<()> {
        nix::mount::mount(
            Some(fs_type),
            target,
            Some(fs_type),
            MsFlags::empty(),
            None::<&str>,
        )
    }
}

/// Returns true if any line of the CPU information file at `path` contains the
/// whitespace separated token `flag`.
///
/// # Errors
///
/// * [`Error::FileOpen`] if the file cannot be opened.
/// * [`Error::ReadLine`] if a line from the file cannot be read.
pub fn cpu_has_flag(path: impl AsRef<Path>, flag: &str) -> Result<bool> {
    let path = path.as_ref();
    let mut buf = fsutil::open_file_reader(path).map_err(|err| Error::FileOpen {
        path: err.path,
        source: err.source,
    })?;

    let mut line = String::with_capacity(1024);

    while buf.read_line(&mut line).map_err(|source| Error::ReadLine {
        path: path.to_path_buf(),
        source,
    })? != 0
    {
        if line.split_whitespace().any(|token| token == flag) {
            return Ok(true);
        }

        line.clear();
    }

    Ok(false)
}

/// Creates `mount_dir` if needed and mounts the `fs_type` filesystem on it.
///
/// # Errors
///
/// * [`Error::CreateMountDir`] if the directory cannot be created.
/// * [`Error::Mount`] if mounting fails.
pub fn mount_control_fs(mount_dir: &Path, fs_type: &str, mounter: &impl Mounter) -> Result<()> {
    std::fs::create_dir_all(mount_dir).map_err(|source| Error::CreateMountDir {
        path: mount_dir.to_path_buf(),
        source,
    })?;

    mounter
        .mount(fs_type, mount_dir)
        .map_err(|source| Error::Mount {
            fs_type: fs_type.to_owned(),
            target: mount_dir.to_path_buf(),
            source,
        })?;
    log::debug!("Mounted `{fs_type}` at {}", mount_dir.display());
    Ok(())
}

#[cfg(test)]
pub(super) mod fake {
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    use super::Mounter;

    /// Records mount requests and answers them with a fixed outcome.
    #[derive(Debug, Default)]
    pub struct FakeMounter {
        pub fail: bool,
        pub calls: Mutex<Vec<(String, PathBuf)>>,
    }

    impl FakeMounter {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        pub fn calls(&self) -> Vec<(String, PathBuf)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Mounter for FakeMounter {
        fn mount(&self, fs_type: &str, target: &Path) -> nix::Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push((fs_type.to_owned(), target.to_path_buf()));
            if self.fail {
                Err(nix::errno::Errno::EPERM)
            } else {
                Ok(())
            }
        }
    }
}
