use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Write};
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt};
use std::path::{Path, PathBuf};

/// Permission bits used for parameter files written by this crate.
pub const PARAM_FILE_MODE: u32 = 0o700;

/// Permission bits used for allocation group directories.
pub const GROUP_DIR_MODE: u32 = 0o755;

/// Error that occurs when opening a file fails.
#[derive(Debug, thiserror::Error)]
#[error("failed to open file `{path}`: {source}")]
pub struct FileOpenError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Opens a file at the given path and wraps it in a [`BufReader`].
///
/// # Errors
///
/// Returns a [`FileOpenError`] if the file cannot be opened.
///
/// # Example
/// ```no_run
/// # use rdt_manager::fsutil;
/// let reader = fsutil::open_file_reader("/proc/self/mountinfo")?;
/// # Ok::<(), fsutil::FileOpenError>(())
/// ```
pub fn open_file_reader(path: impl AsRef<Path>) -> Result<BufReader<File>, FileOpenError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| FileOpenError {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

/// Overwrites `path` with `data`, creating it with [`PARAM_FILE_MODE`] if absent.
///
/// Pseudo-files of the control filesystem accept one value per `write(2)`, so the
/// whole buffer is handed to the kernel in a single call.
pub fn write_param_file(path: impl AsRef<Path>, data: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(PARAM_FILE_MODE)
        .open(path)?;
    file.write_all(data)
}

/// Creates `path` and any missing ancestors with [`GROUP_DIR_MODE`].
///
/// Succeeds if the directory already exists.
pub fn create_group_dir(path: impl AsRef<Path>) -> io::Result<()> {
    std::fs::DirBuilder::new()
        .recursive(true)
        .mode(GROUP_DIR_MODE)
        .create(path)
}

/// Removes the directory at `path`.
///
/// A plain `rmdir(2)` is tried first: the kernel tears down allocation groups that
/// way and refuses to unlink their pseudo-files. The tree is removed recursively
/// only if `rmdir(2)` reports a non-empty directory; any other failure is returned
/// as is. A path that does not exist counts as removed.
pub fn remove_group_dir(path: impl AsRef<Path>) -> io::Result<()> {
    let path = path.as_ref();
    match std::fs::remove_dir(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::DirectoryNotEmpty => {
            match std::fs::remove_dir_all(path) {
                Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
                res => res,
            }
        }
        Err(err) => Err(err),
    }
}
