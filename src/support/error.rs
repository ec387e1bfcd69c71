use std::path::PathBuf;

/// Errors that may occur while probing for resource control support.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to open file `{path}`: {source}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read line for file `{path}`: {source}")]
    ReadLine {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to create mount directory `{path}`: {source}")]
    CreateMountDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to mount `{fs_type}` at `{target}`: {source}")]
    Mount {
        fs_type: String,
        target: PathBuf,
        #[source]
        source: nix::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
