use std::num::ParseIntError;
use std::path::PathBuf;

use crate::{config, fsutil, mountinfo};

use super::stats::StatParseError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("mountpoint for `{fs_type}` not found in `{mountinfo}`")]
    NotFound { fs_type: String, mountinfo: PathBuf },
    #[error(transparent)]
    Mount(mountinfo::Error),
    #[error("no such directory for `{file}`")]
    NotJoined { file: String },
    #[error(transparent)]
    Config(#[from] config::Error),
    #[error("failed to create directory `{path}`: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    FileOpen(#[from] fsutil::FileOpenError),
    #[error("failed to write `{data}` to `{path}`: {source}")]
    Write {
        path: PathBuf,
        data: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to remove `{path}`: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to parse `{value}` as a uint from file `{path}`: {source}")]
    ParseUint {
        value: String,
        path: PathBuf,
        #[source]
        source: ParseIntError,
    },
    #[error("failed to parse file `{path}`: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: StatParseError,
    },
}

impl Error {
    /// Returns `true` if the resource control filesystem is not mounted.
    ///
    /// Callers use this to tell "feature unavailable" apart from real failures.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

impl From<mountinfo::Error> for Error {
    fn from(err: mountinfo::Error) -> Self {
        match err {
            mountinfo::Error::MissingMount { path, fs_type } => Error::NotFound {
                fs_type,
                mountinfo: path,
            },
            other => Error::Mount(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
