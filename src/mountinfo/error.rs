use std::path::PathBuf;

use crate::fsutil;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    FileOpen(#[from] fsutil::FileOpenError),
    #[error("failed to read line for file `{path}`: {source}")]
    ReadLine {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("mountpoint for `{fs_type}` not found in file `{path}`")]
    MissingMount { path: PathBuf, fs_type: String },
    #[error("failed to parse line in file `{path}`: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: super::parser::ParseError,
    },
    #[error("failed to read metadata of mount path `{path}`: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("mount path `{path}` is not a directory")]
    NotADirectory { path: PathBuf },
}

impl Error {
    /// Returns `true` if the mount table was read successfully but holds no entry
    /// for the requested filesystem type.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::MissingMount { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
