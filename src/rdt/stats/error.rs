//! Defines structured error types for parsing resource control parameter files.
//!
//! - [`StatParseError::InvalidKeyValue`]: the value of a `key value` line failed to parse.
//! - [`StatParseError::InvalidFormat`]: a `key value` line had the wrong number of tokens.
//! - [`StatParseError::InvalidTask`]: a line of a `tasks` file is not a process id.
//! - [`StatParseError::Io`]: wraps underlying I/O errors during reads.

use std::num::ParseIntError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatParseError {
    #[error("unable to convert param value '{value}' of '{key}' to uint64: {source}")]
    InvalidKeyValue {
        key: String,
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("line is not a valid key value format: '{line}'")]
    InvalidFormat { line: String },

    #[error("invalid task id at line {line}: '{value}': {source}")]
    InvalidTask {
        value: String,
        line: usize,
        #[source]
        source: ParseIntError,
    },

    #[error("error during I/O: {0}")]
    Io(#[from] std::io::Error),
}
