//! Mount table inspection.
//!
//! Locates the mount point of a filesystem type in a Linux `mountinfo` file.
mod detect;
mod error;
mod parser;

pub use detect::{find_mount_point, find_validated_mount_point};
pub use error::{Error, Result};
pub use parser::{MountInfo, MountInfoField, ParseError, parse_mount_info_line, unescape_octal};
