//! Mountinfo line parser for Linux systems.
//!
//! Parses lines in `/proc/[pid]/mountinfo` format. See
//! [`proc_pid_mountinfo(5)`](https://man7.org/linux/man-pages/man5/proc_pid_mountinfo.5.html)
//! for details on the structure.
//!
//! Lines are handled as raw bytes: mount points are arbitrary byte strings and the
//! kernel only escapes space, tab, newline and backslash in them.
//!
//! Only the filesystem type is required for every line. The remaining
//! post-separator fields and the mount point are validated on demand, so a
//! caller can reject a malformed entry for the filesystem it is looking for
//! without tripping over unrelated entries.

use std::borrow::Cow;
use std::ffi::OsString;
use std::os::unix::ffi::OsStringExt;
use std::path::PathBuf;

const SEPARATOR: &[u8] = b" - ";

/// Represents a parsed mountinfo line.
#[derive(Debug, PartialEq, Eq)]
pub struct MountInfo<'a> {
    line: &'a [u8],
    /// Fields before the ` - ` separator, mount point still escaped.
    pre_fields: Vec<&'a [u8]>,
    /// Filesystem type (e.g., `ext4`, `rscctrl`).
    pub fs_type: &'a [u8],
    /// Source of the mount (e.g., device).
    pub source: Option<&'a [u8]>,
    /// Superblock options.
    pub super_options: Option<&'a [u8]>,
}

/// Named fields in a mountinfo line.
#[derive(Debug)]
pub enum MountInfoField {
    MountPoint,
    FsType,
    Source,
    SuperOptions,
}

impl std::fmt::Display for MountInfoField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MountInfoField::MountPoint => "mount_point",
            MountInfoField::FsType => "fs_type",
            MountInfoField::Source => "source",
            MountInfoField::SuperOptions => "super_options",
        };
        write!(f, "{name}")
    }
}

/// Errors that may occur when parsing a mountinfo line.
///
/// The offending line is kept lossily decoded for display.
#[derive(Debug, thiserror::Error)]
#[allow(clippy::enum_variant_names)]
pub enum ParseError {
    #[error("missing separator ` - ` in line: `{0}`")]
    MissingSeparator(String),

    #[error("missing `{field}` in pre-separator section of line: `{line}`")]
    MissingPreSeparatorField { field: MountInfoField, line: String },

    #[error("missing `{field}` in post-separator section of line: `{line}`")]
    MissingPostSeparatorField { field: MountInfoField, line: String },
}

impl<'a> MountInfo<'a> {
    /// Returns the decoded mount point (the fifth pre-separator field).
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::MissingPreSeparatorField`] if the line has fewer than five
    /// fields before the separator.
    pub fn mount_point(&self) -> Result<PathBuf, ParseError> {
        let raw = self
            .pre_fields
            .get(4)
            .ok_or_else(|| ParseError::MissingPreSeparatorField {
                field: MountInfoField::MountPoint,
                line: lossy(self.line),
            })?;
        Ok(PathBuf::from(OsString::from_vec(
            unescape_octal(raw).into_owned(),
        )))
    }

    /// Checks that the filesystem type is followed by source and superblock options.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::MissingPostSeparatorField`] naming the first absent field.
    pub fn require_post_fields(&self) -> Result<(), ParseError> {
        let missing = if self.source.is_none() {
            MountInfoField::Source
        } else if self.super_options.is_none() {
            MountInfoField::SuperOptions
        } else {
            return Ok(());
        };
        Err(ParseError::MissingPostSeparatorField {
            field: missing,
            line: lossy(self.line),
        })
    }
}

fn lossy(line: &[u8]) -> String {
    String::from_utf8_lossy(line).into_owned()
}

fn fields(bytes: &[u8]) -> impl Iterator<Item = &[u8]> {
    bytes
        .split(u8::is_ascii_whitespace)
        .filter(|field| !field.is_empty())
}

/// Parses a single line of mountinfo data.
///
/// # Errors
///
/// Returns [`ParseError::MissingSeparator`] if the line has no ` - ` token and
/// [`ParseError::MissingPostSeparatorField`] if nothing follows the separator.
pub fn parse_mount_info_line(mut line: &[u8]) -> Result<MountInfo<'_>, ParseError> {
    while let [rest @ .., b'\n' | b'\r'] = line {
        line = rest;
    }

    let split_at = line
        .windows(SEPARATOR.len())
        .position(|window| window == SEPARATOR)
        .ok_or_else(|| ParseError::MissingSeparator(lossy(line)))?;
    let pre = &line[..split_at];
    let post = &line[split_at + SEPARATOR.len()..];

    let mut post_fields = fields(post);
    let fs_type = post_fields
        .next()
        .ok_or_else(|| ParseError::MissingPostSeparatorField {
            field: MountInfoField::FsType,
            line: lossy(line),
        })?;

    Ok(MountInfo {
        line,
        pre_fields: fields(pre).collect(),
        fs_type,
        source: post_fields.next(),
        super_options: post_fields.next(),
    })
}

/// Decodes the `\NNN` octal escapes the kernel uses for space, tab, newline and
/// backslash in mountinfo path fields. Other bytes are passed through unchanged.
pub fn unescape_octal(field: &[u8]) -> Cow<'_, [u8]> {
    if !field.contains(&b'\\') {
        return Cow::Borrowed(field);
    }

    let mut out = Vec::with_capacity(field.len());
    let mut i = 0;
    while i < field.len() {
        if field[i] == b'\\'
            && i + 3 < field.len()
            && field[i + 1..=i + 3].iter().all(|b| (b'0'..=b'7').contains(b))
        {
            let value = (field[i + 1] - b'0') as u32 * 64
                + (field[i + 2] - b'0') as u32 * 8
                + (field[i + 3] - b'0') as u32;
            if let Ok(byte) = u8::try_from(value) {
                out.push(byte);
                i += 4;
                continue;
            }
        }
        out.push(field[i]);
        i += 1;
    }

    Cow::Owned(out)
}
