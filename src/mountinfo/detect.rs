use crate::fsutil;

use super::parser::parse_mount_info_line;
use super::{Error, Result};
use std::io::BufRead;
use std::path::{Path, PathBuf};

/// Finds the mount point of `fs_type` and checks that it exists as a directory.
///
/// # Arguments
///
/// * `path` - Path to a Linux `mountinfo` file.
/// * `fs_type` - Filesystem type tag to look for, e.g. `rscctrl`.
///
/// # Errors
///
/// Returns errors from [`find_mount_point`] and:
///
/// - [`Error::Metadata`] if the mount point cannot be accessed.
/// - [`Error::NotADirectory`] if the mount point is not a directory.
///
/// # Example
///
/// ```no_run
/// use rdt_manager::mountinfo::find_validated_mount_point;
///
/// let root = find_validated_mount_point("/proc/self/mountinfo", "rscctrl").unwrap();
/// println!("control root: {}", root.display());
/// ```
pub fn find_validated_mount_point(path: impl AsRef<Path>, fs_type: &str) -> Result<PathBuf> {
    let mount_point = find_mount_point(path, fs_type)?;

    let metadata = std::fs::metadata(&mount_point).map_err(|source| Error::Metadata {
        path: mount_point.clone(),
        source,
    })?;

    if !metadata.is_dir() {
        return Err(Error::NotADirectory { path: mount_point });
    }

    Ok(mount_point)
}

/// Finds the mount point of `fs_type` by parsing a Linux `mountinfo` file.
///
/// The first matching entry wins. Lines are compared as bytes, so mount points
/// that are not valid UTF-8 are tolerated and returned unchanged. Scanning stops
/// at the first malformed line: an entry that cannot be classified could be the
/// one being looked for.
///
/// # Errors
///
/// - [`Error::FileOpen`] if the file can't be opened.
/// - [`Error::ReadLine`] if reading from the file fails.
/// - [`Error::Parse`] if a line is malformed, or the matching entry lacks the
///   source and superblock option fields or a mount point.
/// - [`Error::MissingMount`] if no entry has the requested type.
pub fn find_mount_point(path: impl AsRef<Path>, fs_type: &str) -> Result<PathBuf> {
    let path = path.as_ref();
    let buf = fsutil::open_file_reader(path)?;

    find_mount_point_from_reader(buf, path, fs_type)
}

fn find_mount_point_from_reader<R: BufRead>(
    mut reader: R,
    origin: &Path,
    fs_type: &str,
) -> Result<PathBuf> {
    let parse_err = |source| Error::Parse {
        path: origin.to_path_buf(),
        source,
    };
    let mut line = Vec::with_capacity(256);

    while reader
        .read_until(b'\n', &mut line)
        .map_err(|source| Error::ReadLine {
            path: origin.to_path_buf(),
            source,
        })?
        != 0
    {
        let mount_info = parse_mount_info_line(&line).map_err(parse_err)?;
        if mount_info.fs_type == fs_type.as_bytes() {
            mount_info.require_post_fields().map_err(parse_err)?;
            let mount_point = mount_info.mount_point().map_err(parse_err)?;
            log::debug!("Found `{fs_type}` mount point: {}", mount_point.display());
            return Ok(mount_point);
        }

        line.clear();
    }

    Err(Error::MissingMount {
        path: origin.to_path_buf(),
        fs_type: fs_type.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mountinfo::ParseError;
    use std::ffi::OsStr;
    use std::io::Cursor;
    use std::io::Write;
    use std::os::unix::ffi::OsStrExt;
    use tempfile::NamedTempFile;

    fn new_cursor_from_contents(contents: impl AsRef<[u8]>) -> Cursor<Vec<u8>> {
        Cursor::new(contents.as_ref().to_vec())
    }

    #[test]
    fn test_find_single_mount() {
        let input = "\
25 1 0:24 / /proc rw,relatime - proc proc rw
98 22 0:45 / /sys/fs/rscctrl rw,relatime - rscctrl rscctrl rw
";
        let path = Path::new("/dummy");
        let reader = new_cursor_from_contents(input);

        let mount = find_mount_point_from_reader(reader, path, "rscctrl").unwrap();
        assert_eq!(mount, PathBuf::from("/sys/fs/rscctrl"));
    }

    #[test]
    fn test_find_first_of_multiple_mounts() {
        let input = "\
43 35 0:39 / /sys/fs/rscctrl rw - rscctrl rscctrl rw
42 35 0:39 / /ignored rw - rscctrl rscctrl rw
";
        let path = Path::new("/dummy");
        let reader = new_cursor_from_contents(input);

        let mount = find_mount_point_from_reader(reader, path, "rscctrl").unwrap();
        assert_eq!(mount, PathBuf::from("/sys/fs/rscctrl"));
    }

    #[test]
    fn test_find_missing_mount() {
        let input = "25 1 0:24 / /proc rw,relatime - proc proc rw\n";
        let path = Path::new("/dummy");
        let reader = new_cursor_from_contents(input);

        let err = find_mount_point_from_reader(reader, path, "rscctrl").unwrap_err();
        assert!(err.is_not_found());
        match err {
            Error::MissingMount {
                path: err_path,
                fs_type,
            } => {
                assert_eq!(err_path, path);
                assert_eq!(fs_type, "rscctrl");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_find_in_empty_table() {
        let reader = new_cursor_from_contents("");
        let err = find_mount_point_from_reader(reader, Path::new("/dummy"), "rscctrl").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_matching_line_with_short_post_section() {
        let input = "98 22 0:45 / /sys/fs/rscctrl rw - rscctrl rscctrl\n";
        let reader = new_cursor_from_contents(input);

        let err = find_mount_point_from_reader(reader, Path::new("/dummy"), "rscctrl").unwrap_err();
        assert!(!err.is_not_found());
        match err {
            Error::Parse {
                source: ParseError::MissingPostSeparatorField { .. },
                ..
            } => {}
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_short_post_section_on_other_type_is_tolerated() {
        let input = "\
25 1 0:24 / /proc rw - proc
98 22 0:45 / /sys/fs/rscctrl rw - rscctrl rscctrl rw
";
        let reader = new_cursor_from_contents(input);
        let mount = find_mount_point_from_reader(reader, Path::new("/dummy"), "rscctrl").unwrap();
        assert_eq!(mount, PathBuf::from("/sys/fs/rscctrl"));
    }

    #[test]
    fn test_line_without_post_fields_fails_fast() {
        let input = "\
25 1 0:24 / /proc rw -
98 22 0:45 / /sys/fs/rscctrl rw - rscctrl rscctrl rw
";
        let path = Path::new("/dummy");
        let reader = new_cursor_from_contents(input);

        let err = find_mount_point_from_reader(reader, path, "rscctrl").unwrap_err();
        match err {
            Error::Parse { path: err_path, .. } => assert_eq!(err_path, path),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_find_invalid_line() {
        let input = "invalid mountinfo line";
        let path = Path::new("/dummy");
        let reader = new_cursor_from_contents(input);

        let err = find_mount_point_from_reader(reader, path, "rscctrl").unwrap_err();
        match err {
            Error::Parse { path: err_path, .. } => assert_eq!(err_path, path),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_find_from_tempfile() {
        let mut tmp = NamedTempFile::new().unwrap();
        writeln!(
            tmp,
            "98 22 0:45 / /sys/fs/rscctrl rw,relatime shared:50 - rscctrl rscctrl rw"
        )
        .unwrap();

        let mount = find_mount_point(tmp.path(), "rscctrl").unwrap();
        assert_eq!(mount, PathBuf::from("/sys/fs/rscctrl"));
    }

    #[test]
    fn test_find_missing_mountinfo_file() {
        let err = find_mount_point("/definitely/does/not/exist", "rscctrl").unwrap_err();
        assert!(matches!(err, Error::FileOpen(_)));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_find_validated_mount_point() {
        let tempdir = tempfile::tempdir().unwrap();
        let tmpfile = NamedTempFile::new().unwrap();
        writeln!(
            &mut tmpfile.as_file(),
            "1 2 0:42 / {} rw - rscctrl rscctrl rw",
            tempdir.path().display()
        )
        .unwrap();

        let resolved = find_validated_mount_point(tmpfile.path(), "rscctrl").unwrap();
        assert_eq!(resolved, tempdir.path());
    }

    #[test]
    fn test_find_validated_mount_point_not_directory() {
        let tempdir = tempfile::tempdir().unwrap();
        let file_path = tempdir.path().join("file");
        std::fs::write(&file_path, "content").unwrap();

        let tmpfile = NamedTempFile::new().unwrap();
        writeln!(
            &mut tmpfile.as_file(),
            "1 2 0:42 / {} rw - rscctrl rscctrl rw",
            file_path.display()
        )
        .unwrap();

        let err = find_validated_mount_point(tmpfile.path(), "rscctrl").unwrap_err();
        assert!(matches!(err, Error::NotADirectory { .. }));
    }

    #[test]
    fn test_find_validated_mount_point_missing_path() {
        let tempdir = tempfile::tempdir().unwrap();
        let target = tempdir.path().join("non_existent");

        let tmpfile = NamedTempFile::new().unwrap();
        writeln!(
            &mut tmpfile.as_file(),
            "1 2 0:42 / {} rw - rscctrl rscctrl rw",
            target.display()
        )
        .unwrap();

        let err = find_validated_mount_point(tmpfile.path(), "rscctrl").unwrap_err();
        match err {
            Error::Metadata { source, .. } => {
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound)
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_non_utf8_unrelated_mount_is_skipped() {
        let input = b"\
25 1 0:24 / /mnt/caf\xE9 rw - ext4 /dev/sda1 rw
98 22 0:45 / /sys/fs/rscctrl rw - rscctrl rscctrl rw
";
        let reader = new_cursor_from_contents(input);

        let mount = find_mount_point_from_reader(reader, Path::new("/dummy"), "rscctrl").unwrap();
        assert_eq!(mount, PathBuf::from("/sys/fs/rscctrl"));
    }

    #[test]
    fn test_non_utf8_mount_point_is_kept() {
        let input = b"98 22 0:45 / /sys/fs/rsc\xFFctrl rw - rscctrl rscctrl rw\n";
        let reader = new_cursor_from_contents(input);

        let mount = find_mount_point_from_reader(reader, Path::new("/dummy"), "rscctrl").unwrap();
        assert_eq!(mount, Path::new(OsStr::from_bytes(b"/sys/fs/rsc\xFFctrl")));
    }

    #[test]
    fn test_find_validated_non_utf8_mount_point() {
        let tempdir = tempfile::tempdir().unwrap();
        let target = tempdir.path().join(OsStr::from_bytes(b"caf\xE9"));
        std::fs::create_dir(&target).unwrap();

        let tmpfile = NamedTempFile::new().unwrap();
        let mut line = b"1 2 0:42 / ".to_vec();
        line.extend_from_slice(target.as_os_str().as_bytes());
        line.extend_from_slice(b" rw - rscctrl rscctrl rw\n");
        tmpfile.as_file().write_all(&line).unwrap();

        let resolved = find_validated_mount_point(tmpfile.path(), "rscctrl").unwrap();
        assert_eq!(resolved, target);
    }
}
