//! Parsers for the text formats exposed by the resource control filesystem.
//!
//! - [`parse_uint`]: a single decimal value, such as `info/l3/max_cbm_len`.
//! - [`parse_key_value`]: a `key value` line.
//! - [`parse_tasks`]: the newline separated process ids of a `tasks` file.
//!
//! The kernel reports "unset" for some unsigned parameters as a negative number.
//! Such values are read as `0` instead of being rejected.

use std::io::BufRead;
use std::num::{IntErrorKind, ParseIntError};

use super::StatParseError;

/// Parses a decimal `u64`, mapping negative integers to `0`.
///
/// Negative values below `i64::MIN` are mapped to `0` as well.
///
/// # Errors
///
/// Returns the [`ParseIntError`] of the unsigned parse if `src` is neither an unsigned nor a
/// negative integer.
///
/// # Example
///
/// ```
/// use rdt_manager::rdt::stats::parse_uint;
///
/// assert_eq!(parse_uint("20").unwrap(), 20);
/// assert_eq!(parse_uint("-1").unwrap(), 0);
/// assert!(parse_uint("ff").is_err());
/// ```
pub fn parse_uint(src: &str) -> Result<u64, ParseIntError> {
    match src.parse::<u64>() {
        Ok(value) => Ok(value),
        Err(err) => match src.parse::<i64>() {
            Ok(value) if value < 0 => Ok(0),
            Err(int_err) if *int_err.kind() == IntErrorKind::NegOverflow => Ok(0),
            _ => Err(err),
        },
    }
}

/// Parses a `key value` line into its key and unsigned value.
///
/// # Errors
///
/// - [`StatParseError::InvalidFormat`] if the line does not hold exactly two tokens.
/// - [`StatParseError::InvalidKeyValue`] if the value is not an integer.
pub fn parse_key_value(line: &str) -> Result<(&str, u64), StatParseError> {
    let mut parts = line.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(key), Some(value), None) => {
            let parsed = parse_uint(value).map_err(|source| StatParseError::InvalidKeyValue {
                key: key.to_owned(),
                value: value.to_owned(),
                source,
            })?;
            Ok((key, parsed))
        }
        _ => Err(StatParseError::InvalidFormat {
            line: line.to_owned(),
        }),
    }
}

/// Reads the process ids listed one per line in a `tasks` file.
///
/// Blank lines are skipped; every other line must be a process id.
///
/// # Errors
///
/// - [`StatParseError::Io`] if reading fails.
/// - [`StatParseError::InvalidTask`] on the first line that is not a process id.
pub fn parse_tasks<R: BufRead>(mut reader: R) -> Result<Vec<u32>, StatParseError> {
    let mut pids = Vec::new();
    let mut line = String::new();
    let mut lineno = 0;

    while reader.read_line(&mut line)? != 0 {
        lineno += 1;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            let pid = trimmed
                .parse::<u32>()
                .map_err(|source| StatParseError::InvalidTask {
                    value: trimmed.to_owned(),
                    line: lineno,
                    source,
                })?;
            pids.push(pid);
        }
        line.clear();
    }

    Ok(pids)
}
