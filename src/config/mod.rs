//! Container identity and resource allocation settings.
//!
//! [`ResourceConfig`] carries the values handed down by the container
//! configuration. Apart from the memory bandwidth pairs they are passed to the
//! kernel verbatim; the kernel validates bitmasks when they are written.
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

mod error;

pub use error::{Error, Result};

/// The maximum allowed length for a [`ContainerID`].
const CONTAINER_ID_MAX_LEN: usize = 255;

/// A validated container identifier, used as the allocation group directory name.
///
/// # Examples
///
/// ```
/// # use rdt_manager::config::ContainerID;
/// let container_id = ContainerID::new("web-1").unwrap();
/// assert_eq!(container_id.as_ref(), "web-1");
///
/// assert!(ContainerID::new("../escape").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerID(Arc<str>);

impl ContainerID {
    /// Creates a new `ContainerID` from the given raw id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidContainerID`] if the id is empty, longer than
    /// [`CONTAINER_ID_MAX_LEN`] bytes, `.` or `..`, or contains `/` or a NUL byte.
    pub fn new(src: impl AsRef<str>) -> Result<Self> {
        let src = src.as_ref();
        let reason = if src.is_empty() {
            "must not be empty"
        } else if src.len() > CONTAINER_ID_MAX_LEN {
            "longer than 255 bytes"
        } else if src == "." || src == ".." {
            "must not be a relative directory"
        } else if src.contains(['/', '\0']) {
            "must not contain `/` or NUL"
        } else {
            return Ok(Self(src.into()));
        };

        Err(Error::InvalidContainerID {
            id: src.to_owned(),
            reason,
        })
    }
}

impl AsRef<str> for ContainerID {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ContainerID {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Memory bandwidth percentage for one L3 cache id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemBwSchema {
    pub cache_id: u32,
    pub bw_percentage: u32,
}

impl MemBwSchema {
    pub fn new(cache_id: u32, bw_percentage: u32) -> Self {
        Self {
            cache_id,
            bw_percentage,
        }
    }
}

impl fmt::Display for MemBwSchema {
    /// Formats as `<cache_id>=<bw_percentage>`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.cache_id, self.bw_percentage)
    }
}

impl FromStr for MemBwSchema {
    type Err = Error;

    /// Parses a `<cache_id>=<bw_percentage>` pair.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = |reason| Error::InvalidMemBwSchema {
            schema: s.to_owned(),
            reason,
        };
        let (cache_id, bw_percentage) = s.split_once('=').ok_or_else(|| invalid("missing `=`"))?;
        let cache_id = cache_id
            .parse()
            .map_err(|_| invalid("cache id is not an unsigned integer"))?;
        let bw_percentage = bw_percentage
            .parse()
            .map_err(|_| invalid("bandwidth is not an unsigned integer"))?;

        Ok(Self::new(cache_id, bw_percentage))
    }
}

/// Parses a memory bandwidth schema line such as `MB:0=50;1=70`.
///
/// A trailing `;` is accepted.
///
/// # Errors
///
/// Returns [`Error::InvalidMemBwSchema`] if the `MB:` prefix is missing or any
/// pair is malformed.
pub fn parse_mem_bw_schema(line: &str) -> Result<Vec<MemBwSchema>> {
    let pairs = line
        .trim()
        .strip_prefix("MB:")
        .ok_or_else(|| Error::InvalidMemBwSchema {
            schema: line.to_owned(),
            reason: "missing `MB:` prefix",
        })?;

    pairs
        .split(';')
        .filter(|pair| !pair.is_empty())
        .map(MemBwSchema::from_str)
        .collect()
}

/// Resource allocation settings of a container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Capacity bitmask per L3 cache id, e.g. `L3:0=ff;1=c0`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub l3_cache_schema: Option<String>,
    /// Bitmask of the CPUs bound to the schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub l3_cache_cpus: Option<String>,
    /// Memory bandwidth percentage per L3 cache id.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mem_bw_schema: Vec<MemBwSchema>,
}

impl ResourceConfig {
    /// Returns the `MB:` schema line, or `None` without bandwidth settings.
    pub fn mem_bw_schema_line(&self) -> Option<String> {
        if self.mem_bw_schema.is_empty() {
            return None;
        }
        let pairs: Vec<String> = self.mem_bw_schema.iter().map(ToString::to_string).collect();
        Some(format!("MB:{}", pairs.join(";")))
    }

    /// Returns the content for the `schemas` file: the non-empty L3 schema and the
    /// memory bandwidth line, one per line.
    pub fn schemas(&self) -> Option<String> {
        let lines: Vec<String> = self
            .l3_cache_schema
            .iter()
            .filter(|schema| !schema.is_empty())
            .cloned()
            .chain(self.mem_bw_schema_line())
            .collect();

        (!lines.is_empty()).then(|| lines.join("\n"))
    }

    /// Returns `true` if any setting is present.
    pub fn has_settings(&self) -> bool {
        self.l3_cache_schema.is_some()
            || self.l3_cache_cpus.is_some()
            || !self.mem_bw_schema.is_empty()
    }

    /// Checks the settings against the host's support for resource control.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptySchema`] if a string setting is present but empty.
    /// - [`Error::NotEnabled`] if any setting is present and `enabled` is `false`.
    pub fn validate(&self, enabled: bool) -> Result<()> {
        if self.l3_cache_schema.as_deref() == Some("") {
            return Err(Error::EmptySchema {
                field: "l3_cache_schema",
            });
        }
        if self.l3_cache_cpus.as_deref() == Some("") {
            return Err(Error::EmptySchema {
                field: "l3_cache_cpus",
            });
        }
        if !enabled && self.has_settings() {
            return Err(Error::NotEnabled);
        }
        Ok(())
    }
}
