//! Point-in-time snapshots of the resource control filesystem.
//!
//! A [`Stats`] snapshot combines the read-only parameters found at the root of the
//! filesystem ([`RootStats`]) with the parameters of one allocation group
//! ([`GroupStats`]). Snapshots are assembled by [`crate::rdt::read_root_stats`] and
//! [`crate::rdt::Manager::get_stats`] and never change afterwards.

mod error;
mod parser;

pub use error::StatParseError;
pub use parser::{parse_key_value, parse_tasks, parse_uint};

use serde::Serialize;

fn is_zero(value: &u64) -> bool {
    *value == 0
}

/// Read-only parameters from the root of the resource control filesystem.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RootStats {
    #[serde(skip_serializing_if = "String::is_empty")]
    info: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    domain_to_cache_id: String,
    #[serde(skip_serializing_if = "is_zero")]
    max_cbm_len: u64,
    #[serde(skip_serializing_if = "is_zero")]
    max_closid: u64,
    #[serde(skip_serializing_if = "String::is_empty")]
    root_l3_cache_schema: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    root_l3_cache_cpus: String,
}

impl RootStats {
    pub(crate) fn new(
        info: String,
        domain_to_cache_id: String,
        max_cbm_len: u64,
        max_closid: u64,
        root_l3_cache_schema: String,
        root_l3_cache_cpus: String,
    ) -> Self {
        Self {
            info,
            domain_to_cache_id,
            max_cbm_len,
            max_closid,
            root_l3_cache_schema,
            root_l3_cache_cpus,
        }
    }

    /// Returns the generic feature information from `info/info`.
    pub fn info(&self) -> &str {
        &self.info
    }

    /// Returns the mapping of cache domains to L3 cache ids.
    pub fn domain_to_cache_id(&self) -> &str {
        &self.domain_to_cache_id
    }

    /// Returns the number of bits in a full capacity bitmask.
    pub fn max_cbm_len(&self) -> u64 {
        self.max_cbm_len
    }

    /// Returns the maximum number of allocation groups.
    pub fn max_closid(&self) -> u64 {
        self.max_closid
    }

    /// Returns the schema of the root group, which covers the whole cache.
    pub fn root_l3_cache_schema(&self) -> &str {
        &self.root_l3_cache_schema
    }

    /// Returns the CPU bitmask of the root group.
    pub fn root_l3_cache_cpus(&self) -> &str {
        &self.root_l3_cache_cpus
    }
}

/// Parameters of a single allocation group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupStats {
    #[serde(skip_serializing_if = "String::is_empty")]
    l3_cache_schema: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    l3_cache_cpus: String,
}

impl GroupStats {
    pub(crate) fn new(l3_cache_schema: String, l3_cache_cpus: String) -> Self {
        Self {
            l3_cache_schema,
            l3_cache_cpus,
        }
    }

    pub fn l3_cache_schema(&self) -> &str {
        &self.l3_cache_schema
    }

    pub fn l3_cache_cpus(&self) -> &str {
        &self.l3_cache_cpus
    }
}

/// A complete snapshot of root and allocation group parameters.
///
/// `group` is `None` when the snapshot was taken before the manager joined a group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    #[serde(rename = "intel_rdt_root_stats")]
    root: RootStats,
    #[serde(
        rename = "intel_rdt_sub_stats",
        skip_serializing_if = "Option::is_none"
    )]
    group: Option<GroupStats>,
}

impl Stats {
    pub(crate) fn new(root: RootStats, group: Option<GroupStats>) -> Self {
        Self { root, group }
    }

    pub fn root(&self) -> &RootStats {
        &self.root
    }

    pub fn group(&self) -> Option<&GroupStats> {
        self.group.as_ref()
    }
}
