use std::path::Path;

use super::group::{self, CPUS_FILE, SCHEMAS_FILE};
use super::stats::{GroupStats, RootStats};
use super::Result;

const INFO_DIR: &str = "info";
const INFO_FILE: &str = "info";
const L3_INFO_DIR: &str = "l3";
const DOMAIN_TO_CACHE_ID_FILE: &str = "domain_to_cache_id";
const MAX_CBM_LEN_FILE: &str = "max_cbm_len";
const MAX_CLOSID_FILE: &str = "max_closid";

/// Reads the read-only parameters at the root of the resource control filesystem.
///
/// The first failing read aborts collection and is returned as-is.
///
/// # Errors
///
/// Returns [`super::Error::Read`] or [`super::Error::ParseUint`] for the first
/// parameter that could not be read.
pub fn read_root_stats(root: &Path) -> Result<RootStats> {
    let info_dir = root.join(INFO_DIR);
    let info = group::read_param_string(&info_dir, INFO_FILE)?;

    let l3_dir = info_dir.join(L3_INFO_DIR);
    let domain_to_cache_id = group::read_param_string(&l3_dir, DOMAIN_TO_CACHE_ID_FILE)?;
    let max_cbm_len = group::read_param_uint(&l3_dir, MAX_CBM_LEN_FILE)?;
    let max_closid = group::read_param_uint(&l3_dir, MAX_CLOSID_FILE)?;

    let root_l3_cache_schema = group::read_param_string(root, SCHEMAS_FILE)?;
    let root_l3_cache_cpus = group::read_param_string(root, CPUS_FILE)?;

    Ok(RootStats::new(
        info,
        domain_to_cache_id,
        max_cbm_len,
        max_closid,
        root_l3_cache_schema,
        root_l3_cache_cpus,
    ))
}

/// Reads the schema and CPU bitmask of the allocation group at `path`.
///
/// # Errors
///
/// Returns [`super::Error::Read`] for the first parameter that could not be read.
pub fn read_group_stats(path: &Path) -> Result<GroupStats> {
    let l3_cache_schema = group::read_param_string(path, SCHEMAS_FILE)?;
    let l3_cache_cpus = group::read_param_string(path, CPUS_FILE)?;
    Ok(GroupStats::new(l3_cache_schema, l3_cache_cpus))
}

/// Test helpers building a fake resource control filesystem.
#[cfg(test)]
pub(crate) mod fake {
    use std::path::{Path, PathBuf};

    use super::*;

    /// Populates `root` with the root parameters read by [`read_root_stats`].
    pub fn populate_root(root: &Path) {
        let l3_dir = root.join(INFO_DIR).join(L3_INFO_DIR);
        std::fs::create_dir_all(&l3_dir).unwrap();
        std::fs::write(root.join(INFO_DIR).join(INFO_FILE), "L3 allocation\n").unwrap();
        std::fs::write(l3_dir.join(DOMAIN_TO_CACHE_ID_FILE), "0:0\n1:1\n").unwrap();
        std::fs::write(l3_dir.join(MAX_CBM_LEN_FILE), "20\n").unwrap();
        std::fs::write(l3_dir.join(MAX_CLOSID_FILE), "4\n").unwrap();
        std::fs::write(root.join(SCHEMAS_FILE), "L3:0=fffff;\n").unwrap();
        std::fs::write(root.join(CPUS_FILE), "ffff\n").unwrap();
    }

    /// Writes a mount table listing `root` as the `rscctrl` mount and returns its path.
    pub fn write_mountinfo(dir: &Path, root: &Path) -> PathBuf {
        let path = dir.join("mountinfo");
        std::fs::write(
            &path,
            format!(
                "25 1 0:24 / /proc rw,relatime - proc proc rw\n\
                 98 22 0:45 / {} rw,relatime - rscctrl rscctrl rw\n",
                root.display()
            ),
        )
        .unwrap();
        path
    }

    pub fn l3_dir(root: &Path) -> PathBuf {
        root.join(INFO_DIR).join(L3_INFO_DIR)
    }
}
