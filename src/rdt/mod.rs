//! Per-container cache and memory bandwidth allocation through the resource
//! control filesystem.
//!
//! # Key Components
//!
//! - [`RootResolver`]: finds and caches the filesystem root, shared by all managers.
//! - [`Manager`]: joins, configures, inspects and removes one container's
//!   allocation group.
//! - [`group`]: the directory level operations the manager is built from.
//! - [`stats`]: snapshot types and the parsers for the kernel's text formats.
//!
//! # Files
//!
//! - `info/info`, `info/l3/{domain_to_cache_id,max_cbm_len,max_closid}` at the root
//! - `schemas` and `cpus` at the root and in every allocation group
//! - `tasks` in every allocation group
mod collector;
mod error;
pub mod group;
mod manager;
mod root;
pub mod stats;

pub use collector::{read_group_stats, read_root_stats};
pub use error::{Error, Result};
pub use manager::Manager;
pub use root::RootResolver;
