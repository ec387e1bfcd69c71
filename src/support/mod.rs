//! Support detection.
//!
//! Determines whether the CPU and kernel provide resource control and whether
//! its filesystem is mounted, mounting it once if it is not.
mod checks;
mod detect;
mod error;

pub use checks::{Mounter, RDT_CPU_FLAG, SyscallMounter, cpu_has_flag, mount_control_fs};
pub use detect::{is_enabled, is_mounted, is_supported};
pub use error::{Error, Result};
