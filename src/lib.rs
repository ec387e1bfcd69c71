//! Intel RDT resource control for containers.
//!
//! This library locates the resource control filesystem through the mount table,
//! detects hardware support, and manages one allocation group per container:
//! attaching processes, writing cache and memory bandwidth schemas, reading
//! statistics and removing the group again.
//!
//! The [`run`] entry point probes the host and prints the root statistics as JSON.

pub mod config;
pub mod error;
pub mod fsutil;
pub mod mountinfo;
pub mod rdt;
pub mod settings;
pub mod support;

/// Probes the host for resource control and prints its root statistics.
///
/// # Errors
///
/// Returns an error if resource control is not enabled on this host, or if the
/// root statistics cannot be read or serialized.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::Settings::from_env();
    let resolver = rdt::RootResolver::from_settings(&settings);

    if !support::is_enabled(&settings, &resolver, &support::SyscallMounter) {
        return Err(format!(
            "resource control is not enabled (cpuinfo: `{}`, mountinfo: `{}`)",
            settings.cpuinfo_path.display(),
            settings.mountinfo_path.display()
        )
        .into());
    }

    let root = resolver.resolve()?;
    log::debug!("Resource control root: {}", root.display());

    let stats = rdt::read_root_stats(&root)?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
