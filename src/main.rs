/// Probes the host for Intel RDT resource control and prints the root statistics.
///
/// # Errors
///
/// Returns an error if resource control is unavailable or its parameters cannot be read.
///
/// # Examples
///
/// ```bash
/// RUST_LOG=debug RDT_FS_TYPE=resctrl RDT_MOUNT_DIR=/sys/fs/resctrl cargo run
/// ```
fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    rdt_manager::run()
}
