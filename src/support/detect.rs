use std::path::Path;

use super::checks::{Mounter, RDT_CPU_FLAG, cpu_has_flag, mount_control_fs};
use crate::error::ResultOkLogExt;
use crate::rdt::RootResolver;
use crate::settings::Settings;

/// Returns `true` if the CPU information file at `cpuinfo_path` announces the
/// [`RDT_CPU_FLAG`].
///
/// A file that cannot be read counts as unsupported; the error is logged as a warning.
pub fn is_supported(cpuinfo_path: impl AsRef<Path>) -> bool {
    cpu_has_flag(cpuinfo_path, RDT_CPU_FLAG)
        .ok_log("Failed to check CPU support for resource control")
        .unwrap_or(false)
}

/// Returns `true` if the resource control filesystem is mounted.
///
/// When the mount table has no entry for the filesystem, a single attempt is made
/// to mount it on [`Settings::mount_dir`] and its outcome is returned. Any other
/// resolution failure counts as not mounted without attempting a mount.
pub fn is_mounted(resolver: &RootResolver, settings: &Settings, mounter: &impl Mounter) -> bool {
    let err = match resolver.resolve() {
        Ok(_) => return true,
        Err(err) => err,
    };

    if !err.is_not_found() {
        log::warn!("Failed to locate the resource control filesystem: {err}");
        return false;
    }

    log::info!(
        "`{}` is not mounted, mounting it at {}",
        resolver.fs_type(),
        settings.mount_dir.display()
    );
    mount_control_fs(&settings.mount_dir, resolver.fs_type(), mounter)
        .ok_log("Remedial mount failed")
        .is_some()
}

/// Returns `true` if the CPU supports resource control and its filesystem is mounted.
///
/// No mount is attempted on CPUs lacking support.
pub fn is_enabled(settings: &Settings, resolver: &RootResolver, mounter: &impl Mounter) -> bool {
    is_supported(&settings.cpuinfo_path) && is_mounted(resolver, settings, mounter)
}

#[cfg(test)]
mod tests {
    use super::super::checks::fake::FakeMounter;
    use super::*;
    use std::path::PathBuf;

    struct Fixture {
        dir: tempfile::TempDir,
        settings: Settings,
    }

    impl Fixture {
        fn new(mountinfo: &str, cpu_flags: &str) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let mountinfo_path = dir.path().join("mountinfo");
            let cpuinfo_path = dir.path().join("cpuinfo");
            std::fs::write(&mountinfo_path, mountinfo).unwrap();
            std::fs::write(&cpuinfo_path, format!("flags\t\t: fpu {cpu_flags}\n")).unwrap();
            let settings = Settings {
                mountinfo_path,
                cpuinfo_path,
                mount_dir: dir.path().join("sys/fs/rscctrl"),
                ..Default::default()
            };
            Self { dir, settings }
        }

        fn resolver(&self) -> RootResolver {
            RootResolver::from_settings(&self.settings)
        }
    }

    fn mounted_table(root: &Path) -> String {
        format!(
            "25 1 0:24 / /proc rw,relatime - proc proc rw\n\
             98 22 0:45 / {} rw,relatime - rscctrl rscctrl rw\n",
            root.display()
        )
    }

    const UNMOUNTED_TABLE: &str = "25 1 0:24 / /proc rw,relatime - proc proc rw\n";

    #[test]
    fn test_is_supported() {
        let fixture = Fixture::new(UNMOUNTED_TABLE, "rdt");
        assert!(is_supported(&fixture.settings.cpuinfo_path));

        let fixture = Fixture::new(UNMOUNTED_TABLE, "rdt_a cat_l3");
        assert!(!is_supported(&fixture.settings.cpuinfo_path));

        assert!(!is_supported(fixture.dir.path().join("missing")));
    }

    #[test]
    fn test_already_mounted() {
        let root = tempfile::tempdir().unwrap();
        let fixture = Fixture::new(&mounted_table(root.path()), "rdt");
        let mounter = FakeMounter::default();

        assert!(is_mounted(&fixture.resolver(), &fixture.settings, &mounter));
        assert!(mounter.calls().is_empty());
    }

    #[test]
    fn test_remedial_mount_succeeds() {
        let fixture = Fixture::new(UNMOUNTED_TABLE, "rdt");
        let mounter = FakeMounter::default();

        assert!(is_mounted(&fixture.resolver(), &fixture.settings, &mounter));
        assert_eq!(
            mounter.calls(),
            vec![("rscctrl".to_owned(), fixture.settings.mount_dir.clone())]
        );
        assert!(fixture.settings.mount_dir.is_dir());
    }

    #[test]
    fn test_remedial_mount_fails() {
        let fixture = Fixture::new(UNMOUNTED_TABLE, "rdt");
        let mounter = FakeMounter::failing();

        assert!(!is_mounted(&fixture.resolver(), &fixture.settings, &mounter));
        assert_eq!(mounter.calls().len(), 1);
    }

    #[test]
    fn test_other_errors_skip_mount() {
        let mut fixture = Fixture::new("garbage line without separator\n", "rdt");
        let mounter = FakeMounter::default();
        assert!(!is_mounted(&fixture.resolver(), &fixture.settings, &mounter));

        fixture.settings.mountinfo_path = PathBuf::from("/definitely/does/not/exist");
        assert!(!is_mounted(&fixture.resolver(), &fixture.settings, &mounter));
        assert!(mounter.calls().is_empty());
    }

    #[test]
    fn test_is_enabled() {
        let root = tempfile::tempdir().unwrap();
        let fixture = Fixture::new(&mounted_table(root.path()), "rdt");
        let mounter = FakeMounter::default();
        assert!(is_enabled(&fixture.settings, &fixture.resolver(), &mounter));
    }

    #[test]
    fn test_is_enabled_without_cpu_support_skips_mount() {
        let fixture = Fixture::new(UNMOUNTED_TABLE, "cat_l3");
        let mounter = FakeMounter::default();

        assert!(!is_enabled(&fixture.settings, &fixture.resolver(), &mounter));
        assert!(mounter.calls().is_empty());
    }
}
