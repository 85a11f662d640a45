//! Platform-specific builder behavior.
//!
//! Every platform shares the same build contract and differs only in what
//! happens to an executable after it was built, plus the installer formats it
//! could eventually produce.
//!
//! # Module Organization
//!
//! - `windows` - Post-processing hook and NSIS installer stub
//! - `linux` - Executable permissions, .deb and .rpm stubs
//! - `macos` - Executable permissions, .app and .dmg stubs
//! - `factory` - [`BuilderFactory`] selecting a variant from a platform name

mod factory;
mod linux;
mod macos;
mod windows;

pub use factory::BuilderFactory;

use crate::{bundler::settings::normalize_platform, logger::Logger};
use std::{fmt, path::Path};

/// Closed set of builder specializations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlatformVariant {
    Windows,
    Linux,
    MacOs,
    /// Unrecognized platform: post-processing is a no-op.
    Generic,
}

impl PlatformVariant {
    /// Variant for a platform name; `None` when the name is not recognized.
    pub fn from_platform(name: &str) -> Option<Self> {
        match normalize_platform(name).as_str() {
            "windows" => Some(Self::Windows),
            "linux" => Some(Self::Linux),
            "macos" => Some(Self::MacOs),
            _ => None,
        }
    }

    /// Canonical platform name, `None` for [`PlatformVariant::Generic`].
    pub fn platform_name(&self) -> Option<&'static str> {
        match self {
            Self::Windows => Some("windows"),
            Self::Linux => Some("linux"),
            Self::MacOs => Some("macos"),
            Self::Generic => None,
        }
    }

    /// Runs after a successful script build.
    ///
    /// Never turns a success into a failure.
    pub async fn post_process(&self, executable: &Path, log: &Logger) {
        match self {
            Self::Windows => windows::post_process(executable, log).await,
            Self::Linux => linux::post_process(executable, log).await,
            Self::MacOs => macos::post_process(executable, log).await,
            Self::Generic => {}
        }
    }

    /// Installer formats this variant can be asked for.
    pub fn installer_formats(&self) -> &'static [InstallerFormat] {
        match self {
            Self::Windows => &[InstallerFormat::Nsis],
            Self::Linux => &[InstallerFormat::Deb, InstallerFormat::Rpm],
            Self::MacOs => &[InstallerFormat::AppBundle, InstallerFormat::Dmg],
            Self::Generic => &[],
        }
    }

    /// Creates an installer of `format`.
    ///
    /// All formats are extension points that log and return `false`; a format
    /// belonging to another platform is rejected with a warning.
    pub async fn create_installer(&self, format: InstallerFormat, log: &Logger) -> bool {
        if !self.installer_formats().contains(&format) {
            log.warn(format!("{format} installers are not available for the {self} builder"));
            return false;
        }

        match format {
            InstallerFormat::Nsis => windows::create_installer(log).await,
            InstallerFormat::Deb => linux::create_deb_package(log).await,
            InstallerFormat::Rpm => linux::create_rpm_package(log).await,
            InstallerFormat::AppBundle => macos::create_app_bundle(log).await,
            InstallerFormat::Dmg => macos::create_dmg_installer(log).await,
        }
    }
}

impl fmt::Display for PlatformVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.platform_name().unwrap_or("generic"))
    }
}

/// Installer formats reserved for future work.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InstallerFormat {
    /// Windows NSIS setup executable
    Nsis,
    /// Debian package
    Deb,
    /// RPM package
    Rpm,
    /// macOS application bundle
    AppBundle,
    /// macOS disk image
    Dmg,
}

impl fmt::Display for InstallerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Nsis => "NSIS",
            Self::Deb => "Debian",
            Self::Rpm => "RPM",
            Self::AppBundle => "app bundle",
            Self::Dmg => "DMG",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::MemoryLog;
    use std::sync::Arc;

    #[test]
    fn variants_from_names() {
        assert_eq!(PlatformVariant::from_platform("WINDOWS"), Some(PlatformVariant::Windows));
        assert_eq!(PlatformVariant::from_platform("darwin"), Some(PlatformVariant::MacOs));
        assert_eq!(PlatformVariant::from_platform("linux"), Some(PlatformVariant::Linux));
        assert_eq!(PlatformVariant::from_platform("beos"), None);
        assert_eq!(PlatformVariant::Generic.to_string(), "generic");
    }

    #[tokio::test]
    async fn installer_stubs_return_false() {
        let sink = Arc::new(MemoryLog::new());
        let log = Logger::memory(sink.clone());

        assert!(!PlatformVariant::Linux.create_installer(InstallerFormat::Deb, &log).await);
        assert!(!PlatformVariant::MacOs.create_installer(InstallerFormat::Dmg, &log).await);
        assert!(!PlatformVariant::Windows.create_installer(InstallerFormat::Nsis, &log).await);
        assert!(sink.warnings().is_empty());

        assert!(!PlatformVariant::Windows.create_installer(InstallerFormat::Rpm, &log).await);
        assert_eq!(sink.warnings().len(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn linux_post_process_sets_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("predict");
        std::fs::write(&exe, "bin").unwrap();
        std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o600)).unwrap();

        let log = Logger::memory(Arc::new(MemoryLog::new()));
        PlatformVariant::Linux.post_process(&exe, &log).await;

        let mode = std::fs::metadata(&exe).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[tokio::test]
    async fn post_process_failure_only_warns() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("ghost");
        let sink = Arc::new(MemoryLog::new());
        let log = Logger::memory(sink.clone());

        PlatformVariant::MacOs.post_process(&missing, &log).await;
        assert_eq!(sink.warnings().len(), 1);
    }
}
