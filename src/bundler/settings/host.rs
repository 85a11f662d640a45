//! Host platform and architecture detection.

/// Platform/architecture pair of the machine running the orchestrator.
///
/// Platform names follow the orchestrator's vocabulary (`windows`, `linux`,
/// `macos`); any other OS name is passed through unchanged so the factory can
/// fall back to the generic builder.
///
/// # Examples
///
/// ```
/// use kodegen_bundler_onefile::bundler::HostPlatform;
///
/// let host = HostPlatform::detect();
/// println!("building on {}", host.identifier());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostPlatform {
    /// Normalized platform name.
    pub platform: String,
    /// CPU architecture, e.g. `x86_64` or `aarch64`.
    pub arch: String,
}

impl HostPlatform {
    /// Detects the current host.
    pub fn detect() -> Self {
        Self {
            platform: Self::platform_name(std::env::consts::OS).to_string(),
            arch: std::env::consts::ARCH.to_lowercase(),
        }
    }

    /// Maps a Rust target OS name onto the orchestrator's platform names.
    pub fn platform_name(os: &str) -> &str {
        match os {
            "windows" => "windows",
            "linux" => "linux",
            "macos" => "macos",
            other => other,
        }
    }

    /// `{platform}-{arch}`, the distribution directory name.
    pub fn identifier(&self) -> String {
        format!("{}-{}", self.platform, self.arch)
    }
}
