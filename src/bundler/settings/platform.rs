//! Per-platform bundler options.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Platforms the orchestrator knows how to specialize for.
pub const SUPPORTED_PLATFORMS: [&str; 3] = ["windows", "linux", "macos"];

/// Options applied when bundling for one platform.
///
/// # Configuration
///
/// ```toml
/// [platforms.windows]
/// console = true
/// executable_suffix = ".exe"
/// extra_flags = ["--console"]
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformOptions {
    /// Whether the produced executable opens a console window.
    ///
    /// When `false`, `--console` is dropped from [`extra_flags`](Self::extra_flags)
    /// and `--windowed` is passed unless a windowed flag is already listed.
    #[serde(default = "default_console")]
    pub console: bool,

    /// Suffix appended to the target name, e.g. `.exe`.
    ///
    /// Default: empty
    #[serde(default)]
    pub executable_suffix: String,

    /// Extra bundler flags, inserted after the output flags.
    ///
    /// Default: empty
    #[serde(default)]
    pub extra_flags: Vec<String>,
}

fn default_console() -> bool {
    true
}

impl Default for PlatformOptions {
    fn default() -> Self {
        Self::linux()
    }
}

impl PlatformOptions {
    /// Windows defaults: `.exe` suffix and an explicit `--console` flag.
    pub fn windows() -> Self {
        Self {
            console: true,
            executable_suffix: ".exe".to_string(),
            extra_flags: vec!["--console".to_string()],
        }
    }

    /// Linux defaults, also used as the fallback for unknown platforms.
    pub fn linux() -> Self {
        Self {
            console: true,
            executable_suffix: String::new(),
            extra_flags: Vec::new(),
        }
    }

    /// macOS defaults.
    pub fn macos() -> Self {
        Self::linux()
    }

    /// Built-in table for [`SUPPORTED_PLATFORMS`].
    pub fn default_table() -> BTreeMap<String, PlatformOptions> {
        BTreeMap::from([
            ("windows".to_string(), Self::windows()),
            ("linux".to_string(), Self::linux()),
            ("macos".to_string(), Self::macos()),
        ])
    }
}

/// Source/destination pair embedded into the bundle as data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataMapping {
    /// Path on disk, relative to the project root.
    pub source: String,
    /// Destination inside the bundle.
    pub destination: String,
}

impl DataMapping {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }
}

/// Normalizes a platform name for lookups.
///
/// Lower-cases and trims the name; `darwin` is accepted as an alias of `macos`.
pub fn normalize_platform(name: &str) -> String {
    let name = name.trim().to_lowercase();
    match name.as_str() {
        "darwin" | "osx" | "mac" => "macos".to_string(),
        "win32" | "win" => "windows".to_string(),
        _ => name,
    }
}

/// Whether `name` can be used as the `{platform}` part of `dist/{platform}-{arch}`.
pub fn is_valid_platform_id(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.chars().any(char::is_whitespace)
}
