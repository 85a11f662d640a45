//! Core BuildConfig struct and implementations.

use super::{DataMapping, PlatformOptions, platform::normalize_platform};
use crate::logger::Logger;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

/// Separator between source and destination in `--add-data` values.
#[cfg(windows)]
pub const DATA_SEPARATOR: char = ';';
/// Separator between source and destination in `--add-data` values.
#[cfg(not(windows))]
pub const DATA_SEPARATOR: char = ':';

/// Flags that already request a windowed executable.
const WINDOWED_FLAGS: [&str; 3] = ["--windowed", "--noconsole", "-w"];

/// Flags the orchestrator always sets itself; platform tables may not override them.
pub const RESERVED_FLAGS: [&str; 4] = ["--dist-path", "--work-path", "--spec-path", "--name"];

/// Immutable project and build configuration.
///
/// Constructed via [`BuildConfigBuilder`](super::BuildConfigBuilder) or
/// [`BuildConfig::from_file`], then shared read-only (usually behind an `Arc`)
/// by every builder of a run.
///
/// All relative paths resolve against [`root_dir`](Self::root_dir).
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_onefile::bundler::BuildConfigBuilder;
///
/// # fn example() -> kodegen_bundler_onefile::Result<()> {
/// let config = BuildConfigBuilder::new()
///     .name("hello-scikit-learn")
///     .version("0.1.0")
///     .scripts(["generate_data.py", "train_model.py", "predict.py"])
///     .build()?;
///
/// let command = config.build_command("predict.py", "linux", "x86_64");
/// assert!(command.iter().any(|arg| arg == "--name=predict"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct BuildConfig {
    pub(super) name: String,
    pub(super) version: String,
    pub(super) scripts: Vec<PathBuf>,

    /// Project root; child processes run here.
    pub(super) root_dir: PathBuf,
    pub(super) source_dir: PathBuf,
    pub(super) build_dir: PathBuf,
    pub(super) dist_dir: PathBuf,
    pub(super) temp_dir: PathBuf,
    pub(super) logs_dir: PathBuf,
    pub(super) packages_dir: PathBuf,

    pub(super) bundler_program: String,
    pub(super) base_flags: Vec<String>,
    pub(super) platforms: BTreeMap<String, PlatformOptions>,
    pub(super) fallback_platform: PlatformOptions,
    pub(super) hidden_imports: Vec<String>,
    pub(super) data: Vec<DataMapping>,

    pub(super) distribution_files: Vec<PathBuf>,
    pub(super) distribution_dirs: Vec<String>,

    pub(super) installer_command: Vec<String>,
    pub(super) requirements_file: PathBuf,
}

impl BuildConfig {
    /// Returns the project name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the semantic version string.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Entry-point scripts, in build order.
    pub fn scripts(&self) -> &[PathBuf] {
        &self.scripts
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Resolves `path` against the project root.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root_dir.join(path)
    }

    pub fn source_dir(&self) -> PathBuf {
        self.resolve(&self.source_dir)
    }

    /// Intermediate build directory (work trees and spec files).
    pub fn build_dir(&self) -> PathBuf {
        self.resolve(&self.build_dir)
    }

    pub fn dist_dir(&self) -> PathBuf {
        self.resolve(&self.dist_dir)
    }

    /// Scratch directory.
    pub fn temp_dir(&self) -> PathBuf {
        self.resolve(&self.temp_dir)
    }

    /// Directory for daily log files.
    pub fn logs_dir(&self) -> PathBuf {
        self.resolve(&self.logs_dir)
    }

    /// Directory holding release archives and metadata records.
    pub fn packages_dir(&self) -> PathBuf {
        self.resolve(&self.packages_dir)
    }

    /// Program name or path of the external bundler.
    pub fn bundler_program(&self) -> &str {
        &self.bundler_program
    }

    pub fn base_flags(&self) -> &[String] {
        &self.base_flags
    }

    /// Modules force-included into every bundle.
    pub fn hidden_imports(&self) -> &[String] {
        &self.hidden_imports
    }

    pub fn data(&self) -> &[DataMapping] {
        &self.data
    }

    /// Files copied into each distribution directory.
    pub fn distribution_files(&self) -> &[PathBuf] {
        &self.distribution_files
    }

    /// Directories created inside each distribution directory.
    pub fn distribution_dirs(&self) -> &[String] {
        &self.distribution_dirs
    }

    pub fn requirements_file(&self) -> PathBuf {
        self.resolve(&self.requirements_file)
    }

    /// Full dependency installer invocation (`<command> -r <requirements>`).
    pub fn installer_invocation(&self) -> Vec<String> {
        let mut cmd = self.installer_command.clone();
        cmd.push("-r".to_string());
        cmd.push(self.requirements_file().to_string_lossy().into_owned());
        cmd
    }

    /// Options for `platform`.
    ///
    /// Unknown platforms get the linux-like fallback entry rather than an error.
    pub fn platform_options(&self, platform: &str) -> &PlatformOptions {
        self.platforms
            .get(&normalize_platform(platform))
            .unwrap_or(&self.fallback_platform)
    }

    /// Configured platform table.
    pub fn platforms(&self) -> &BTreeMap<String, PlatformOptions> {
        &self.platforms
    }

    /// Executable base name derived from a script (file name without extension).
    pub fn target_name(script: impl AsRef<Path>) -> String {
        let script = script.as_ref();
        script
            .file_stem()
            .or_else(|| script.file_name())
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| script.to_string_lossy().into_owned())
    }

    pub fn script_path(&self, script: impl AsRef<Path>) -> PathBuf {
        self.resolve(script)
    }

    /// `dist/{platform}-{arch}`.
    pub fn dist_platform_dir(&self, platform: &str, arch: &str) -> PathBuf {
        self.dist_dir().join(format!("{platform}-{arch}"))
    }

    /// Where the bundler is expected to leave the executable for `script`.
    pub fn executable_path(&self, script: impl AsRef<Path>, platform: &str, arch: &str) -> PathBuf {
        let options = self.platform_options(platform);
        let file_name = format!("{}{}", Self::target_name(script), options.executable_suffix);
        self.dist_platform_dir(platform, arch).join(file_name)
    }

    /// `{name}-{version}-{platform}-{arch}`, shared by archives and metadata records.
    pub fn release_base_name(&self, platform: &str, arch: &str) -> String {
        format!("{}-{}-{}-{}", self.name, self.version, platform, arch)
    }

    /// Builds the external bundler invocation for one script.
    ///
    /// Output flags come first, then platform flags, forced imports, data
    /// mappings, and finally the script path.
    pub fn build_command(&self, script: impl AsRef<Path>, platform: &str, arch: &str) -> Vec<String> {
        let script = script.as_ref();
        let target = Self::target_name(script);
        let options = self.platform_options(platform);
        let build_dir = self.build_dir();

        let mut cmd = Vec::with_capacity(
            1 + self.base_flags.len()
                + 5
                + options.extra_flags.len()
                + self.hidden_imports.len()
                + self.data.len(),
        );
        cmd.push(self.bundler_program.clone());
        cmd.extend(self.base_flags.iter().cloned());

        cmd.push(format!(
            "--dist-path={}",
            self.dist_platform_dir(platform, arch).display()
        ));
        cmd.push(format!("--work-path={}", build_dir.join(&target).display()));
        cmd.push(format!("--spec-path={}", build_dir.display()));
        cmd.push(format!("--name={target}"));

        if options.console {
            cmd.extend(options.extra_flags.iter().cloned());
        } else {
            cmd.extend(
                options
                    .extra_flags
                    .iter()
                    .filter(|flag| flag.as_str() != "--console")
                    .cloned(),
            );
            if !options.extra_flags.iter().any(|f| WINDOWED_FLAGS.contains(&f.as_str())) {
                cmd.push("--windowed".to_string());
            }
        }

        for module in &self.hidden_imports {
            cmd.push(format!("--hidden-import={module}"));
        }

        for mapping in &self.data {
            cmd.push(format!(
                "--add-data={}{}{}",
                self.resolve(&mapping.source).display(),
                DATA_SEPARATOR,
                mapping.destination
            ));
        }

        cmd.push(self.script_path(script).to_string_lossy().into_owned());
        cmd
    }

    /// Checks that every script and the source root exist.
    ///
    /// Never fails hard: returns `false` and logs the first failed check.
    pub fn validate_environment(&self, log: &Logger) -> bool {
        for script in &self.scripts {
            let path = self.script_path(script);
            if !path.exists() {
                log.warn(format!("Script not found: {}", path.display()));
                return false;
            }
        }

        let source_dir = self.source_dir();
        if !source_dir.is_dir() {
            log.error(format!("Source directory not found: {}", source_dir.display()));
            return false;
        }

        true
    }
}
