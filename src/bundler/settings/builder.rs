//! Builder for constructing BuildConfig.

use super::{
    BuildConfig, DataMapping, PlatformOptions,
    core::RESERVED_FLAGS,
    platform::{is_valid_platform_id, normalize_platform},
};
use crate::error::{ConfigError, Result};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

/// Builder for constructing [`BuildConfig`].
///
/// Everything except the project name and version has a default taken from
/// the conventional PyInstaller project layout (`build/`, `dist/`, `temp/`,
/// `packages/`, `src/`, `requirements.txt`).
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_onefile::bundler::{BuildConfigBuilder, DataMapping};
///
/// # fn example() -> kodegen_bundler_onefile::Result<()> {
/// let config = BuildConfigBuilder::new()
///     .name("hello-scikit-learn")
///     .version("0.1.0")
///     .scripts(["generate_data.py", "train_model.py", "predict.py"])
///     .hidden_imports(["sklearn.tree._utils", "joblib"])
///     .data(vec![DataMapping::new("src", "src"), DataMapping::new("config.py", ".")])
///     .distribution_files(["config.py", "README.md", "requirements.txt"])
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct BuildConfigBuilder {
    name: Option<String>,
    version: Option<String>,
    scripts: Vec<PathBuf>,
    root_dir: Option<PathBuf>,
    source_dir: Option<PathBuf>,
    build_dir: Option<PathBuf>,
    dist_dir: Option<PathBuf>,
    temp_dir: Option<PathBuf>,
    logs_dir: Option<PathBuf>,
    packages_dir: Option<PathBuf>,
    bundler_program: Option<String>,
    base_flags: Option<Vec<String>>,
    platforms: BTreeMap<String, PlatformOptions>,
    hidden_imports: Vec<String>,
    data: Vec<DataMapping>,
    distribution_files: Vec<PathBuf>,
    distribution_dirs: Option<Vec<String>>,
    installer_command: Option<Vec<String>>,
    requirements_file: Option<PathBuf>,
}

impl BuildConfigBuilder {
    /// Creates a new config builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the project name.
    ///
    /// # Required
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the project version (semantic version).
    ///
    /// # Required
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the entry-point scripts, in build order.
    pub fn scripts<I, P>(mut self, scripts: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.scripts = scripts.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the project root.
    ///
    /// Default: the process working directory
    pub fn root_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.root_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the source root checked during environment validation.
    ///
    /// Default: `src`
    pub fn source_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.source_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Default: `build`
    pub fn build_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.build_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Default: `dist`
    pub fn dist_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.dist_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Default: `temp`
    pub fn temp_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.temp_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the directory for daily log files.
    ///
    /// Default: `logs`
    pub fn logs_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.logs_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Directory for release archives and metadata records.
    ///
    /// Default: `packages`
    pub fn packages_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.packages_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the bundler executable (name on `PATH` or a path).
    ///
    /// Default: `pyinstaller`
    pub fn bundler_program(mut self, program: impl Into<String>) -> Self {
        self.bundler_program = Some(program.into());
        self
    }

    /// Default: `--onefile --clean --noconfirm`
    pub fn base_flags<I, S>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.base_flags = Some(flags.into_iter().map(Into::into).collect());
        self
    }

    /// Overrides the options of one platform.
    ///
    /// Platforms not overridden keep the built-in defaults.
    pub fn platform(mut self, name: &str, options: PlatformOptions) -> Self {
        self.platforms.insert(normalize_platform(name), options);
        self
    }

    /// Sets the modules force-included into every bundle.
    ///
    /// Duplicates are dropped, keeping the first occurrence.
    pub fn hidden_imports<I, S>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hidden_imports = modules.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the data mappings embedded into every bundle.
    pub fn data(mut self, data: Vec<DataMapping>) -> Self {
        self.data = data;
        self
    }

    /// Files copied into each distribution directory.
    pub fn distribution_files<I, P>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.distribution_files = files.into_iter().map(Into::into).collect();
        self
    }

    /// Directories created in each distribution directory.
    ///
    /// Default: `data`, `models`, `logs`
    pub fn distribution_dirs<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.distribution_dirs = Some(dirs.into_iter().map(Into::into).collect());
        self
    }

    /// Dependency installer command; `-r <requirements>` is appended.
    ///
    /// Default: `python -m pip install`
    pub fn installer_command<I, S>(mut self, command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.installer_command = Some(command.into_iter().map(Into::into).collect());
        self
    }

    /// Default: `requirements.txt`
    pub fn requirements_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.requirements_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Builds the config.
    ///
    /// # Errors
    ///
    /// - `name` or `version` missing
    /// - `version` is not a semantic version
    /// - empty bundler or installer command
    /// - a platform key that cannot be a directory name
    /// - platform extra flags redefining one of [`RESERVED_FLAGS`]
    pub fn build(self) -> Result<BuildConfig> {
        let name = self.name.ok_or(ConfigError::MissingField { field: "name" })?;
        let version = self
            .version
            .ok_or(ConfigError::MissingField { field: "version" })?;

        semver::Version::parse(&version).map_err(|e| ConfigError::InvalidVersion {
            version: version.clone(),
            reason: e.to_string(),
        })?;

        let bundler_program = self
            .bundler_program
            .unwrap_or_else(|| "pyinstaller".to_string());
        if bundler_program.trim().is_empty() {
            return Err(ConfigError::EmptyCommand { purpose: "bundler" }.into());
        }

        let installer_command = self.installer_command.unwrap_or_else(|| {
            ["python", "-m", "pip", "install"]
                .into_iter()
                .map(String::from)
                .collect()
        });
        if installer_command.is_empty() || installer_command[0].trim().is_empty() {
            return Err(ConfigError::EmptyCommand {
                purpose: "dependency installer",
            }
            .into());
        }

        let mut platforms = PlatformOptions::default_table();
        platforms.extend(self.platforms);
        for (platform, options) in &platforms {
            if !is_valid_platform_id(platform) {
                return Err(ConfigError::InvalidPlatform {
                    platform: platform.clone(),
                }
                .into());
            }
            if let Some(flag) = options.extra_flags.iter().find(|flag| is_reserved(flag)) {
                return Err(ConfigError::ReservedFlag {
                    platform: platform.clone(),
                    flag: flag.clone(),
                }
                .into());
            }
        }

        let mut hidden_imports: Vec<String> = Vec::with_capacity(self.hidden_imports.len());
        for module in self.hidden_imports {
            if !hidden_imports.contains(&module) {
                hidden_imports.push(module);
            }
        }

        let root_dir = match self.root_dir {
            Some(root) => root,
            None => std::env::current_dir()?,
        };

        Ok(BuildConfig {
            name,
            version,
            scripts: self.scripts,
            root_dir,
            source_dir: self.source_dir.unwrap_or_else(|| PathBuf::from("src")),
            build_dir: self.build_dir.unwrap_or_else(|| PathBuf::from("build")),
            dist_dir: self.dist_dir.unwrap_or_else(|| PathBuf::from("dist")),
            temp_dir: self.temp_dir.unwrap_or_else(|| PathBuf::from("temp")),
            logs_dir: self.logs_dir.unwrap_or_else(|| PathBuf::from("logs")),
            packages_dir: self
                .packages_dir
                .unwrap_or_else(|| PathBuf::from("packages")),
            bundler_program,
            base_flags: self.base_flags.unwrap_or_else(|| {
                ["--onefile", "--clean", "--noconfirm"]
                    .into_iter()
                    .map(String::from)
                    .collect()
            }),
            platforms,
            fallback_platform: PlatformOptions::linux(),
            hidden_imports,
            data: self.data,
            distribution_files: self.distribution_files,
            distribution_dirs: self.distribution_dirs.unwrap_or_else(|| {
                ["data", "models", "logs"]
                    .into_iter()
                    .map(String::from)
                    .collect()
            }),
            installer_command,
            requirements_file: self
                .requirements_file
                .unwrap_or_else(|| PathBuf::from("requirements.txt")),
        })
    }
}

fn is_reserved(flag: &str) -> bool {
    let name = flag.split('=').next().unwrap_or(flag);
    RESERVED_FLAGS.contains(&name)
}
