//! TOML project configuration.
//!
//! ```toml
//! [project]
//! name = "hello-scikit-learn"
//! version = "0.1.0"
//! scripts = ["generate_data.py", "train_model.py", "predict.py"]
//!
//! [bundler]
//! hidden_imports = ["joblib", "numpy"]
//! data = [{ source = "src", destination = "src" }]
//!
//! [distribution]
//! files = ["config.py", "README.md", "requirements.txt"]
//!
//! [platforms.windows]
//! executable_suffix = ".exe"
//! extra_flags = ["--console"]
//! ```

use super::{BuildConfig, BuildConfigBuilder, DataMapping, PlatformOptions};
use crate::error::{BundlerError, ConfigError, Result};
use serde::Deserialize;
use std::{collections::BTreeMap, path::Path, path::PathBuf};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    project: ProjectSection,
    #[serde(default)]
    directories: DirectoriesSection,
    #[serde(default)]
    bundler: BundlerSection,
    #[serde(default)]
    installer: InstallerSection,
    #[serde(default)]
    distribution: DistributionSection,
    #[serde(default)]
    platforms: BTreeMap<String, PlatformOptions>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProjectSection {
    name: String,
    version: String,
    #[serde(default)]
    scripts: Vec<PathBuf>,
    source_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct DirectoriesSection {
    build: Option<PathBuf>,
    dist: Option<PathBuf>,
    temp: Option<PathBuf>,
    logs: Option<PathBuf>,
    packages: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct BundlerSection {
    program: Option<String>,
    base_flags: Option<Vec<String>>,
    #[serde(default)]
    hidden_imports: Vec<String>,
    #[serde(default)]
    data: Vec<DataMapping>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct InstallerSection {
    command: Option<Vec<String>>,
    requirements: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct DistributionSection {
    #[serde(default)]
    files: Vec<PathBuf>,
    directories: Option<Vec<String>>,
}

impl BuildConfig {
    /// Loads a config from a TOML file.
    ///
    /// The file's directory becomes the project root.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let root = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => std::env::current_dir()?,
        };
        Self::from_toml_str(&text, root)
    }

    /// Parses a TOML config rooted at `root_dir`.
    pub fn from_toml_str(text: &str, root_dir: impl AsRef<Path>) -> Result<Self> {
        let file: ConfigFile = toml::from_str(text).map_err(BundlerError::Toml)?;

        let mut builder = BuildConfigBuilder::new()
            .name(file.project.name)
            .version(file.project.version)
            .scripts(file.project.scripts)
            .root_dir(root_dir)
            .hidden_imports(file.bundler.hidden_imports)
            .data(file.bundler.data)
            .distribution_files(file.distribution.files);

        if let Some(dir) = file.project.source_dir {
            builder = builder.source_dir(dir);
        }
        if let Some(dir) = file.directories.build {
            builder = builder.build_dir(dir);
        }
        if let Some(dir) = file.directories.dist {
            builder = builder.dist_dir(dir);
        }
        if let Some(dir) = file.directories.temp {
            builder = builder.temp_dir(dir);
        }
        if let Some(dir) = file.directories.logs {
            builder = builder.logs_dir(dir);
        }
        if let Some(dir) = file.directories.packages {
            builder = builder.packages_dir(dir);
        }
        if let Some(program) = file.bundler.program {
            builder = builder.bundler_program(program);
        }
        if let Some(flags) = file.bundler.base_flags {
            builder = builder.base_flags(flags);
        }
        if let Some(command) = file.installer.command {
            if command.is_empty() {
                return Err(ConfigError::EmptyCommand {
                    purpose: "dependency installer",
                }
                .into());
            }
            builder = builder.installer_command(command);
        }
        if let Some(requirements) = file.installer.requirements {
            builder = builder.requirements_file(requirements);
        }
        if let Some(dirs) = file.distribution.directories {
            builder = builder.distribution_dirs(dirs);
        }
        for (name, options) in &file.platforms {
            builder = builder.platform(name, options.clone());
        }

        builder.build()
    }
}
