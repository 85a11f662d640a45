//! Main build orchestration for one platform.
//!
//! This module provides the [`Builder`] that drives the external single-file
//! bundler across every configured script and assembles the distribution
//! directory.

use super::{
    result::{
        BuildResult, BuildSummary, DEPENDENCY_INSTALL, DIRECTORY_CLEANUP, ENVIRONMENT_CHECK,
    },
    tool_detection,
};
use crate::{
    bundler::{
        Result,
        platform::{InstallerFormat, PlatformVariant},
        settings::BuildConfig,
        utils::fs,
    },
    logger::Logger,
};
use std::{
    path::{Path, PathBuf},
    process::Stdio,
    sync::Arc,
};
use tokio::process::Command;

/// Build driver for one logical platform.
///
/// A build pass walks `clean → validate → install dependencies → build every
/// script → summary`. Validation or installation failures end the pass early
/// with a single synthetic failure; individual script failures never stop the
/// remaining scripts.
///
/// The builder always runs the host's bundler. For a platform the host cannot
/// produce, the expected `{name}{suffix}` never appears and every script is
/// reported as "output file not found".
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_onefile::bundler::{BuildConfigBuilder, BuilderFactory};
/// use kodegen_bundler_onefile::logger::Logger;
/// use std::sync::Arc;
///
/// # async fn example() -> kodegen_bundler_onefile::Result<()> {
/// let config = Arc::new(
///     BuildConfigBuilder::new()
///         .name("hello-scikit-learn")
///         .version("0.1.0")
///         .scripts(["predict.py"])
///         .build()?,
/// );
///
/// let builder = BuilderFactory::create(config, None, Logger::facade())?;
/// let results = builder.build_all().await;
/// builder.create_distribution_package().await;
///
/// let summary = builder.build_summary(&results);
/// println!("{}/{} built", summary.successful(), summary.total());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Builder {
    config: Arc<BuildConfig>,
    variant: PlatformVariant,
    platform: String,
    arch: String,
    log: Logger,
}

impl Builder {
    /// Creates a builder; prefer [`BuilderFactory`](crate::bundler::BuilderFactory).
    pub fn new(
        config: Arc<BuildConfig>,
        variant: PlatformVariant,
        platform: impl Into<String>,
        arch: impl Into<String>,
        log: Logger,
    ) -> Self {
        Self {
            config,
            variant,
            platform: platform.into(),
            arch: arch.into(),
            log,
        }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn variant(&self) -> PlatformVariant {
        self.variant
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub fn arch(&self) -> &str {
        &self.arch
    }

    /// `dist/{platform}-{arch}` for this builder.
    pub fn output_directory(&self) -> PathBuf {
        self.config.dist_platform_dir(&self.platform, &self.arch)
    }

    /// Resets the working directories.
    ///
    /// Distribution and scratch directories are removed entirely (the
    /// distribution root is recreated). In the build directory only
    /// subdirectories go; spec files and any other top-level files stay.
    pub async fn clean_build_dirs(&self) -> Result<()> {
        let dist_dir = self.config.dist_dir();
        let temp_dir = self.config.temp_dir();
        let build_dir = self.config.build_dir();

        for dir in [&dist_dir, &temp_dir] {
            if dir.exists() {
                self.log.info(format!("Cleaning directory: {}", dir.display()));
                fs::remove_dir_all(dir).await?;
            }
        }

        for removed in fs::remove_subdirectories(&build_dir).await? {
            self.log
                .debug(format!("Removed build work directory: {}", removed.display()));
        }

        fs::create_dir_all(&dist_dir, false).await?;
        fs::create_dir_all(&build_dir, false).await?;
        self.log.info("Build directories cleaned");
        Ok(())
    }

    /// Checks project files and that the bundler answers a version query.
    pub async fn validate_environment(&self) -> bool {
        self.log.info("Validating build environment...");

        if !self.config.validate_environment(&self.log) {
            self.log.error("Environment validation failed");
            return false;
        }

        let program = self.config.bundler_program();
        if !tool_detection::check_version(program, self.config.root_dir(), &self.log).await {
            self.log
                .error(format!("{program} is not installed or not usable"));
            return false;
        }

        self.log.info("✓ Build environment ready");
        true
    }

    /// Installs the project's declared dependencies.
    ///
    /// Output is discarded; stderr is only reported when the installer fails.
    pub async fn install_dependencies(&self) -> bool {
        self.log.info("Installing build dependencies...");

        let invocation = self.config.installer_invocation();
        let Some((program, args)) = invocation.split_first() else {
            self.log.error("Dependency installer command is empty");
            return false;
        };
        let root = self.config.root_dir();
        let executable =
            tool_detection::locate(program, root).unwrap_or_else(|| PathBuf::from(program));

        let output = Command::new(&executable)
            .args(args)
            .current_dir(root)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await;

        match output {
            Ok(output) if output.status.success() => {
                self.log.info("✓ Dependencies installed");
                true
            }
            Ok(output) => {
                self.log.error(format!(
                    "Dependency installation failed ({}): {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ));
                false
            }
            Err(e) => {
                self.log
                    .error(format!("Failed to run dependency installer {program}: {e}"));
                false
            }
        }
    }

    /// Bundles one script and verifies the produced executable.
    ///
    /// Success requires both a zero exit code and the executable at
    /// `dist/{platform}-{arch}/{name}{suffix}`. Platform post-processing runs
    /// on success.
    pub async fn build_one(&self, script: impl AsRef<Path>) -> BuildResult {
        let script = script.as_ref();
        let script_id = script.to_string_lossy().into_owned();
        let target = BuildConfig::target_name(script);

        self.log.info(format!(
            "Building {target} with the {} builder...",
            self.variant
        ));

        let cmd = self
            .config
            .build_command(script, &self.platform, &self.arch);
        self.log.debug(format!("Running: {}", cmd.join(" ")));

        let root = self.config.root_dir();
        let executable = tool_detection::locate(&cmd[0], root).unwrap_or_else(|| PathBuf::from(&cmd[0]));

        let output = match Command::new(&executable)
            .args(&cmd[1..])
            .current_dir(root)
            .stdin(Stdio::null())
            .output()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                let message = format!("failed to launch {}: {e}", cmd[0]);
                self.log.error(format!("✗ {target} {message}"));
                return BuildResult::failed(script_id, message);
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            let message = if stderr.is_empty() {
                format!("build failed: bundler exited with {}", output.status)
            } else {
                format!("build failed: {stderr}")
            };
            self.log.error(format!("✗ {target} {message}"));
            return BuildResult::failed(script_id, message);
        }

        let artifact = self
            .config
            .executable_path(script, &self.platform, &self.arch);
        if !tokio::fs::try_exists(&artifact).await.unwrap_or(false) {
            let message = format!("output file not found: {}", artifact.display());
            self.log.error(format!("✗ {target} {message}"));
            return BuildResult::failed(script_id, message);
        }

        self.variant.post_process(&artifact, &self.log).await;
        self.log
            .info(format!("✓ {target} built: {}", artifact.display()));
        BuildResult::built(script_id, artifact)
    }

    /// Runs a complete build pass over every configured script, in order.
    pub async fn build_all(&self) -> Vec<BuildResult> {
        self.log
            .info(format!("Building {} {}", self.config.name(), self.config.version()));
        self.log
            .info(format!("Target platform: {}-{}", self.platform, self.arch));

        if let Err(e) = self.clean_build_dirs().await {
            self.log.error(format!("Failed to clean build directories: {e}"));
            return vec![BuildResult::failed(
                DIRECTORY_CLEANUP,
                format!("directory cleanup failed: {e}"),
            )];
        }

        if !self.validate_environment().await {
            return vec![BuildResult::failed(
                ENVIRONMENT_CHECK,
                "environment validation failed",
            )];
        }

        if !self.install_dependencies().await {
            return vec![BuildResult::failed(
                DEPENDENCY_INSTALL,
                "dependency installation failed",
            )];
        }

        let mut results = Vec::with_capacity(self.config.scripts().len());
        for script in self.config.scripts() {
            let path = self.config.script_path(script);
            if tokio::fs::try_exists(&path).await.unwrap_or(false) {
                results.push(self.build_one(script).await);
            } else {
                self.log
                    .warn(format!("Script {} not found, skipping", path.display()));
                results.push(BuildResult::failed(
                    script.to_string_lossy(),
                    format!("file not found: {}", path.display()),
                ));
            }
        }

        results
    }

    /// Copies auxiliary files and creates the required directories inside
    /// the distribution directory.
    ///
    /// Returns `false` (with a warning) when the distribution directory does
    /// not exist, or when any copy or directory creation failed.
    pub async fn create_distribution_package(&self) -> bool {
        let dist_dir = self.output_directory();
        if !dist_dir.is_dir() {
            self.log.warn(format!(
                "Distribution directory {} does not exist",
                dist_dir.display()
            ));
            return false;
        }

        self.log.info("Creating distribution package...");
        let mut complete = true;

        for file in self.config.distribution_files() {
            let source = self.config.resolve(file);
            if !source.is_file() {
                self.log
                    .debug(format!("Skipping missing file: {}", source.display()));
                continue;
            }
            match fs::copy_into(&source, &dist_dir).await {
                Ok(copied) => self.log.debug(format!("Copied file: {}", copied.display())),
                Err(e) => {
                    self.log.error(format!("Failed to copy {}: {e}", source.display()));
                    complete = false;
                }
            }
        }

        for dir in self.config.distribution_dirs() {
            let target = dist_dir.join(dir);
            match fs::create_dir_all(&target, false).await {
                Ok(()) => self.log.debug(format!("Created directory: {}", target.display())),
                Err(e) => {
                    self.log.error(format!("Failed to create {}: {e}", target.display()));
                    complete = false;
                }
            }
        }

        if complete {
            self.log
                .info(format!("✓ Distribution package ready: {}", dist_dir.display()));
        }
        complete
    }

    /// Summarizes a build pass.
    pub fn build_summary(&self, results: &[BuildResult]) -> BuildSummary {
        BuildSummary::from_results(&self.platform, &self.arch, self.output_directory(), results)
    }

    /// Creates an installer of `format` for this builder's platform.
    pub async fn create_installer(&self, format: InstallerFormat) -> bool {
        self.variant.create_installer(format, &self.log).await
    }
}
