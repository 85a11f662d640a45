//! Release management on top of the build layer.
//!
//! [`PackageManager`] runs build passes, persists one metadata record per
//! platform build, turns distribution directories into release archives, and
//! keeps the packages and build directories tidy.
//!
//! # Example
//!
//! ```no_run
//! use kodegen_bundler_onefile::bundler::BuildConfig;
//! use kodegen_bundler_onefile::logger::Logger;
//! use kodegen_bundler_onefile::package::{DEFAULT_KEEP_LATEST, PackageManager};
//! use std::sync::Arc;
//!
//! # async fn example() -> kodegen_bundler_onefile::Result<()> {
//! let config = Arc::new(BuildConfig::from_file("bundle.toml")?);
//! let manager = PackageManager::new(config, Logger::facade()).await?;
//!
//! let summary = manager.build_current_platform().await;
//! if summary.successful() > 0 {
//!     manager
//!         .create_release_package(&summary.platform, &summary.arch, "zip")
//!         .await;
//! }
//!
//! manager.clean_spec_files(true).await;
//! manager.clean_packages(DEFAULT_KEEP_LATEST).await;
//! # Ok(())
//! # }
//! ```

mod archive;
mod spec_files;
mod summary;

pub use archive::{ArchiveFormat, create_archive};
pub use spec_files::{SpecCleanup, spec_group};
pub use summary::{LatestBuild, ReleaseEntry, ReleaseSummary};

use crate::{
    bundler::{
        builder::{
            BuildResult, BuildSummary, CrossPlatformBuilder, CrossSummary, PlatformOutcome,
            PlatformStatus, result::PLATFORM_CHECK,
        },
        platform::BuilderFactory,
        settings::{BuildConfig, HostPlatform},
    },
    error::Result,
    logger::Logger,
    metadata::{MetadataStore, PackageMetadata},
};
use std::{
    collections::BTreeMap,
    path::PathBuf,
    sync::Arc,
};

/// Records kept per platform by [`PackageManager::clean_packages`] by default.
pub const DEFAULT_KEEP_LATEST: usize = 5;

/// Build, record and release façade for one project.
#[derive(Debug, Clone)]
pub struct PackageManager {
    config: Arc<BuildConfig>,
    store: MetadataStore,
    log: Logger,
}

impl PackageManager {
    /// Creates the manager, creating the packages directory if absent.
    pub async fn new(config: Arc<BuildConfig>, log: Logger) -> Result<Self> {
        let store = MetadataStore::open(config.packages_dir()).await?;
        log.info(format!(
            "Package manager ready for {} {}",
            config.name(),
            config.version()
        ));
        Ok(Self { config, store, log })
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn store(&self) -> &MetadataStore {
        &self.store
    }

    /// Builds for the host, prepares its distribution directory, and records
    /// the outcome whatever it was.
    pub async fn build_current_platform(&self) -> BuildSummary {
        self.log.info("Building for the current platform...");

        let summary = match BuilderFactory::create(self.config.clone(), None, self.log.clone()) {
            Ok(builder) => {
                let results = builder.build_all().await;
                builder.create_distribution_package().await;
                builder.build_summary(&results)
            }
            Err(e) => {
                self.log.error(format!("Failed to create host builder: {e}"));
                let host = HostPlatform::detect();
                let output = self.config.dist_platform_dir(&host.platform, &host.arch);
                BuildSummary::from_results(
                    host.platform,
                    host.arch,
                    output,
                    &[BuildResult::failed(PLATFORM_CHECK, e.to_string())],
                )
            }
        };

        self.record(&summary).await;
        self.log.info(format!(
            "✓ Current platform build finished: {} ({}/{} built)",
            summary.identifier(),
            summary.successful(),
            summary.total()
        ));
        summary
    }

    /// Builds the given platforms, or every supported platform when the list
    /// is absent or empty, one after the other.
    ///
    /// Requested platforms outside the supported set fail fast: they are
    /// reported as not attempted and nothing is built or recorded for them.
    ///
    /// Only platforms with at least one built script are recorded.
    pub async fn build_cross_platform(&self, platforms: Option<&[&str]>) -> CrossSummary {
        self.log.info("Starting cross-platform build...");

        let cross = CrossPlatformBuilder::new(self.config.clone(), self.log.clone());
        let outcomes = match platforms {
            Some(requested) if !requested.is_empty() => {
                let mut outcomes = BTreeMap::new();
                for platform in requested {
                    let name = crate::bundler::settings::normalize_platform(platform);
                    if outcomes.contains_key(&name) {
                        continue;
                    }
                    // Unsupported names come back as NotAttempted without running anything.
                    let outcome = cross.outcome_for(&name).await;
                    outcomes.insert(name, outcome);
                }
                outcomes
            }
            _ => cross.build_for_all().await,
        };

        for (platform, outcome) in &outcomes {
            match (outcome.status(), outcome) {
                (PlatformStatus::Succeeded, PlatformOutcome::Attempted { arch, results }) => {
                    let summary = BuildSummary::from_results(
                        platform.as_str(),
                        arch.as_str(),
                        self.config.dist_platform_dir(platform, arch),
                        results,
                    );
                    self.record(&summary).await;
                }
                (PlatformStatus::NotAttempted, _) => {
                    self.log.warn(format!("Platform {platform} was not attempted"));
                }
                _ => {
                    self.log
                        .warn(format!("No script built for {platform}, nothing recorded"));
                }
            }
        }

        let summary = cross.cross_summary(&outcomes);
        self.log.info(format!(
            "✓ Cross-platform build finished: {} attempted, {} not attempted",
            summary.platforms.len(),
            summary.not_attempted.len()
        ));
        summary
    }

    async fn record(&self, summary: &BuildSummary) {
        let build_info = match serde_json::to_value(summary) {
            Ok(value) => value,
            Err(e) => {
                self.log.error(format!("Failed to serialize build summary: {e}"));
                return;
            }
        };

        let record = PackageMetadata::new(
            self.config.name(),
            self.config.version(),
            summary.platform.as_str(),
            summary.arch.as_str(),
        )
        .with_build_info(build_info);

        match self.store.save(&record).await {
            Ok(path) => self.log.debug(format!("Saved metadata: {}", path.display())),
            Err(e) => self.log.error(format!("Failed to save metadata for {}: {e}", record.key())),
        }
    }

    /// Archives `dist/{platform}-{arch}` into the packages directory as
    /// `{name}-{version}-{platform}-{arch}.{ext}`.
    ///
    /// Returns `None` (and creates nothing) when the distribution directory
    /// is missing or the format is not recognized.
    pub async fn create_release_package(&self, platform: &str, arch: &str, format: &str) -> Option<PathBuf> {
        self.log
            .info(format!("Creating release package for {platform}-{arch}..."));

        let dist_dir = self.config.dist_platform_dir(platform, arch);
        if !dist_dir.is_dir() {
            self.log.error(format!(
                "Distribution directory does not exist: {}",
                dist_dir.display()
            ));
            return None;
        }

        let Some(format) = ArchiveFormat::parse(format) else {
            self.log.error(format!("Unsupported package format: {format}"));
            return None;
        };

        if let Err(e) = crate::bundler::utils::fs::create_dir_all(self.store.dir(), false).await {
            self.log.error(format!("Failed to create packages directory: {e}"));
            return None;
        }

        let package_path = self.store.dir().join(format!(
            "{}{}",
            self.config.release_base_name(platform, arch),
            format.extension()
        ));

        match create_archive(format, &dist_dir, &package_path).await {
            Ok(entries) => {
                self.log.info(format!(
                    "✓ Release package created: {} ({entries} files)",
                    package_path.display()
                ));
                Some(package_path)
            }
            Err(e) => {
                self.log.error(format!(
                    "Failed to create {format} package {}: {e}",
                    package_path.display()
                ));
                None
            }
        }
    }

    /// Every readable metadata record; malformed ones are skipped with a
    /// warning.
    pub async fn list_packages(&self) -> Vec<PackageMetadata> {
        self.store.list(&self.log).await.unwrap_or_else(|e| {
            self.log.error(format!("Failed to list packages: {e}"));
            Vec::new()
        })
    }

    /// Keeps the `keep_latest` newest records per `{platform}-{arch}` and
    /// deletes the rest together with their archives.
    ///
    /// Returns the records that were removed.
    pub async fn clean_packages(&self, keep_latest: usize) -> Vec<PackageMetadata> {
        self.log
            .info(format!("Cleaning packages, keeping the latest {keep_latest} per platform..."));

        let mut groups: BTreeMap<String, Vec<PackageMetadata>> = BTreeMap::new();
        for record in self.list_packages().await {
            groups.entry(record.platform_key()).or_default().push(record);
        }

        let mut removed = Vec::new();
        for (_, mut records) in groups {
            records.sort_by(|a, b| b.build_time.cmp(&a.build_time));
            for old in records.into_iter().skip(keep_latest) {
                match self.store.remove(&old).await {
                    Ok(_) => {
                        self.log.info(format!("Removed old package: {}", old.key()));
                        removed.push(old);
                    }
                    Err(e) => self
                        .log
                        .error(format!("Failed to remove package {}: {e}", old.key())),
                }
            }
        }
        removed
    }

    /// Removes stale and misplaced bundler spec files.
    pub async fn clean_spec_files(&self, keep_latest_only: bool) -> SpecCleanup {
        spec_files::clean_spec_files(&self.config, keep_latest_only, &self.log).await
    }

    /// First recorded build for `platform`/`arch` in listing order.
    pub async fn get_package_info(&self, platform: &str, arch: &str) -> Option<PackageMetadata> {
        self.list_packages()
            .await
            .into_iter()
            .find(|record| record.platform == platform && record.arch == arch)
    }

    /// Overview of every recorded build.
    pub async fn create_release_summary(&self) -> ReleaseSummary {
        let records = self.list_packages().await;
        ReleaseSummary::from_records(self.config.name(), self.config.version(), &records)
    }
}
