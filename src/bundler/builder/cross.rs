//! Sequential multi-platform builds.

use super::{
    orchestrator::Builder,
    result::{BuildCounts, BuildResult, PLATFORM_CHECK},
};
use crate::{
    bundler::{platform::BuilderFactory, settings::{BuildConfig, normalize_platform}},
    logger::Logger,
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, sync::Arc};

/// Outcome of one platform in a cross-platform pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlatformOutcome {
    /// No builder could be constructed, nothing ran.
    NotAttempted { reason: String },
    /// A build pass ran; `results` may contain only failures.
    Attempted {
        arch: String,
        results: Vec<BuildResult>,
    },
}

impl PlatformOutcome {
    pub fn status(&self) -> PlatformStatus {
        match self {
            Self::NotAttempted { .. } => PlatformStatus::NotAttempted,
            Self::Attempted { results, .. } if results.iter().any(BuildResult::success) => {
                PlatformStatus::Succeeded
            }
            Self::Attempted { .. } => PlatformStatus::Failed,
        }
    }

    /// Script results; empty when not attempted.
    pub fn results(&self) -> &[BuildResult] {
        match self {
            Self::NotAttempted { .. } => &[],
            Self::Attempted { results, .. } => results,
        }
    }

    pub fn arch(&self) -> Option<&str> {
        match self {
            Self::NotAttempted { .. } => None,
            Self::Attempted { arch, .. } => Some(arch),
        }
    }
}

/// Tri-state platform status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformStatus {
    NotAttempted,
    /// Attempted, but no script built.
    Failed,
    /// At least one script built.
    Succeeded,
}

/// Per-platform line of a [`CrossSummary`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlatformReport {
    pub status: PlatformStatus,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub arch: Option<String>,
    #[serde(flatten)]
    pub counts: BuildCounts,
    /// Why the platform was not attempted.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub reason: Option<String>,
}

/// Summary over every platform of a cross-platform pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CrossSummary {
    /// Platforms whose build pass ran.
    pub platforms: Vec<String>,
    /// Platforms reported, attempted or not.
    pub total_platforms: usize,
    pub not_attempted: Vec<String>,
    pub platform_results: BTreeMap<String, PlatformReport>,
}

impl CrossSummary {
    pub fn status(&self, platform: &str) -> Option<PlatformStatus> {
        self.platform_results.get(platform).map(|report| report.status)
    }
}

/// Runs one [`Builder`] per platform, one platform at a time.
///
/// Platforms whose builder cannot be constructed are remembered with the
/// reason and surface as [`PlatformOutcome::NotAttempted`].
#[derive(Debug)]
pub struct CrossPlatformBuilder {
    builders: Vec<Builder>,
    unavailable: Vec<(String, String)>,
    log: Logger,
}

impl CrossPlatformBuilder {
    /// Builders for every supported platform.
    pub fn new(config: Arc<BuildConfig>, log: Logger) -> Self {
        Self::with_platforms(config, BuilderFactory::supported_platforms(), log)
    }

    /// Builders for an explicit platform list, in order. Duplicates are
    /// ignored.
    pub fn with_platforms<S: AsRef<str>>(config: Arc<BuildConfig>, platforms: &[S], log: Logger) -> Self {
        let mut builders: Vec<Builder> = Vec::new();
        let mut unavailable = Vec::new();

        for requested in platforms {
            let name = normalize_platform(requested.as_ref());
            let known = builders.iter().any(|b| b.platform() == name)
                || unavailable.iter().any(|(p, _)| *p == name);
            if known {
                continue;
            }

            match BuilderFactory::create(config.clone(), Some(&name), log.clone()) {
                Ok(builder) => builders.push(builder),
                Err(e) => {
                    log.error(format!("Failed to create builder for {name}: {e}"));
                    unavailable.push((name, e.to_string()));
                }
            }
        }

        Self {
            builders,
            unavailable,
            log,
        }
    }

    /// Platforms with a builder, in build order.
    pub fn available_platforms(&self) -> Vec<&str> {
        self.builders.iter().map(Builder::platform).collect()
    }

    pub fn builder(&self, platform: &str) -> Option<&Builder> {
        let name = normalize_platform(platform);
        self.builders.iter().find(|b| b.platform() == name)
    }

    fn unavailable_reason(&self, platform: &str) -> String {
        self.unavailable
            .iter()
            .find(|(p, _)| p == platform)
            .map(|(_, reason)| reason.clone())
            .unwrap_or_else(|| format!("unsupported platform {platform}"))
    }

    /// Runs a build pass for `platform`, or reports why it cannot run.
    pub async fn outcome_for(&self, platform: &str) -> PlatformOutcome {
        let name = normalize_platform(platform);
        match self.builder(&name) {
            Some(builder) => PlatformOutcome::Attempted {
                arch: builder.arch().to_string(),
                results: builder.build_all().await,
            },
            None => {
                let reason = self.unavailable_reason(&name);
                self.log
                    .error(format!("Cannot build for {name}: {reason}"));
                PlatformOutcome::NotAttempted { reason }
            }
        }
    }

    /// Build results for `platform`; a single synthetic failure when no
    /// builder exists for it.
    pub async fn build_for(&self, platform: &str) -> Vec<BuildResult> {
        match self.outcome_for(platform).await {
            PlatformOutcome::Attempted { results, .. } => results,
            PlatformOutcome::NotAttempted { reason } => vec![BuildResult::failed(
                PLATFORM_CHECK,
                format!("platform {} unavailable: {reason}", normalize_platform(platform)),
            )],
        }
    }

    /// Builds every constructed platform sequentially.
    pub async fn build_for_all(&self) -> BTreeMap<String, PlatformOutcome> {
        let mut outcomes = BTreeMap::new();

        for builder in &self.builders {
            self.log
                .info(format!("Building for platform: {}", builder.platform()));
            outcomes.insert(
                builder.platform().to_string(),
                PlatformOutcome::Attempted {
                    arch: builder.arch().to_string(),
                    results: builder.build_all().await,
                },
            );
        }

        for (platform, reason) in &self.unavailable {
            outcomes.insert(
                platform.clone(),
                PlatformOutcome::NotAttempted {
                    reason: reason.clone(),
                },
            );
        }

        outcomes
    }

    /// Per-platform counts using the same rules as a single build summary.
    pub fn cross_summary(&self, outcomes: &BTreeMap<String, PlatformOutcome>) -> CrossSummary {
        let mut platforms = Vec::new();
        let mut not_attempted = Vec::new();
        let mut platform_results = BTreeMap::new();

        for (platform, outcome) in outcomes {
            let reason = match outcome {
                PlatformOutcome::NotAttempted { reason } => {
                    not_attempted.push(platform.clone());
                    Some(reason.clone())
                }
                PlatformOutcome::Attempted { .. } => {
                    platforms.push(platform.clone());
                    None
                }
            };

            platform_results.insert(
                platform.clone(),
                PlatformReport {
                    status: outcome.status(),
                    arch: outcome.arch().map(str::to_string),
                    counts: BuildCounts::from_results(outcome.results()),
                    reason,
                },
            );
        }

        CrossSummary {
            total_platforms: outcomes.len(),
            platforms,
            not_attempted,
            platform_results,
        }
    }
}
