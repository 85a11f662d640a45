//! Per-script build outcomes and build pass summaries.

use serde::{Deserialize, Serialize};
use std::{
    fmt,
    path::{Path, PathBuf},
};

/// Script id used when environment validation stops a build pass.
pub const ENVIRONMENT_CHECK: &str = "environment-validation";
/// Script id used when dependency installation stops a build pass.
pub const DEPENDENCY_INSTALL: &str = "dependency-install";
/// Script id used when directory cleanup stops a build pass.
pub const DIRECTORY_CLEANUP: &str = "directory-cleanup";
/// Script id used when a platform has no builder.
pub const PLATFORM_CHECK: &str = "platform-check";

/// Outcome of one script build attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BuildStatus {
    /// The bundler exited successfully and produced the expected executable.
    Built {
        /// Verified executable path.
        executable: PathBuf,
    },
    /// The attempt failed.
    Failed {
        /// Human-readable failure reason.
        message: String,
    },
}

/// Result of building one script for one platform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildResult {
    /// Script identifier as configured (or a synthetic step id).
    pub script: String,
    /// Outcome.
    pub status: BuildStatus,
}

impl BuildResult {
    pub fn built(script: impl Into<String>, executable: impl Into<PathBuf>) -> Self {
        Self {
            script: script.into(),
            status: BuildStatus::Built {
                executable: executable.into(),
            },
        }
    }

    pub fn failed(script: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            status: BuildStatus::Failed {
                message: message.into(),
            },
        }
    }

    pub fn success(&self) -> bool {
        matches!(self.status, BuildStatus::Built { .. })
    }

    /// Failure reason; `None` on success.
    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            BuildStatus::Failed { message } => Some(message),
            BuildStatus::Built { .. } => None,
        }
    }

    /// Produced executable; `None` on failure.
    pub fn executable_path(&self) -> Option<&Path> {
        match &self.status {
            BuildStatus::Built { executable } => Some(executable),
            BuildStatus::Failed { .. } => None,
        }
    }
}

impl fmt::Display for BuildResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            BuildStatus::Built { executable } => {
                write!(f, "✓ {}: {}", self.script, executable.display())
            }
            BuildStatus::Failed { message } => write!(f, "✗ {}: {}", self.script, message),
        }
    }
}

/// Successful / failed / rate counts over a set of results.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuildCounts {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    /// `successful / total`, `0.0` when there are no results.
    pub success_rate: f64,
}

impl BuildCounts {
    pub fn from_results(results: &[BuildResult]) -> Self {
        let total = results.len();
        let successful = results.iter().filter(|r| r.success()).count();
        let success_rate = if total == 0 {
            0.0
        } else {
            successful as f64 / total as f64
        };

        Self {
            total,
            successful,
            failed: total - successful,
            success_rate,
        }
    }
}

/// Failed script and its reason.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedBuild {
    pub script: String,
    pub message: String,
}

/// Summary of one build pass, persisted as the metadata record's build info.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuildSummary {
    pub platform: String,
    pub arch: String,
    #[serde(flatten)]
    pub counts: BuildCounts,
    /// Scripts that built, in build order.
    pub successful_builds: Vec<String>,
    pub failed_builds: Vec<FailedBuild>,
    /// Distribution directory of the pass.
    pub output_directory: PathBuf,
}

impl BuildSummary {
    pub fn from_results(
        platform: impl Into<String>,
        arch: impl Into<String>,
        output_directory: impl Into<PathBuf>,
        results: &[BuildResult],
    ) -> Self {
        let (successful, failed): (Vec<&BuildResult>, Vec<&BuildResult>) =
            results.iter().partition(|r| r.success());

        Self {
            platform: platform.into(),
            arch: arch.into(),
            counts: BuildCounts::from_results(results),
            successful_builds: successful.into_iter().map(|r| r.script.clone()).collect(),
            failed_builds: failed
                .into_iter()
                .map(|r| FailedBuild {
                    script: r.script.clone(),
                    message: r.error_message().unwrap_or_default().to_string(),
                })
                .collect(),
            output_directory: output_directory.into(),
        }
    }

    /// `{platform}-{arch}`.
    pub fn identifier(&self) -> String {
        format!("{}-{}", self.platform, self.arch)
    }

    pub fn total(&self) -> usize {
        self.counts.total
    }

    pub fn successful(&self) -> usize {
        self.counts.successful
    }

    pub fn failed(&self) -> usize {
        self.counts.failed
    }

    pub fn success_rate(&self) -> f64 {
        self.counts.success_rate
    }
}
