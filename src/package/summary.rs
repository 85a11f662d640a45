//! Release overview across every recorded build.

use crate::metadata::PackageMetadata;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One recorded build of a platform.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReleaseEntry {
    pub version: String,
    pub build_time: DateTime<Utc>,
    pub build_info: Value,
}

/// Most recent build overall.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestBuild {
    /// `{platform}-{arch}`
    pub platform: String,
    pub version: String,
    pub build_time: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReleaseSummary {
    pub project_name: String,
    pub project_version: String,
    pub total_packages: usize,
    /// Builds grouped by `{platform}-{arch}`, in listing order.
    pub platforms: BTreeMap<String, Vec<ReleaseEntry>>,
    pub latest_build: Option<LatestBuild>,
}

impl ReleaseSummary {
    /// Aggregates `records`; on equal timestamps the earlier record wins
    /// `latest_build`.
    pub fn from_records(
        project_name: impl Into<String>,
        project_version: impl Into<String>,
        records: &[PackageMetadata],
    ) -> Self {
        let mut platforms: BTreeMap<String, Vec<ReleaseEntry>> = BTreeMap::new();
        let mut latest: Option<&PackageMetadata> = None;

        for record in records {
            platforms
                .entry(record.platform_key())
                .or_default()
                .push(ReleaseEntry {
                    version: record.version.clone(),
                    build_time: record.build_time,
                    build_info: record.build_info.clone(),
                });

            if latest.is_none_or(|current| record.build_time > current.build_time) {
                latest = Some(record);
            }
        }

        Self {
            project_name: project_name.into(),
            project_version: project_version.into(),
            total_packages: records.len(),
            platforms,
            latest_build: latest.map(|record| LatestBuild {
                platform: record.platform_key(),
                version: record.version.clone(),
                build_time: record.build_time,
            }),
        }
    }
}
