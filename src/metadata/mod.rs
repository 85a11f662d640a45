//! Persisted build records.
//!
//! One JSON file per `{name}-{version}-{platform}-{arch}` key lives in the
//! packages directory next to the release archives built from the same
//! distribution. Saving a record with an existing key overwrites it.

use crate::{
    bundler::error::{Context, ErrorExt, Result},
    bundler::utils::fs,
    logger::Logger,
};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Archive extensions removed together with their record.
pub const ARCHIVE_EXTENSIONS: [&str; 3] = [".zip", ".tar.gz", ".tgz"];

/// Facts describing one completed build.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PackageMetadata {
    pub name: String,
    pub version: String,
    pub platform: String,
    pub arch: String,
    #[serde(
        default = "Utc::now",
        serialize_with = "serialize_build_time",
        deserialize_with = "deserialize_build_time"
    )]
    pub build_time: DateTime<Utc>,
    /// Opaque build detail, usually a serialized build summary.
    #[serde(default = "empty_object")]
    pub build_info: Value,
}

impl PackageMetadata {
    /// New record stamped with the current time and empty build info.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        platform: impl Into<String>,
        arch: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            platform: platform.into(),
            arch: arch.into(),
            build_time: Utc::now(),
            build_info: empty_object(),
        }
    }

    pub fn with_build_info(mut self, build_info: Value) -> Self {
        self.build_info = build_info;
        self
    }

    /// `{name}-{version}-{platform}-{arch}`, the record and archive base name.
    pub fn key(&self) -> String {
        format!("{}-{}-{}-{}", self.name, self.version, self.platform, self.arch)
    }

    /// `{platform}-{arch}` grouping key.
    pub fn platform_key(&self) -> String {
        format!("{}-{}", self.platform, self.arch)
    }
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

fn serialize_build_time<S: Serializer>(time: &DateTime<Utc>, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&time.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

/// Accepts RFC 3339 and offset-less ISO 8601 timestamps (read as UTC).
fn deserialize_build_time<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error> {
    let text = String::deserialize(deserializer)?;
    parse_build_time(&text).ok_or_else(|| serde::de::Error::custom(format!("invalid build_time '{text}'")))
}

fn parse_build_time(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(time) = DateTime::parse_from_rfc3339(text) {
        return Some(time.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Directory of metadata record files.
#[derive(Clone, Debug)]
pub struct MetadataStore {
    dir: PathBuf,
}

impl MetadataStore {
    /// Store rooted at `dir`; nothing is created until [`open`](Self::open) or a save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at `dir`, creating the directory if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::new(dir);
        fs::create_dir_all(&store.dir, false).await?;
        Ok(store)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the record file for `key`.
    pub fn record_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Writes `record`, replacing any record with the same key.
    pub async fn save(&self, record: &PackageMetadata) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir, false).await?;
        let path = self.record_path(&record.key());
        let json = serde_json::to_string_pretty(record)?;
        tokio::fs::write(&path, json)
            .await
            .fs_context("writing metadata record", &path)?;
        Ok(path)
    }

    /// Every readable record, ordered by file name.
    ///
    /// Unreadable or malformed files are skipped with one warning each.
    pub async fn list(&self, log: &Logger) -> Result<Vec<PackageMetadata>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }

        let dir = self
            .dir
            .to_str()
            .context("metadata directory is not valid UTF-8")?;
        let pattern = format!("{}/*.json", glob::Pattern::escape(dir));

        let mut files: Vec<PathBuf> = glob::glob(&pattern)?
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    log.warn(format!("Skipping unreadable metadata entry: {e}"));
                    None
                }
            })
            .filter(|path| path.is_file())
            .collect();
        files.sort();

        let mut records = Vec::with_capacity(files.len());
        for path in files {
            match read_record(&path).await {
                Ok(record) => records.push(record),
                Err(e) => log.warn(format!("Failed to read metadata file {}: {e}", path.display())),
            }
        }
        Ok(records)
    }

    /// Deletes the record file and any archive sharing its base name.
    ///
    /// Returns the files actually deleted.
    pub async fn remove(&self, record: &PackageMetadata) -> Result<Vec<PathBuf>> {
        let key = record.key();
        let mut removed = Vec::new();

        let record_file = self.record_path(&key);
        if fs::remove_file(&record_file).await? {
            removed.push(record_file);
        }

        for ext in ARCHIVE_EXTENSIONS {
            let archive = self.dir.join(format!("{key}{ext}"));
            if fs::remove_file(&archive).await? {
                removed.push(archive);
            }
        }
        Ok(removed)
    }
}

async fn read_record(path: &Path) -> Result<PackageMetadata> {
    let text = tokio::fs::read_to_string(path)
        .await
        .fs_context("reading metadata record", path)?;
    Ok(serde_json::from_str(&text)?)
}
