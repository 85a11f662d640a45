//! Release archive writers.

use crate::bundler::error::{Context, ErrorExt, Result};
use flate2::{Compression, write::GzEncoder};
use std::{
    fmt,
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use walkdir::WalkDir;
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

/// Release archive format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArchiveFormat {
    /// Deflate-compressed ZIP
    Zip,
    /// Gzip-compressed tarball
    TarGz,
}

impl ArchiveFormat {
    /// Parses `zip`, `tar`, `tar.gz` or `tgz`, ignoring case.
    pub fn parse(format: &str) -> Option<Self> {
        match format.trim().to_ascii_lowercase().as_str() {
            "zip" => Some(Self::Zip),
            "tar" | "tar.gz" | "tgz" => Some(Self::TarGz),
            _ => None,
        }
    }

    /// File extension including the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Zip => ".zip",
            Self::TarGz => ".tar.gz",
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Zip => "zip",
            Self::TarGz => "tar.gz",
        })
    }
}

/// Archives every regular file under `source_dir` into `destination`.
///
/// Entry names are relative to `source_dir` with `/` separators. A partially
/// written archive is removed on failure.
pub async fn create_archive(format: ArchiveFormat, source_dir: &Path, destination: &Path) -> Result<usize> {
    let source_dir = source_dir.to_path_buf();
    let destination = destination.to_path_buf();

    tokio::task::spawn_blocking(move || {
        let written = match format {
            ArchiveFormat::Zip => write_zip(&source_dir, &destination),
            ArchiveFormat::TarGz => write_tar_gz(&source_dir, &destination),
        };
        if written.is_err() {
            let _ = std::fs::remove_file(&destination);
        }
        written
    })
    .await
    .context("archive task failed")?
}

/// Regular files under `root` in sorted walk order, paired with entry names.
fn archive_entries(root: &Path) -> Result<Vec<(PathBuf, String)>> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root)?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        entries.push((entry.path().to_path_buf(), name));
    }
    Ok(entries)
}

fn write_zip(source_dir: &Path, destination: &Path) -> Result<usize> {
    let entries = archive_entries(source_dir)?;
    let file = File::create(destination).fs_context("creating archive", destination)?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (path, name) in &entries {
        zip.start_file(name.as_str(), options)?;
        let mut input = File::open(path).fs_context("opening archive entry", path)?;
        std::io::copy(&mut input, &mut zip).fs_context("writing archive entry", path)?;
    }

    zip.finish()?
        .flush()
        .fs_context("flushing archive", destination)?;
    Ok(entries.len())
}

fn write_tar_gz(source_dir: &Path, destination: &Path) -> Result<usize> {
    let entries = archive_entries(source_dir)?;
    let file = File::create(destination).fs_context("creating archive", destination)?;
    let encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    let mut tar = tar::Builder::new(encoder);

    for (path, name) in &entries {
        tar.append_path_with_name(path, name)
            .fs_context("writing archive entry", path)?;
    }

    tar.into_inner()
        .and_then(GzEncoder::finish)
        .and_then(|mut writer| writer.flush())
        .fs_context("finishing archive", destination)?;
    Ok(entries.len())
}
