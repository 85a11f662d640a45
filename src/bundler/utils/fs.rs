//! File system utilities for build orchestration.
//!
//! Idempotent directory operations and copy helpers with path context on
//! every error.

use crate::bundler::error::{Context, ErrorExt, Result};
use std::{
    io,
    path::{Path, PathBuf},
};
use tokio::fs;

/// Creates all of the directories of the specified path, erasing it first if specified.
pub async fn create_dir_all(path: &Path, erase: bool) -> Result<()> {
    if erase {
        remove_dir_all(path).await?;
    }

    // create_dir_all is already idempotent - succeeds even if dir exists
    fs::create_dir_all(path)
        .await
        .fs_context("creating directory", path)
}

/// Removes the directory and its contents if it exists.
pub async fn remove_dir_all(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()), // Idempotent
        Err(e) => Err(e).fs_context("removing directory", path),
    }
}

/// Removes a file if it exists.
///
/// Returns whether a file was actually deleted.
pub async fn remove_file(path: &Path) -> Result<bool> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).fs_context("removing file", path),
    }
}

/// Removes every subdirectory of `dir`, leaving top-level files untouched.
///
/// Returns the removed directories.
pub async fn remove_subdirectories(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(removed),
        Err(e) => return Err(e).fs_context("reading directory", dir),
    };

    while let Some(entry) = entries
        .next_entry()
        .await
        .fs_context("reading directory entry", dir)?
    {
        let path = entry.path();
        let file_type = entry
            .file_type()
            .await
            .fs_context("reading file type", &path)?;
        if file_type.is_dir() {
            remove_dir_all(&path).await?;
            removed.push(path);
        }
    }

    removed.sort();
    Ok(removed)
}

/// Copies a regular file into `dest_dir`, keeping its file name.
///
/// Fails if the source path is a directory or doesn't exist.
pub async fn copy_into(from: &Path, dest_dir: &Path) -> Result<PathBuf> {
    if !from.is_file() {
        crate::bail!("{} is not a file", from.display());
    }
    let file_name = from
        .file_name()
        .context(format!("{} has no file name", from.display()))?;
    let to = dest_dir.join(file_name);

    fs::create_dir_all(dest_dir)
        .await
        .fs_context("creating destination directory", dest_dir)?;
    fs::copy(from, &to).await.fs_context("copying file", &to)?;
    Ok(to)
}

/// Marks a file `rwxr-xr-x`.
#[cfg(unix)]
pub async fn set_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .await
        .fs_context("setting executable permissions", path)
}

/// Marks a file `rwxr-xr-x`.
///
/// Executability is not a permission bit on this platform; nothing to do.
#[cfg(not(unix))]
pub async fn set_executable(path: &Path) -> Result<()> {
    fs::metadata(path)
        .await
        .fs_context("reading executable metadata", path)?;
    Ok(())
}
