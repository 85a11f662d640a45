//! Cleanup of bundler spec files.
//!
//! The bundler caches one `.spec` descriptor per script in the build
//! directory. Spec files anywhere else (project root, distribution, scratch
//! or packages directories) are misplaced and always deleted.

use crate::{
    bundler::{error::{Context, Result}, settings::BuildConfig, utils::fs},
    logger::Logger,
};
use serde::Serialize;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    time::SystemTime,
};
use walkdir::WalkDir;

const SPEC_EXTENSION: &str = "spec";

/// Files deleted and kept by a spec cleanup.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SpecCleanup {
    pub removed: Vec<PathBuf>,
    /// Spec files left in the build directory.
    pub kept: Vec<PathBuf>,
}

/// Script a spec file was generated for: its file name up to the first `.`.
pub fn spec_group(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.split_once('.') {
        Some((group, _)) => group.to_string(),
        None => name,
    }
}

fn is_spec_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == SPEC_EXTENSION)
}

/// Spec files under `dir`, sorted; top level only unless `recursive`.
async fn find_spec_files(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let dir = dir.to_path_buf();

    tokio::task::spawn_blocking(move || -> Result<Vec<PathBuf>> {
        let mut walker = WalkDir::new(&dir).min_depth(1).sort_by_file_name();
        if !recursive {
            walker = walker.max_depth(1);
        }

        let mut found = Vec::new();
        for entry in walker {
            let entry = entry?;
            if entry.file_type().is_file() && is_spec_file(entry.path()) {
                found.push(entry.into_path());
            }
        }
        Ok(found)
    })
    .await
    .context("spec scan task failed")?
}

async fn modified(path: &Path) -> SystemTime {
    tokio::fs::metadata(path)
        .await
        .and_then(|m| m.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH)
}

/// Removes spec files according to their location.
///
/// In the build directory, `keep_latest_only` keeps the most recently
/// modified file per script and deletes the rest; otherwise every spec file
/// there is deleted. Failures are logged and the scan continues.
pub async fn clean_spec_files(config: &BuildConfig, keep_latest_only: bool, log: &Logger) -> SpecCleanup {
    log.info("Cleaning spec files...");
    let mut cleanup = SpecCleanup::default();

    let build_dir = config.build_dir();
    let build_specs = scan(&build_dir, false, log).await;
    if !build_specs.is_empty() {
        log.info(format!(
            "Found {} spec files in {}",
            build_specs.len(),
            build_dir.display()
        ));
    }

    if keep_latest_only {
        let mut groups: BTreeMap<String, Vec<(SystemTime, PathBuf)>> = BTreeMap::new();
        for path in build_specs {
            let mtime = modified(&path).await;
            groups.entry(spec_group(&path)).or_default().push((mtime, path));
        }

        for (_, mut files) in groups {
            // Newest first; equal times fall back to name order.
            files.sort_by(|(ta, pa), (tb, pb)| tb.cmp(ta).then_with(|| pa.cmp(pb)));
            let mut files = files.into_iter().map(|(_, path)| path);
            if let Some(latest) = files.next() {
                cleanup.kept.push(latest);
            }
            for old in files {
                delete(&old, &mut cleanup, log, |p| format!("Removed old spec file: {}", p.display())).await;
            }
        }
    } else {
        for path in build_specs {
            delete(&path, &mut cleanup, log, |p| format!("Removed spec file: {}", p.display())).await;
        }
    }

    let root = config.root_dir();
    let mut misplaced_dirs = vec![(root.to_path_buf(), false)];
    for dir in [config.dist_dir(), config.temp_dir(), config.packages_dir()] {
        misplaced_dirs.push((dir, true));
    }

    for (dir, recursive) in misplaced_dirs {
        if dir == build_dir {
            continue;
        }
        for path in scan(&dir, recursive, log).await {
            log.warn(format!("Removing misplaced spec file: {}", path.display()));
            delete(&path, &mut cleanup, log, |p| format!("Removed spec file: {}", p.display())).await;
        }
    }

    cleanup.kept.sort();
    if cleanup.removed.is_empty() {
        log.info("No spec files to remove");
    } else {
        log.info(format!("✓ Removed {} spec files", cleanup.removed.len()));
    }
    cleanup
}

async fn scan(dir: &Path, recursive: bool, log: &Logger) -> Vec<PathBuf> {
    find_spec_files(dir, recursive).await.unwrap_or_else(|e| {
        log.error(format!("Failed to scan {} for spec files: {e}", dir.display()));
        Vec::new()
    })
}

async fn delete(path: &Path, cleanup: &mut SpecCleanup, log: &Logger, message: impl Fn(&Path) -> String) {
    match fs::remove_file(path).await {
        Ok(true) => {
            log.info(message(path));
            cleanup.removed.push(path.to_path_buf());
        }
        Ok(false) => {}
        Err(e) => log.error(format!("Failed to remove {}: {e}", path.display())),
    }
}
