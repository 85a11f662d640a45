//! External tool detection and availability checking.
//!
//! Locates the bundler and the dependency installer, and checks the bundler
//! with `--version` before a build pass starts.

use crate::logger::Logger;
use std::{
    path::{Path, PathBuf},
    process::Stdio,
};

/// Resolves `program` the way a shell would, relative paths against `root`.
pub fn locate(program: &str, root: &Path) -> Option<PathBuf> {
    which::which_in(program, std::env::var_os("PATH"), root).ok()
}

/// Checks that `program` exists and answers `--version`.
pub async fn check_version(program: &str, root: &Path, log: &Logger) -> bool {
    let path = match locate(program, root) {
        Some(path) => path,
        None => {
            log.error(format!("{program} not found in PATH"));
            return false;
        }
    };
    log.debug(format!("Found {program} at: {}", path.display()));

    match tokio::process::Command::new(&path)
        .arg("--version")
        .current_dir(root)
        .stdin(Stdio::null())
        .output()
        .await
    {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout);
            log.info(format!("✓ {program} available: {}", version.trim()));
            true
        }
        Ok(output) => {
            log.error(format!(
                "{} found but --version check failed (exit code: {:?}). Stderr: {}",
                path.display(),
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).trim()
            ));
            false
        }
        Err(e) => {
            log.error(format!(
                "{} found but failed to execute: {}. Check file permissions.",
                path.display(),
                e
            ));
            false
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::logger::MemoryLog;
    use std::sync::Arc;

    fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    async fn version_check_accepts_working_tool() {
        let dir = tempfile::tempdir().unwrap();
        script(dir.path(), "bundler", "echo 6.3.0");
        let log = Logger::memory(Arc::new(MemoryLog::new()));

        assert!(check_version("./bundler", dir.path(), &log).await);
    }

    #[tokio::test]
    async fn version_check_rejects_failing_or_missing_tool() {
        let dir = tempfile::tempdir().unwrap();
        script(dir.path(), "broken", "echo nope >&2; exit 3");
        let sink = Arc::new(MemoryLog::new());
        let log = Logger::memory(sink.clone());

        assert!(!check_version("./broken", dir.path(), &log).await);
        assert!(!check_version("definitely-not-a-bundler-xyz", dir.path(), &log).await);
        assert_eq!(sink.messages_at(log::Level::Error).len(), 2);
    }
}
