//! Linux post-processing and package hooks.

use crate::{bundler::utils::fs, logger::Logger};
use std::path::Path;

/// Marks the executable `rwxr-xr-x`.
///
/// A permission failure is logged but does not fail the build: the artifact
/// exists and can still be fixed up by hand.
pub async fn post_process(executable: &Path, log: &Logger) {
    log.debug(format!("Linux post-processing for {}", executable.display()));
    match fs::set_executable(executable).await {
        Ok(()) => log.debug(format!("Set executable permissions: {}", executable.display())),
        Err(e) => log.warn(format!("Failed to set executable permissions: {e}")),
    }
}

/// Creates a Debian package from the distribution directory.
pub async fn create_deb_package(log: &Logger) -> bool {
    log.info("Debian package creation is not implemented yet");
    false
}

/// Creates an RPM package from the distribution directory.
pub async fn create_rpm_package(log: &Logger) -> bool {
    log.info("RPM package creation is not implemented yet");
    false
}
