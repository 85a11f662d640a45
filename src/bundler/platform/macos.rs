//! macOS post-processing and bundle hooks.

use crate::{bundler::utils::fs, logger::Logger};
use std::path::Path;

/// Marks the executable `rwxr-xr-x`; failures are logged as warnings only.
pub async fn post_process(executable: &Path, log: &Logger) {
    log.debug(format!("macOS post-processing for {}", executable.display()));
    if let Err(e) = fs::set_executable(executable).await {
        log.warn(format!("Failed to set executable permissions: {e}"));
    }
}

/// Wraps the executable into a `.app` bundle.
pub async fn create_app_bundle(log: &Logger) -> bool {
    log.info("macOS app bundle creation is not implemented yet");
    false
}

/// Creates a drag-to-install DMG.
pub async fn create_dmg_installer(log: &Logger) -> bool {
    log.info("DMG installer creation is not implemented yet");
    false
}
