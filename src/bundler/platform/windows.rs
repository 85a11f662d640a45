//! Windows post-processing and installer hooks.

use crate::logger::Logger;
use std::path::Path;

/// Post-processes a freshly built Windows executable.
///
/// Reserved for Authenticode signing, icon and version resources; currently
/// only records the intent.
pub async fn post_process(executable: &Path, log: &Logger) {
    log.debug(format!(
        "Windows post-processing for {} (signing, icon, version info not configured)",
        executable.display()
    ));
}

/// Creates an NSIS installer around the distribution directory.
pub async fn create_installer(log: &Logger) -> bool {
    log.info("Windows installer creation is not implemented yet");
    false
}
