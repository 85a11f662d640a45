//! Release orchestrator for single-file executable bundlers
//!
//! This library drives a PyInstaller-style bundler to produce one standalone
//! executable per project script and manages the resulting releases:
//! - Per-platform build passes with per-script results and summaries
//! - Sequential cross-platform passes with not-attempted/failed/succeeded outcomes
//! - Distribution directories, release archives (.zip, .tar.gz) and build records
//! - Cleanup of old packages and stray bundler spec files
//!
//! Every component logs through an injected [`logger::Logger`].

pub mod bundler;
pub mod error;
pub mod logger;
pub mod metadata;
pub mod package;

// Re-export commonly used types
pub use error::{BundlerError, ConfigError, Result};
