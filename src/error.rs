//! Crate-level error types.
//!
//! Configuration problems are reported through [`ConfigError`]; everything the
//! build pipeline raises internally funnels into [`BundlerError`].

use thiserror::Error;

/// Result type alias for crate-level operations
pub type Result<T> = std::result::Result<T, BundlerError>;

/// Main error type for orchestrator setup and persistence
#[derive(Error, Debug)]
pub enum BundlerError {
    /// Invalid build configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Bundler errors
    #[error("Bundler error: {0}")]
    Bundler(#[from] crate::bundler::Error),
}

/// Configuration validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required setting was never provided
    #[error("Missing required setting: {field}")]
    MissingField {
        /// Setting name
        field: &'static str,
    },

    /// Project version is not a semantic version
    #[error("Invalid project version '{version}': {reason}")]
    InvalidVersion {
        /// Rejected version string
        version: String,
        /// Parser message
        reason: String,
    },

    /// Platform flags try to override an output flag owned by the orchestrator
    #[error("Platform '{platform}' redefines reserved flag {flag}")]
    ReservedFlag {
        /// Platform table entry
        platform: String,
        /// Offending flag
        flag: String,
    },

    /// Platform identifier cannot be used as a directory name component
    #[error("Invalid platform identifier '{platform}'")]
    InvalidPlatform {
        /// Rejected identifier
        platform: String,
    },

    /// An external command line is empty
    #[error("Command for {purpose} is empty")]
    EmptyCommand {
        /// What the command is used for
        purpose: &'static str,
    },
}
