//! Error types for build orchestration.
//!
//! Low-level errors raised while talking to the filesystem, the external
//! bundler, or the archive writers. Public operations usually convert these
//! into result values and log lines; the helpers below keep the internal code
//! `?`-friendly.

use std::{
    fmt::Display,
    io,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Result type alias for orchestration internals.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the bundler layer.
#[derive(Error, Debug)]
pub enum Error {
    /// Free-form error with a formatted message.
    #[error("{0}")]
    GenericError(String),

    /// Plain IO error without path context.
    #[error("{0}")]
    IoError(#[from] io::Error),

    /// IO error annotated with the operation and path involved.
    #[error("{context} {}: {source}", path.display())]
    Fs {
        /// What was being attempted, e.g. "removing build directory".
        context: &'static str,
        /// Path the operation touched.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// ZIP archive writer error.
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Directory traversal error.
    #[error("Directory walk error: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// Invalid glob pattern.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    /// Path outside the expected root.
    #[error("Path prefix error: {0}")]
    StripPrefix(#[from] std::path::StripPrefixError),
}

/// Attaches filesystem context to IO results.
pub trait ErrorExt<T> {
    /// Wraps the error in [`Error::Fs`] with `context` and `path`.
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, io::Error> {
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|source| Error::Fs {
            context,
            path: path.as_ref().to_path_buf(),
            source,
        })
    }
}

/// Converts options and foreign errors into [`Error::GenericError`].
pub trait Context<T> {
    /// Replaces the error (or `None`) with `msg`.
    fn context<C: Display>(self, msg: C) -> Result<T>;
}

impl<T> Context<T> for Option<T> {
    fn context<C: Display>(self, msg: C) -> Result<T> {
        self.ok_or_else(|| Error::GenericError(msg.to_string()))
    }
}

impl<T, E: Display> Context<T> for std::result::Result<T, E> {
    fn context<C: Display>(self, msg: C) -> Result<T> {
        self.map_err(|e| Error::GenericError(format!("{msg}: {e}")))
    }
}

/// Returns early with a formatted [`Error::GenericError`].
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::bundler::Error::GenericError(format!($($arg)*)))
    };
}
