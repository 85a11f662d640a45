//! Core build layer.
//!
//! Configuration, per-platform builders and the filesystem helpers they share.
//!
//! # Module Organization
//!
//! - [`settings`] - Project configuration ([`BuildConfig`]) and its builder
//! - [`builder`] - Build passes and summaries
//! - [`platform`] - Platform variants and [`BuilderFactory`]
//! - [`utils`] - Filesystem helpers
//! - [`error`] - Error types for this layer

pub mod builder;
pub mod error;
pub mod platform;
pub mod settings;
pub mod utils;

pub use builder::{
    BuildResult, BuildStatus, BuildSummary, Builder, CrossPlatformBuilder, CrossSummary,
    PlatformOutcome, PlatformStatus,
};
pub use error::{Context, Error, ErrorExt, Result};
pub use platform::{BuilderFactory, InstallerFormat, PlatformVariant};
pub use settings::{BuildConfig, BuildConfigBuilder, DataMapping, HostPlatform, PlatformOptions};
