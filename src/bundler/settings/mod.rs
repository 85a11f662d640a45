//! Configuration structures for build orchestration.
//!
//! This module provides the immutable [`BuildConfig`], its fluent
//! [`BuildConfigBuilder`], the per-platform option table and host detection.

mod builder;
mod core;
mod file;
mod host;
mod platform;

// Re-export all public types
pub use builder::BuildConfigBuilder;
pub use core::{BuildConfig, DATA_SEPARATOR, RESERVED_FLAGS};
pub use host::HostPlatform;
pub use platform::{
    DataMapping, PlatformOptions, SUPPORTED_PLATFORMS, is_valid_platform_id, normalize_platform,
};
