//! Builder selection by platform name.

use super::PlatformVariant;
use crate::{
    bundler::{
        Builder,
        settings::{
            BuildConfig, HostPlatform, SUPPORTED_PLATFORMS, is_valid_platform_id,
            normalize_platform,
        },
    },
    error::{ConfigError, Result},
    logger::Logger,
};
use std::sync::Arc;

/// Creates the right [`Builder`] for a platform name.
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_onefile::bundler::{BuildConfigBuilder, BuilderFactory};
/// use kodegen_bundler_onefile::logger::Logger;
/// use std::sync::Arc;
///
/// # fn example() -> kodegen_bundler_onefile::Result<()> {
/// let config = Arc::new(BuildConfigBuilder::new().name("app").version("1.0.0").build()?);
///
/// // Host platform
/// let host = BuilderFactory::create(config.clone(), None, Logger::facade())?;
///
/// // Explicit platform, case-insensitive
/// let windows = BuilderFactory::create(config, Some("Windows"), Logger::facade())?;
/// assert_eq!(windows.platform(), "windows");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct BuilderFactory;

impl BuilderFactory {
    /// Creates a builder for `platform`, or for the host when `None`.
    ///
    /// Unknown platform names fall back to the generic builder with a
    /// warning.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidPlatform`] when the name cannot be used as a
    /// distribution directory component.
    pub fn create(config: Arc<BuildConfig>, platform: Option<&str>, log: Logger) -> Result<Builder> {
        let host = HostPlatform::detect();
        let platform = platform
            .map(normalize_platform)
            .unwrap_or_else(|| host.platform.clone());

        if !is_valid_platform_id(&platform) {
            return Err(ConfigError::InvalidPlatform { platform }.into());
        }

        let variant = PlatformVariant::from_platform(&platform).unwrap_or_else(|| {
            log.warn(format!("Unknown platform {platform}, using the generic builder"));
            PlatformVariant::Generic
        });

        log.info(format!(
            "Initialized {variant} builder for {platform}-{}",
            host.arch
        ));
        Ok(Builder::new(config, variant, platform, host.arch, log))
    }

    /// Platforms the factory specializes for, in build order.
    pub fn supported_platforms() -> &'static [&'static str] {
        &SUPPORTED_PLATFORMS
    }
}
