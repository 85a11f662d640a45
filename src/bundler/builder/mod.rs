//! Build orchestration and coordination.
//!
//! This module provides the [`Builder`] that drives the external single-file
//! bundler for one platform, and the [`CrossPlatformBuilder`] that runs one
//! builder per platform.
//!
//! # Overview
//!
//! A build pass:
//! 1. Resets the build, distribution and scratch directories
//! 2. Validates the project and checks the bundler
//! 3. Installs the project's dependencies
//! 4. Bundles every script, verifying each produced executable
//! 5. Returns one [`BuildResult`] per script
//!
//! # Example
//!
//! ```no_run
//! use kodegen_bundler_onefile::bundler::{BuildConfigBuilder, CrossPlatformBuilder};
//! use kodegen_bundler_onefile::logger::Logger;
//! use std::sync::Arc;
//!
//! # async fn example() -> kodegen_bundler_onefile::Result<()> {
//! let config = Arc::new(
//!     BuildConfigBuilder::new()
//!         .name("hello-scikit-learn")
//!         .version("0.1.0")
//!         .scripts(["train_model.py", "predict.py"])
//!         .build()?,
//! );
//!
//! let cross = CrossPlatformBuilder::new(config, Logger::facade());
//! let outcomes = cross.build_for_all().await;
//! let summary = cross.cross_summary(&outcomes);
//!
//! for (platform, report) in &summary.platform_results {
//!     println!("{platform}: {:?} ({}/{})", report.status, report.counts.successful, report.counts.total);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`cross`] - Sequential multi-platform builds with tri-state outcomes
//! - [`orchestrator`] - Main [`Builder`] struct and build operations
//! - [`result`] - Per-script results and build summaries
//! - [`tool_detection`] - External tool availability checking

pub mod cross;
mod orchestrator;
pub mod result;
mod tool_detection;

pub use cross::{CrossPlatformBuilder, CrossSummary, PlatformOutcome, PlatformReport, PlatformStatus};
pub use orchestrator::Builder;
pub use result::{BuildCounts, BuildResult, BuildStatus, BuildSummary, FailedBuild};
