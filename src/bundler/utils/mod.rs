//! Shared helpers for the bundler layer.

pub mod fs;
