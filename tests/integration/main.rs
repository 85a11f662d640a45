//! Integration tests driving fake bundler tools in temporary projects.

#![cfg(unix)]

mod build_tests;
mod common;
mod package_tests;
mod spec_tests;
