//! Integration test suite for the render updater
//!
//! End-to-end tests against a fake release host (wiremock) and real
//! temporary directories.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **release**: Tag selection, manifest fetching and memoization
//! - **gate**: Version gate decisions and shell update requests
//! - **pipeline**: Download, verification, installation and sweeping
//! - **cli**: The `render-updater` binary

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod cli;
mod gate;
mod pipeline;
