//! Shared test utilities for converge
//!
//! This crate provides common test helpers that can be used across
//! multiple test modules without circular dependencies.
//!
//! ## Modules
//!
//! - [`fetcher`]: Scripted status fetchers that count their calls
//! - [`identity`]: Unique resource identifiers for concurrent tests

pub mod fetcher;
pub mod identity;

// Re-export commonly used items
pub use fetcher::{ScriptedFetcher, Step};
pub use identity::{test_composite_identity, test_identity, test_run_id};
