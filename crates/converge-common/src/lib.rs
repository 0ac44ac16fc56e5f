//! converge-common - Shared types and utilities
//!
//! This crate provides the types shared by the waiter core and the provider
//! glue, without any AWS SDK dependencies to keep it lightweight.
//!
//! ## Modules
//!
//! - [`defaults`]: Default wait configuration values
//! - [`flex`]: Null/unknown/known values and their native conversions
//! - [`identity`]: Keys identifying remote objects
//! - [`tags`]: Key/value resource tags and tag diffing

pub mod defaults;
pub mod flex;
pub mod identity;
pub mod tags;

// Re-export commonly used types
pub use flex::Nullable;
pub use identity::{IdentityError, ResourceIdentity};
pub use tags::KeyValueTags;
