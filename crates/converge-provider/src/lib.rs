//! converge-provider - Provider plumbing around the state waiter
//!
//! Wires [`converge_waiter`] into a provider: wait presets per resource type,
//! JSON overrides for them, the registry of built-in service packages, tag
//! synchronisation and mutate-then-wait helpers.
//!
//! ## Modules
//!
//! - [`catalog`]: Wait catalog and its JSON configuration
//! - [`error`]: Provider-level error types
//! - [`packages`]: Built-in service packages
//! - [`reconcile`]: Create/update/delete followed by a wait
//! - [`registry`]: Service packages and the registry assembled from them
//! - [`tagging`]: Tag synchronisation through an injected client

pub mod catalog;
pub mod error;
pub mod packages;
pub mod reconcile;
pub mod registry;
pub mod tagging;

pub use catalog::{CatalogConfig, IntentWaits, WaitCatalog, WaitSpecConfig};
pub use error::{ConfigError, ReconcileError, RegistryError, TagError};
pub use reconcile::{Reconciler, create_and_wait, delete_and_wait, update_and_wait};
pub use registry::{
    PackageConstructor, RegistrationKind, ResourceRegistration, ServicePackage, ServiceRegistry,
};
pub use tagging::{TagClient, update_tags};
