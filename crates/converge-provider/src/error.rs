//! Provider-level error types
//!
//! Typed errors for catalog configuration, registry assembly, tag
//! synchronisation and reconciliation.

use converge_common::ResourceIdentity;
use converge_waiter::{FetchError, SpecError, WaitError, WaitIntent};
use thiserror::Error;

/// Wait catalog configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse JSON configuration
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// Failed to read configuration file
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A wait entry does not describe a valid spec
    #[error("invalid {intent} wait for {resource_type}: {source}")]
    InvalidWait {
        resource_type: String,
        intent: WaitIntent,
        #[source]
        source: SpecError,
    },

    /// An entry's `intent` field disagrees with the key it is stored under
    #[error("{resource_type}: wait stored under '{key}' declares intent '{declared}'")]
    IntentMismatch {
        resource_type: String,
        key: WaitIntent,
        declared: WaitIntent,
    },
}

impl ConfigError {
    /// Create an IO error with path context
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Service registry assembly and lookup errors
#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("service package '{0}' registered twice")]
    DuplicateService(String),

    #[error("type '{type_name}' registered by both '{first}' and '{second}'")]
    DuplicateType {
        type_name: String,
        first: String,
        second: String,
    },

    #[error("unknown resource type '{0}'")]
    UnknownType(String),

    #[error("no {intent} wait configured for '{resource_type}'")]
    NoWaitSpec {
        resource_type: String,
        intent: WaitIntent,
    },
}

/// Tag synchronisation errors
#[derive(Debug, Error)]
pub enum TagError {
    #[error("listing tags for resource ({identifier}): {source}")]
    List {
        identifier: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("untagging resource ({identifier}): {source}")]
    Untag {
        identifier: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("tagging resource ({identifier}): {source}")]
    Tag {
        identifier: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Mutate-then-wait failures
#[derive(Debug, Error)]
pub enum ReconcileError<P> {
    /// The create/update/delete call itself failed
    #[error("{intent} of {identity} failed: {source}")]
    Mutation {
        identity: ResourceIdentity,
        intent: WaitIntent,
        #[source]
        source: FetchError,
    },

    /// The mutation was accepted but the wait did not succeed
    #[error("waiting for {intent} of {identity}: {source}")]
    Wait {
        identity: ResourceIdentity,
        intent: WaitIntent,
        #[source]
        source: WaitError<P>,
    },

    /// The spec handed in was built for another intent
    #[error("{expected} of {identity} was given a {actual} wait spec")]
    IntentMismatch {
        identity: ResourceIdentity,
        expected: WaitIntent,
        actual: WaitIntent,
    },

    /// The catalog has no usable spec
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl<P> ReconcileError<P> {
    /// Check if the wait failed on a status in the spec's failure set
    pub fn is_fatal_status(&self) -> bool {
        matches!(
            self,
            ReconcileError::Wait {
                source: WaitError::FatalStatus { .. },
                ..
            }
        )
    }
}
