//! The fetch contract and "find by key" helpers
//!
//! A fetch is the caller's describe/get call for one remote object. It must be
//! read-only and safe to call concurrently from independent waits. Right after
//! a create it may legitimately report the object as missing.

use crate::error::{classify_sdk_error, is_throttling_code};
use crate::snapshot::StatusSnapshot;
use async_trait::async_trait;
use aws_smithy_types::error::metadata::ProvideErrorMetadata;
use converge_common::ResourceIdentity;
use std::fmt;
use std::future::Future;
use thiserror::Error;

/// Errors a fetch can report
#[derive(Debug, Error)]
pub enum FetchError {
    /// The object does not exist (or is not visible yet)
    #[error("resource not found: {message}")]
    NotFound { message: String },

    /// The describe call succeeded but returned nothing usable
    #[error("empty result for request: {request}")]
    EmptyResult { request: String },

    /// Any other failure talking to the API
    #[error("transport error: {source}")]
    Transport {
        code: Option<String>,
        #[source]
        source: anyhow::Error,
    },
}

impl FetchError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Empty result, recording the request that produced it
    pub fn empty_result(request: &impl fmt::Debug) -> Self {
        Self::EmptyResult {
            request: format!("{request:?}"),
        }
    }

    /// Transport failure without an AWS error code
    pub fn transport(source: impl Into<anyhow::Error>) -> Self {
        Self::Transport {
            code: None,
            source: source.into(),
        }
    }

    /// Transport failure carrying the AWS error code
    pub fn transport_with_code(code: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Transport {
            code: Some(code.into()),
            source: source.into(),
        }
    }

    /// Check if the object was absent (not found or empty result)
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::EmptyResult { .. })
    }

    /// Check if retrying the whole operation may help (throttling)
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { code: Some(c), .. } if is_throttling_code(c))
    }

    /// AWS error code, if the failure carried one
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Transport { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

/// Reads the current status of a remote object.
///
/// Implemented for any `Fn(ResourceIdentity) -> impl Future` closure, so
/// callers can pass their describe call directly:
///
/// ```ignore
/// let fetch = |id: ResourceIdentity| async move {
///     let out = client.get_schedule_group().name(id.to_string()).send().await;
///     let group = require_found(&id, out.map(|o| Some(o)))?;
///     StatusSnapshot::from_parts(group.state().map(|s| s.as_str()), group, &id)
/// };
/// ```
#[async_trait]
pub trait StatusFetcher<P>: Send + Sync {
    async fn fetch(&self, identity: &ResourceIdentity) -> Result<StatusSnapshot<P>, FetchError>;
}

#[async_trait]
impl<P, F, Fut> StatusFetcher<P> for F
where
    P: Send + 'static,
    F: Fn(ResourceIdentity) -> Fut + Send + Sync,
    Fut: Future<Output = Result<StatusSnapshot<P>, FetchError>> + Send + 'static,
{
    async fn fetch(&self, identity: &ResourceIdentity) -> Result<StatusSnapshot<P>, FetchError> {
        (self)(identity.clone()).await
    }
}

/// Turn a describe call's output into a required value.
///
/// `Ok(None)` becomes [`FetchError::EmptyResult`] recording `request`; an SDK
/// error is classified by its AWS error code.
pub fn require_found<T, E, R>(request: &R, output: Result<Option<T>, E>) -> Result<T, FetchError>
where
    R: fmt::Debug,
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    match output {
        Ok(Some(value)) => Ok(value),
        Ok(None) => Err(FetchError::empty_result(request)),
        Err(e) => Err(classify_sdk_error(e)),
    }
}

/// Like [`require_found`], with a service-specific not-found predicate.
pub fn require_found_with<T, E, R>(
    request: &R,
    output: Result<Option<T>, E>,
    is_not_found: impl FnOnce(&E) -> bool,
) -> Result<T, FetchError>
where
    R: fmt::Debug,
    E: Into<anyhow::Error>,
{
    match output {
        Ok(Some(value)) => Ok(value),
        Ok(None) => Err(FetchError::empty_result(request)),
        Err(e) => {
            if is_not_found(&e) {
                let err: anyhow::Error = e.into();
                Err(FetchError::not_found(format!("{err:#} (request: {request:?})")))
            } else {
                Err(FetchError::transport(e))
            }
        }
    }
}
