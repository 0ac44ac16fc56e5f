//! Mutate-then-wait wrappers
//!
//! Each wrapper runs the caller's mutation and then waits for the resource
//! with the spec for the matching intent. A delete whose mutation reports
//! the resource missing skips the wait.

use crate::catalog::{CatalogConfig, WaitCatalog};
use crate::error::{ConfigError, ReconcileError, RegistryError};
use crate::registry::ServiceRegistry;
use converge_common::ResourceIdentity;
use converge_waiter::{
    FetchError, StatusFetcher, WaitIntent, WaitSpec, WaitSuccess, wait_for_state,
};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

fn check_intent<P>(
    identity: &ResourceIdentity,
    spec: &WaitSpec,
    expected: WaitIntent,
) -> Result<(), ReconcileError<P>> {
    if spec.intent() != expected {
        return Err(ReconcileError::IntentMismatch {
            identity: identity.clone(),
            expected,
            actual: spec.intent(),
        });
    }
    Ok(())
}

async fn mutate_and_wait<T, P, M, F>(
    intent: WaitIntent,
    identity: &ResourceIdentity,
    spec: &WaitSpec,
    fetcher: &F,
    cancel: Option<&CancellationToken>,
    mutation: M,
) -> Result<(T, WaitSuccess<P>), ReconcileError<P>>
where
    M: Future<Output = Result<T, FetchError>>,
    F: StatusFetcher<P> + ?Sized,
{
    check_intent(identity, spec, intent)?;

    let value = mutation.await.map_err(|source| ReconcileError::Mutation {
        identity: identity.clone(),
        intent,
        source,
    })?;
    debug!(%identity, %intent, "Mutation accepted, waiting");

    let success = wait_for_state(cancel, identity, fetcher, spec)
        .await
        .map_err(|source| ReconcileError::Wait {
            identity: identity.clone(),
            intent,
            source,
        })?;
    Ok((value, success))
}

/// Run a create and wait for the resource to reach a target status
pub async fn create_and_wait<T, P, M, F>(
    identity: &ResourceIdentity,
    spec: &WaitSpec,
    fetcher: &F,
    cancel: Option<&CancellationToken>,
    mutation: M,
) -> Result<(T, WaitSuccess<P>), ReconcileError<P>>
where
    M: Future<Output = Result<T, FetchError>>,
    F: StatusFetcher<P> + ?Sized,
{
    mutate_and_wait(WaitIntent::Create, identity, spec, fetcher, cancel, mutation).await
}

/// Run an update and wait for the resource to settle
pub async fn update_and_wait<T, P, M, F>(
    identity: &ResourceIdentity,
    spec: &WaitSpec,
    fetcher: &F,
    cancel: Option<&CancellationToken>,
    mutation: M,
) -> Result<(T, WaitSuccess<P>), ReconcileError<P>>
where
    M: Future<Output = Result<T, FetchError>>,
    F: StatusFetcher<P> + ?Sized,
{
    mutate_and_wait(WaitIntent::Update, identity, spec, fetcher, cancel, mutation).await
}

/// Run a delete and wait for the resource to disappear.
///
/// A NotFound from the mutation means the resource is already gone: the
/// result is an absent success with zero polls.
pub async fn delete_and_wait<T, P, M, F>(
    identity: &ResourceIdentity,
    spec: &WaitSpec,
    fetcher: &F,
    cancel: Option<&CancellationToken>,
    mutation: M,
) -> Result<WaitSuccess<P>, ReconcileError<P>>
where
    M: Future<Output = Result<T, FetchError>>,
    F: StatusFetcher<P> + ?Sized,
{
    check_intent(identity, spec, WaitIntent::Delete)?;

    match mutation.await {
        Ok(_) => {}
        Err(e) if e.is_not_found() => {
            info!(%identity, error = %e, "Resource already deleted");
            return Ok(WaitSuccess {
                snapshot: None,
                attempts: 0,
                elapsed: Duration::ZERO,
            });
        }
        Err(source) => {
            return Err(ReconcileError::Mutation {
                identity: identity.clone(),
                intent: WaitIntent::Delete,
                source,
            });
        }
    }
    debug!(%identity, "Delete accepted, waiting");

    wait_for_state(cancel, identity, fetcher, spec)
        .await
        .map_err(|source| ReconcileError::Wait {
            identity: identity.clone(),
            intent: WaitIntent::Delete,
            source,
        })
}

/// Mutate-then-wait by resource type, with specs from a [`WaitCatalog`]
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    catalog: WaitCatalog,
    cancel: Option<CancellationToken>,
}

impl Reconciler {
    pub fn new(catalog: WaitCatalog) -> Self {
        Self {
            catalog,
            cancel: None,
        }
    }

    /// Presets from `registry`, overridden by `config` entries
    pub fn from_registry(
        registry: &ServiceRegistry,
        config: Option<&CatalogConfig>,
    ) -> Result<Self, ConfigError> {
        let mut catalog = registry.wait_catalog()?;
        if let Some(config) = config {
            catalog.apply(config)?;
        }
        Ok(Self::new(catalog))
    }

    /// Cancel every wait started through this reconciler when `token` fires
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn catalog(&self) -> &WaitCatalog {
        &self.catalog
    }

    pub fn spec(
        &self,
        resource_type: &str,
        intent: WaitIntent,
    ) -> Result<&WaitSpec, RegistryError> {
        self.catalog
            .get(resource_type, intent)
            .ok_or_else(|| RegistryError::NoWaitSpec {
                resource_type: resource_type.to_string(),
                intent,
            })
    }

    pub async fn create<T, P, M, F>(
        &self,
        resource_type: &str,
        identity: &ResourceIdentity,
        fetcher: &F,
        mutation: M,
    ) -> Result<(T, WaitSuccess<P>), ReconcileError<P>>
    where
        M: Future<Output = Result<T, FetchError>>,
        F: StatusFetcher<P> + ?Sized,
    {
        let spec = self.spec(resource_type, WaitIntent::Create)?;
        create_and_wait(identity, spec, fetcher, self.cancel.as_ref(), mutation).await
    }

    pub async fn update<T, P, M, F>(
        &self,
        resource_type: &str,
        identity: &ResourceIdentity,
        fetcher: &F,
        mutation: M,
    ) -> Result<(T, WaitSuccess<P>), ReconcileError<P>>
    where
        M: Future<Output = Result<T, FetchError>>,
        F: StatusFetcher<P> + ?Sized,
    {
        let spec = self.spec(resource_type, WaitIntent::Update)?;
        update_and_wait(identity, spec, fetcher, self.cancel.as_ref(), mutation).await
    }

    pub async fn delete<T, P, M, F>(
        &self,
        resource_type: &str,
        identity: &ResourceIdentity,
        fetcher: &F,
        mutation: M,
    ) -> Result<WaitSuccess<P>, ReconcileError<P>>
    where
        M: Future<Output = Result<T, FetchError>>,
        F: StatusFetcher<P> + ?Sized,
    {
        let spec = self.spec(resource_type, WaitIntent::Delete)?;
        delete_and_wait(identity, spec, fetcher, self.cancel.as_ref(), mutation).await
    }
}
