//! Tag synchronisation through an injected tagging client

use crate::error::TagError;
use async_trait::async_trait;
use converge_common::KeyValueTags;
use std::collections::HashMap;
use tracing::debug;

/// A service's tagging API
#[async_trait]
pub trait TagClient: Send + Sync {
    async fn list_tags(&self, identifier: &str) -> anyhow::Result<KeyValueTags>;

    async fn tag_resource(
        &self,
        identifier: &str,
        tags: HashMap<String, String>,
    ) -> anyhow::Result<()>;

    async fn untag_resource(&self, identifier: &str, keys: Vec<String>) -> anyhow::Result<()>;
}

/// List all of a resource's tags, `aws:` system tags included
pub async fn list_tags<C>(client: &C, identifier: &str) -> Result<KeyValueTags, TagError>
where
    C: TagClient + ?Sized,
{
    client
        .list_tags(identifier)
        .await
        .map_err(|source| TagError::List {
            identifier: identifier.to_string(),
            source,
        })
}

/// Move a resource's tags from `old` to `new`.
///
/// Removed keys are untagged first, then added or changed keys are tagged.
/// `aws:` system tags are never sent, and a call with nothing to send is
/// skipped.
pub async fn update_tags<C>(
    client: &C,
    identifier: &str,
    old: &KeyValueTags,
    new: &KeyValueTags,
) -> Result<(), TagError>
where
    C: TagClient + ?Sized,
{
    let removed = old.removed(new).ignore_aws();
    if !removed.is_empty() {
        debug!(identifier, keys = ?removed.keys(), "Untagging resource");
        client
            .untag_resource(identifier, removed.keys())
            .await
            .map_err(|source| TagError::Untag {
                identifier: identifier.to_string(),
                source,
            })?;
    }

    let updated = old.updated(new).ignore_aws();
    if !updated.is_empty() {
        debug!(identifier, keys = ?updated.keys(), "Tagging resource");
        client
            .tag_resource(identifier, updated.map())
            .await
            .map_err(|source| TagError::Tag {
                identifier: identifier.to_string(),
                source,
            })?;
    }

    Ok(())
}
