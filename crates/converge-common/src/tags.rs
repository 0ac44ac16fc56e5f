//! Key/value resource tags
//!
//! Tags are compared as ordered maps from key to optional value. Keys under
//! the `aws:` prefix are reserved by AWS and are never managed here.

use std::collections::{BTreeMap, HashMap};

/// Prefix of tag keys reserved by AWS
pub const AWS_TAG_PREFIX: &str = "aws:";

/// A set of resource tags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyValueTags {
    tags: BTreeMap<String, Option<String>>,
}

impl KeyValueTags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tags whose values may be absent (as returned by list APIs)
    pub fn from_optional<I, K>(tags: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<String>)>,
        K: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Option<String>) {
        self.tags.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Option<String>> {
        self.tags.get(key)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Tags present here but missing from `new`
    pub fn removed(&self, new: &KeyValueTags) -> KeyValueTags {
        Self {
            tags: self
                .tags
                .iter()
                .filter(|(k, _)| !new.tags.contains_key(*k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    /// Tags in `new` that are missing here or have a different value
    pub fn updated(&self, new: &KeyValueTags) -> KeyValueTags {
        Self {
            tags: new
                .tags
                .iter()
                .filter(|(k, v)| self.tags.get(*k) != Some(*v))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    /// Drop keys reserved by AWS
    pub fn ignore_aws(&self) -> KeyValueTags {
        Self {
            tags: self
                .tags
                .iter()
                .filter(|(k, _)| !k.starts_with(AWS_TAG_PREFIX))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    /// Keys in sorted order
    pub fn keys(&self) -> Vec<String> {
        self.tags.keys().cloned().collect()
    }

    /// Plain map for API requests; absent values become empty strings.
    pub fn map(&self) -> HashMap<String, String> {
        self.tags
            .iter()
            .map(|(k, v)| (k.clone(), v.clone().unwrap_or_default()))
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for KeyValueTags {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            tags: iter
                .into_iter()
                .map(|(k, v)| (k.into(), Some(v.into())))
                .collect(),
        }
    }
}
