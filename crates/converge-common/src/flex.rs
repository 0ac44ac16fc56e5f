//! Null/unknown/known values and their native conversions
//!
//! Schema frameworks distinguish an attribute that is null, one whose value is
//! not known yet (computed during apply), and one with a concrete value. API
//! request and response types only know "present" or "absent". These helpers
//! convert between the two without pointer-as-optional tricks.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;

/// A framework attribute value
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Nullable<T> {
    /// Explicitly null
    #[default]
    Null,
    /// Not yet known (computed later)
    Unknown,
    /// A concrete value
    Value(T),
}

impl<T> Nullable<T> {
    pub fn is_null(&self) -> bool {
        matches!(self, Nullable::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Nullable::Unknown)
    }

    /// Borrow the value, treating null and unknown alike
    pub fn as_option(&self) -> Option<&T> {
        match self {
            Nullable::Value(v) => Some(v),
            Nullable::Null | Nullable::Unknown => None,
        }
    }

    /// Convert to an API-side optional. Null and unknown both become `None`.
    pub fn into_option(self) -> Option<T> {
        match self {
            Nullable::Value(v) => Some(v),
            Nullable::Null | Nullable::Unknown => None,
        }
    }

    /// Convert from an API-side optional. `None` becomes null.
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(v) => Nullable::Value(v),
            None => Nullable::Null,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Nullable<U> {
        match self {
            Nullable::Value(v) => Nullable::Value(f(v)),
            Nullable::Null => Nullable::Null,
            Nullable::Unknown => Nullable::Unknown,
        }
    }
}

impl<T: Default> Nullable<T> {
    /// Legacy conversion: `None` becomes the zero value instead of null.
    pub fn from_option_legacy(value: Option<T>) -> Self {
        Nullable::Value(value.unwrap_or_default())
    }
}

impl<T> From<Option<T>> for Nullable<T> {
    fn from(value: Option<T>) -> Self {
        Self::from_option(value)
    }
}

/// Convert an optional string, transforming a present value with `f`.
pub fn string_with_transform(
    value: Option<&str>,
    f: impl FnOnce(&str) -> String,
) -> Nullable<String> {
    match value {
        Some(v) => Nullable::Value(f(v)),
        None => Nullable::Null,
    }
}

/// Expand a single string attribute into a one-element list, `None` if unset.
pub fn expand_string_slice(value: &Nullable<String>) -> Option<Vec<String>> {
    value.as_option().map(|v| vec![v.clone()])
}

/// Expand a set or list attribute; null or unknown becomes `None`.
pub fn expand_list<T: Clone>(value: &Nullable<Vec<T>>) -> Option<Vec<T>> {
    value.as_option().cloned()
}

/// Expand a map attribute; null or unknown becomes `None`.
pub fn expand_map<K, V>(value: &Nullable<HashMap<K, V>>) -> Option<HashMap<K, V>>
where
    K: Clone + Eq + Hash,
    V: Clone,
{
    value.as_option().cloned()
}

/// Flatten an optional API list. A missing list becomes an empty (non-null) list.
pub fn flatten_list<T>(values: Option<Vec<T>>) -> Nullable<Vec<T>> {
    Nullable::Value(values.unwrap_or_default())
}

/// Flatten a list whose elements may be absent; absent elements become empty strings.
pub fn flatten_string_list(values: Option<Vec<Option<String>>>) -> Nullable<Vec<String>> {
    Nullable::Value(
        values
            .unwrap_or_default()
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect(),
    )
}

/// Flatten an optional API map. A missing map becomes an empty (non-null) map.
pub fn flatten_map<K: Eq + Hash, V>(values: Option<HashMap<K, V>>) -> Nullable<HashMap<K, V>> {
    Nullable::Value(values.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_and_unknown_expand_to_none() {
        assert_eq!(Nullable::<bool>::Null.into_option(), None);
        assert_eq!(Nullable::<bool>::Unknown.into_option(), None);
        assert_eq!(Nullable::Value(7i64).into_option(), Some(7));
        assert_eq!(expand_list::<String>(&Nullable::Unknown), None);
        assert_eq!(expand_map::<String, String>(&Nullable::Null), None);
    }

    #[test]
    fn test_missing_becomes_null_or_zero() {
        assert_eq!(Nullable::<String>::from_option(None), Nullable::Null);
        assert_eq!(
            Nullable::<String>::from_option_legacy(None),
            Nullable::Value(String::new())
        );
        assert_eq!(Nullable::<i64>::from_option_legacy(None), Nullable::Value(0));
        assert_eq!(Nullable::<bool>::from_option_legacy(Some(true)), Nullable::Value(true));
    }

    #[test]
    fn test_flatten_missing_collections_are_empty_not_null() {
        assert_eq!(flatten_list::<String>(None), Nullable::Value(vec![]));
        assert_eq!(
            flatten_map::<String, String>(None),
            Nullable::Value(HashMap::new())
        );
        assert_eq!(
            flatten_string_list(Some(vec![Some("a".into()), None])),
            Nullable::Value(vec!["a".to_string(), String::new()])
        );
    }

    #[test]
    fn test_string_slice_and_transform() {
        assert_eq!(
            expand_string_slice(&Nullable::Value("x".into())),
            Some(vec!["x".to_string()])
        );
        assert_eq!(expand_string_slice(&Nullable::Unknown), None);
        assert_eq!(
            string_with_transform(Some("ARN"), str::to_lowercase),
            Nullable::Value("arn".to_string())
        );
        assert_eq!(string_with_transform(None, str::to_lowercase), Nullable::Null);
    }

    #[test]
    fn test_serde_shape() {
        let v: Nullable<u32> = serde_json::from_str(r#"{"value":3}"#).unwrap();
        assert_eq!(v, Nullable::Value(3));
        let n: Nullable<u32> = serde_json::from_str(r#""unknown""#).unwrap();
        assert!(n.is_unknown());
    }
}
