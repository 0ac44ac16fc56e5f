//! Keys identifying remote objects
//!
//! A remote object is addressed either by a single ID/ARN or by an ordered
//! composite of parts (for example a schedule group name plus a schedule
//! name). Composite identities render as their parts joined by `/`.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Separator between the parts of a composite identity
pub const IDENTITY_SEPARATOR: char = '/';

/// Errors from parsing or building an identity
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// No parts at all
    #[error("resource identity cannot be empty")]
    Empty,

    /// One of the parts is empty
    #[error("resource identity part {index} is empty in '{raw}'")]
    EmptyPart { index: usize, raw: String },

    /// Wrong number of parts for the expected shape
    #[error("expected {expected} identity parts separated by '/', got {actual} in '{raw}'")]
    PartCount {
        expected: usize,
        actual: usize,
        raw: String,
    },
}

/// Opaque key identifying a remote object.
///
/// Equality is an exact match on the ordered parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceIdentity {
    parts: Vec<String>,
}

impl ResourceIdentity {
    /// Identity made of one ID or ARN
    pub fn single(id: impl Into<String>) -> Self {
        Self {
            parts: vec![id.into()],
        }
    }

    /// Identity made of several ordered parts
    pub fn composite<I, S>(parts: I) -> Result<Self, IdentityError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let parts: Vec<String> = parts.into_iter().map(Into::into).collect();
        if parts.is_empty() {
            return Err(IdentityError::Empty);
        }
        if let Some(index) = parts.iter().position(|p| p.is_empty()) {
            return Err(IdentityError::EmptyPart {
                index,
                raw: parts.join("/"),
            });
        }
        Ok(Self { parts })
    }

    /// Parse the `/`-joined form, requiring exactly `expected` parts.
    pub fn parse(raw: &str, expected: usize) -> Result<Self, IdentityError> {
        if raw.is_empty() {
            return Err(IdentityError::Empty);
        }
        // A single-part identity may itself contain '/' (ARNs do)
        if expected == 1 {
            return Ok(Self::single(raw));
        }
        let parts: Vec<&str> = raw.split(IDENTITY_SEPARATOR).collect();
        if parts.len() != expected {
            return Err(IdentityError::PartCount {
                expected,
                actual: parts.len(),
                raw: raw.to_string(),
            });
        }
        if let Some(index) = parts.iter().position(|p| p.is_empty()) {
            return Err(IdentityError::EmptyPart {
                index,
                raw: raw.to_string(),
            });
        }
        Ok(Self {
            parts: parts.into_iter().map(str::to_string).collect(),
        })
    }

    /// The ordered parts of this identity
    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// Part at `index`, if present
    pub fn part(&self, index: usize) -> Option<&str> {
        self.parts.get(index).map(String::as_str)
    }

    /// Whether this identity has more than one part
    pub fn is_composite(&self) -> bool {
        self.parts.len() > 1
    }
}

impl fmt::Display for ResourceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", IDENTITY_SEPARATOR)?;
            }
            f.write_str(part)?;
        }
        Ok(())
    }
}

impl From<&str> for ResourceIdentity {
    fn from(id: &str) -> Self {
        Self::single(id)
    }
}

impl From<String> for ResourceIdentity {
    fn from(id: String) -> Self {
        Self::single(id)
    }
}
