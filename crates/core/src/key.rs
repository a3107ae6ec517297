//! Fetch keys: the identifiers that bind a fetcher to a slot of context data.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

use crate::error::RegistryError;

/// Longest key accepted by [`FetchKey::parse`], in bytes.
pub const MAX_KEY_LEN: usize = 64;

/// Names one pluggable data source and one slot of aggregated data.
///
/// Always non-empty: starts with an ASCII letter or `_`, followed by ASCII
/// alphanumerics, `_`, `-` or `.`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FetchKey(String);

impl FetchKey {
    /// Validate and wrap a key.
    pub fn parse(key: impl Into<String>) -> Result<Self, RegistryError> {
        let key = key.into();
        if let Some(reason) = invalid_reason(&key) {
            return Err(RegistryError::InvalidKey {
                key,
                reason: reason.into(),
            });
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn invalid_reason(key: &str) -> Option<&'static str> {
    let mut chars = key.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return Some("key must not be empty"),
    };
    if key.len() > MAX_KEY_LEN {
        return Some("key is longer than 64 bytes");
    }
    if !(first.is_ascii_alphabetic() || first == '_') {
        return Some("key must start with a letter or '_'");
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')) {
        return Some("key may only contain letters, digits, '_', '-' and '.'");
    }
    None
}

impl std::fmt::Display for FetchKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.0)
    }
}

impl Borrow<str> for FetchKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for FetchKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for FetchKey {
    type Error = RegistryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<&str> for FetchKey {
    type Error = RegistryError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<FetchKey> for String {
    fn from(key: FetchKey) -> Self {
        key.0
    }
}
