//! Fetcher trait: the abstraction over pluggable context data sources.
//!
//! A fetcher turns a parameter mapping into a data mapping: the current
//! user's profile, recent records, remote API results, file contents, code
//! search hits. Concrete fetchers live outside this crate; they are bound to
//! a [`FetchKey`](crate::key::FetchKey) in the
//! [`FetcherRegistry`](crate::registry::FetcherRegistry).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::FetchError;
use crate::key::FetchKey;

/// Parameter and result mapping exchanged with fetchers.
pub type Params = serde_json::Map<String, serde_json::Value>;

/// The core Fetcher trait.
///
/// Only `fetch` is required. Everything else is introspection used by
/// operator tooling and has a sensible default.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Produce data for the given params (base data merged with call params).
    async fn fetch(&self, params: &Params) -> Result<Params, FetchError>;

    /// Short implementation name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Human-readable description of the data source.
    fn description(&self) -> &str {
        ""
    }

    /// Parameter names this fetcher understands. Advisory only.
    fn allowed_params(&self) -> &[String] {
        &[]
    }
}

/// Optional secondary capability: substitute data when `fetch` fails.
///
/// Fallback data is expected to be infallible; it is only consulted after
/// the primary call has already failed.
#[async_trait]
pub trait FallbackFetcher: Fetcher {
    async fn fallback_data(&self, params: &Params) -> Params;
}

#[async_trait]
impl<T: Fetcher + ?Sized> Fetcher for Arc<T> {
    async fn fetch(&self, params: &Params) -> Result<Params, FetchError> {
        (**self).fetch(params).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn description(&self) -> &str {
        (**self).description()
    }

    fn allowed_params(&self) -> &[String] {
        (**self).allowed_params()
    }
}

#[async_trait]
impl<T: FallbackFetcher + ?Sized> FallbackFetcher for Arc<T> {
    async fn fallback_data(&self, params: &Params) -> Params {
        (**self).fallback_data(params).await
    }
}

/// A registered fetcher with its capabilities fixed at construction.
///
/// Whether a fetcher can supply fallback data is decided once, when the
/// handle is built, instead of being probed after every failure.
#[derive(Clone)]
pub enum FetcherHandle {
    Basic(Arc<dyn Fetcher>),
    WithFallback(Arc<dyn FallbackFetcher>),
}

impl FetcherHandle {
    pub fn basic<F: Fetcher + 'static>(fetcher: F) -> Self {
        Self::Basic(Arc::new(fetcher))
    }

    pub fn with_fallback<F: FallbackFetcher + 'static>(fetcher: F) -> Self {
        Self::WithFallback(Arc::new(fetcher))
    }

    pub fn supports_fallback(&self) -> bool {
        matches!(self, Self::WithFallback(_))
    }

    /// Run the primary fetch.
    pub async fn fetch(&self, params: &Params) -> Result<Params, FetchError> {
        match self {
            Self::Basic(f) => f.fetch(params).await,
            Self::WithFallback(f) => f.fetch(params).await,
        }
    }

    /// Run the fallback, or `None` for fetchers without the capability.
    pub async fn fallback_data(&self, params: &Params) -> Option<Params> {
        match self {
            Self::Basic(_) => None,
            Self::WithFallback(f) => Some(f.fallback_data(params).await),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Basic(f) => f.name(),
            Self::WithFallback(f) => f.name(),
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Self::Basic(f) => f.description(),
            Self::WithFallback(f) => f.description(),
        }
    }

    pub fn allowed_params(&self) -> &[String] {
        match self {
            Self::Basic(f) => f.allowed_params(),
            Self::WithFallback(f) => f.allowed_params(),
        }
    }

    /// Whether both handles point at the same fetcher instance.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Basic(a), Self::Basic(b)) => Arc::ptr_eq(a, b),
            (Self::WithFallback(a), Self::WithFallback(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Snapshot of this handle's introspection data under `key`.
    pub fn descriptor(&self, key: &FetchKey) -> FetcherDescriptor {
        FetcherDescriptor {
            key: key.clone(),
            name: self.name().to_string(),
            description: self.description().to_string(),
            supports_fallback: self.supports_fallback(),
            allowed_params: self.allowed_params().to_vec(),
        }
    }
}

impl std::fmt::Debug for FetcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetcherHandle")
            .field("name", &self.name())
            .field("supports_fallback", &self.supports_fallback())
            .finish()
    }
}

/// Introspection record for one registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetcherDescriptor {
    pub key: FetchKey,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub supports_fallback: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_params: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    struct UserFetcher;

    #[async_trait]
    impl Fetcher for UserFetcher {
        async fn fetch(&self, params: &Params) -> Result<Params, FetchError> {
            let mut out = Params::new();
            out.insert("user".into(), params.get("user_id").cloned().unwrap_or_default());
            Ok(out)
        }

        fn name(&self) -> &str {
            "user"
        }
    }

    struct FlakyFetcher {
        allowed: Vec<String>,
    }

    #[async_trait]
    impl Fetcher for FlakyFetcher {
        async fn fetch(&self, _params: &Params) -> Result<Params, FetchError> {
            Err(FetchError::Unavailable("upstream down".into()))
        }

        fn description(&self) -> &str {
            "Always unavailable"
        }

        fn allowed_params(&self) -> &[String] {
            &self.allowed
        }
    }

    #[async_trait]
    impl FallbackFetcher for FlakyFetcher {
        async fn fallback_data(&self, _params: &Params) -> Params {
            let mut out = Params::new();
            out.insert("cached".into(), true.into());
            out
        }
    }

    #[tokio::test]
    async fn basic_handle_has_no_fallback() {
        let handle = FetcherHandle::basic(UserFetcher);
        assert!(!handle.supports_fallback());

        let mut params = Params::new();
        params.insert("user_id".into(), 7.into());
        let data = handle.fetch(&params).await.unwrap();
        assert_eq!(data["user"], 7);
        assert!(handle.fallback_data(&params).await.is_none());
    }

    #[tokio::test]
    async fn fallback_handle_dispatches_both_capabilities() {
        let handle = FetcherHandle::with_fallback(FlakyFetcher { allowed: vec![] });
        assert!(handle.supports_fallback());

        let params = Params::new();
        assert!(handle.fetch(&params).await.is_err());
        let fallback = handle.fallback_data(&params).await.unwrap();
        assert_eq!(fallback["cached"], true);
    }

    #[test]
    fn default_name_is_type_name() {
        let handle = FetcherHandle::basic(FlakyFetcher { allowed: vec![] });
        assert!(handle.name().ends_with("FlakyFetcher"));
    }

    #[test]
    fn ptr_eq_tracks_instance_identity() {
        let a = FetcherHandle::basic(UserFetcher);
        let b = a.clone();
        let c = FetcherHandle::basic(UserFetcher);
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
    }

    #[test]
    fn descriptor_captures_introspection() {
        let handle = FetcherHandle::with_fallback(FlakyFetcher {
            allowed: vec!["limit".into()],
        });
        let key = FetchKey::parse("flaky").unwrap();
        let desc = handle.descriptor(&key);
        assert_eq!(desc.key, key);
        assert_eq!(desc.description, "Always unavailable");
        assert!(desc.supports_fallback);
        assert_eq!(desc.allowed_params, vec!["limit".to_string()]);
    }
}
