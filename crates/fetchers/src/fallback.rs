//! Fallback wrapper: gives any fetcher the fallback capability.
//!
//! The wrapped fetcher's primary `fetch` is used as-is; when it fails the
//! Context asks this wrapper for substitute data instead.

use async_trait::async_trait;
use gleaner_core::{FallbackFetcher, FetchError, Fetcher, Params};

type ComputeFallback = Box<dyn Fn(&Params) -> Params + Send + Sync>;

enum FallbackSource {
    Fixed(Params),
    Computed(ComputeFallback),
}

/// A fetcher paired with the data to serve when it fails.
pub struct WithFallback<F> {
    inner: F,
    source: FallbackSource,
}

impl<F: Fetcher> WithFallback<F> {
    /// Serve `data` whenever `inner` fails.
    pub fn fixed(inner: F, data: Params) -> Self {
        Self {
            inner,
            source: FallbackSource::Fixed(data),
        }
    }

    /// Derive fallback data from the params of the failed call.
    pub fn computed<G>(inner: F, compute: G) -> Self
    where
        G: Fn(&Params) -> Params + Send + Sync + 'static,
    {
        Self {
            inner,
            source: FallbackSource::Computed(Box::new(compute)),
        }
    }
}

#[async_trait]
impl<F: Fetcher> Fetcher for WithFallback<F> {
    async fn fetch(&self, params: &Params) -> Result<Params, FetchError> {
        self.inner.fetch(params).await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn description(&self) -> &str {
        self.inner.description()
    }

    fn allowed_params(&self) -> &[String] {
        self.inner.allowed_params()
    }
}

#[async_trait]
impl<F: Fetcher> FallbackFetcher for WithFallback<F> {
    async fn fallback_data(&self, params: &Params) -> Params {
        match &self.source {
            FallbackSource::Fixed(data) => data.clone(),
            FallbackSource::Computed(compute) => compute(params),
        }
    }
}
