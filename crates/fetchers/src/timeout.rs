//! Timeout wrapper: a per-call deadline applied at the calling layer.
//!
//! The engine itself never times out a fetcher. Wrapping one here turns an
//! elapsed deadline into an ordinary [`FetchError::Timeout`], which the
//! Context records like any other failure (and masks with fallback data
//! when the wrapped fetcher has some).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gleaner_core::{FallbackFetcher, FetchError, Fetcher, FetcherHandle, Params};
use tracing::warn;

pub struct TimeoutFetcher<F> {
    inner: F,
    timeout: Duration,
}

impl<F: Fetcher> TimeoutFetcher<F> {
    pub fn new(inner: F, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl<F: Fetcher> Fetcher for TimeoutFetcher<F> {
    async fn fetch(&self, params: &Params) -> Result<Params, FetchError> {
        match tokio::time::timeout(self.timeout, self.inner.fetch(params)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    fetcher = %self.inner.name(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Fetcher timed out"
                );
                Err(FetchError::Timeout {
                    fetcher: self.inner.name().to_string(),
                    timeout_ms: self.timeout.as_millis() as u64,
                })
            }
        }
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

/// Fallback data is served without a deadline.
#[async_trait]
impl<F: FallbackFetcher> FallbackFetcher for TimeoutFetcher<F> {
    async fn fallback_data(&self, params: &Params) -> Params {
        self.inner.fallback_data(params).await
    }
}

/// Wrap a registered handle in a deadline, keeping its capabilities.
pub fn with_timeout(handle: FetcherHandle, timeout: Duration) -> FetcherHandle {
    match handle {
        FetcherHandle::Basic(f) => FetcherHandle::Basic(Arc::new(TimeoutFetcher::new(f, timeout))),
        FetcherHandle::WithFallback(f) => {
            FetcherHandle::WithFallback(Arc::new(TimeoutFetcher::new(f, timeout)))
        }
    }
}
