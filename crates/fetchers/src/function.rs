//! Closure-backed fetchers for small, synchronous data sources.

use async_trait::async_trait;
use gleaner_core::{FetchError, Fetcher, Params};

/// Wraps `Fn(&Params) -> Result<Params, FetchError>` as a fetcher.
pub struct FnFetcher<F> {
    name: String,
    description: String,
    f: F,
}

impl<F> FnFetcher<F>
where
    F: Fn(&Params) -> Result<Params, FetchError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            f,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

#[async_trait]
impl<F> Fetcher for FnFetcher<F>
where
    F: Fn(&Params) -> Result<Params, FetchError> + Send + Sync,
{
    async fn fetch(&self, params: &Params) -> Result<Params, FetchError> {
        (self.f)(params)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }
}
