//! Static fetcher: serves a fixed mapping declared up front.

use async_trait::async_trait;
use gleaner_config::StaticFetcherConfig;
use gleaner_core::{FetchError, Fetcher, Params};

/// Returns the same mapping on every call, or reports the source as
/// unavailable when it has none.
pub struct StaticFetcher {
    data: Option<Params>,
    description: String,
    allowed_params: Vec<String>,
}

impl StaticFetcher {
    pub fn new(data: Params) -> Self {
        Self {
            data: Some(data),
            description: String::new(),
            allowed_params: Vec::new(),
        }
    }

    /// A source with no data: every fetch fails with `Unavailable`.
    pub fn unavailable() -> Self {
        Self {
            data: None,
            description: String::new(),
            allowed_params: Vec::new(),
        }
    }

    pub fn from_config(config: &StaticFetcherConfig) -> Self {
        Self {
            data: config.data.clone(),
            description: config.description.clone(),
            allowed_params: config.allowed_params.clone(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_allowed_params(mut self, params: Vec<String>) -> Self {
        self.allowed_params = params;
        self
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, _params: &Params) -> Result<Params, FetchError> {
        self.data
            .clone()
            .ok_or_else(|| FetchError::Unavailable("no data configured for this source".into()))
    }

    fn name(&self) -> &str {
        "static"
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn allowed_params(&self) -> &[String] {
        &self.allowed_params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_fixed_data() {
        let mut data = Params::new();
        data.insert("name".into(), "Acme".into());
        let fetcher = StaticFetcher::new(data.clone()).with_description("Company facts");

        assert_eq!(fetcher.fetch(&Params::new()).await.unwrap(), data);
        assert_eq!(fetcher.description(), "Company facts");
    }

    #[tokio::test]
    async fn unavailable_source_fails() {
        let err = StaticFetcher::unavailable()
            .fetch(&Params::new())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Unavailable(_)));
    }

    #[test]
    fn from_config_copies_introspection() {
        let config = StaticFetcherConfig {
            key: "company".into(),
            description: "Company facts".into(),
            data: None,
            fallback: None,
            allowed_params: vec!["section".into()],
            enabled: true,
        };
        let fetcher = StaticFetcher::from_config(&config);
        assert_eq!(fetcher.description(), "Company facts");
        assert_eq!(fetcher.allowed_params(), ["section".to_string()]);
    }
}
