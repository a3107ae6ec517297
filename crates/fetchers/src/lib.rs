//! Generic fetcher adapters for Gleaner.
//!
//! Concrete data sources (databases, HTTP APIs, embedding search) live with
//! the applications that own them. This crate provides the building blocks
//! those applications and the `gleaner` CLI compose: fixed data, closures,
//! an echo source for diagnostics, and wrappers that add a fallback or a
//! per-call deadline to any fetcher.

pub mod echo;
pub mod fallback;
pub mod function;
pub mod static_data;
pub mod timeout;

use std::sync::Arc;
use std::time::Duration;

use gleaner_config::{GleanerConfig, StaticFetcherConfig};
use gleaner_core::{EventBus, FetcherHandle, FetcherRegistry, RegistryError};
use tracing::debug;

pub use echo::EchoFetcher;
pub use fallback::WithFallback;
pub use function::FnFetcher;
pub use static_data::StaticFetcher;
pub use timeout::{TimeoutFetcher, with_timeout};

/// Build a registry from configuration.
///
/// Registers `echo` plus every enabled `[[static_fetchers]]` entry. When
/// `fetch.timeout_secs` is set, each configured entry gets that deadline.
pub fn default_registry(
    config: &GleanerConfig,
    events: Option<Arc<EventBus>>,
) -> Result<FetcherRegistry, RegistryError> {
    let registry = match events {
        Some(events) => FetcherRegistry::with_events(events),
        None => FetcherRegistry::new(),
    };
    registry.register_basic("echo", EchoFetcher)?;

    let timeout = (config.fetch.timeout_secs > 0)
        .then(|| Duration::from_secs(config.fetch.timeout_secs));

    for entry in &config.static_fetchers {
        if !entry.enabled {
            debug!(key = %entry.key, "Skipping disabled static fetcher");
            continue;
        }
        let handle = static_handle(entry);
        let handle = match timeout {
            Some(timeout) => with_timeout(handle, timeout),
            None => handle,
        };
        registry.register(&entry.key, handle)?;
    }

    Ok(registry)
}

fn static_handle(entry: &StaticFetcherConfig) -> FetcherHandle {
    let fetcher = StaticFetcher::from_config(entry);
    match &entry.fallback {
        Some(data) => FetcherHandle::with_fallback(WithFallback::fixed(fetcher, data.clone())),
        None => FetcherHandle::basic(fetcher),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gleaner_core::Params;

    fn entry(key: &str, data: Option<Params>, fallback: Option<Params>) -> StaticFetcherConfig {
        StaticFetcherConfig {
            key: key.into(),
            description: format!("{key} source"),
            data,
            fallback,
            allowed_params: vec![],
            enabled: true,
        }
    }

    #[test]
    fn default_registry_has_echo() {
        let registry = default_registry(&GleanerConfig::default(), None).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.is_registered("echo"));
    }

    #[test]
    fn static_fetchers_are_registered_with_capabilities() {
        let mut config = GleanerConfig::default();
        config.static_fetchers.push(entry("company", Some(Params::new()), None));
        config.static_fetchers.push(entry("status", None, Some(Params::new())));
        let mut disabled = entry("retired", Some(Params::new()), None);
        disabled.enabled = false;
        config.static_fetchers.push(disabled);

        let registry = default_registry(&config, None).unwrap();

        assert!(!registry.get("company").unwrap().supports_fallback());
        assert!(registry.get("status").unwrap().supports_fallback());
        assert!(!registry.is_registered("retired"));
        assert_eq!(registry.get("company").unwrap().description(), "company source");
    }

    #[tokio::test]
    async fn placeholder_source_serves_fallback() {
        let mut fallback = Params::new();
        fallback.insert("status".into(), "unknown".into());
        let mut config = GleanerConfig::default();
        config.fetch.timeout_secs = 5;
        config.static_fetchers.push(entry("status", None, Some(fallback.clone())));

        let registry = default_registry(&config, None).unwrap();
        let handle = registry.get("status").unwrap();

        assert!(handle.fetch(&Params::new()).await.is_err());
        assert_eq!(handle.fallback_data(&Params::new()).await, Some(fallback));
    }

    #[tokio::test]
    async fn registry_publishes_to_given_bus() {
        let bus = Arc::new(EventBus::new(8));
        let mut rx = bus.subscribe();
        let registry = default_registry(&GleanerConfig::default(), Some(bus)).unwrap();

        assert!(registry.events().is_some());
        assert!(rx.recv().await.is_ok());
    }
}
