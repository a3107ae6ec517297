//! Fetcher registry: the single source of truth mapping keys to fetchers.
//!
//! Built once at startup, shared behind an `Arc` with everything that
//! constructs Contexts. All methods take `&self`; the map is guarded by a
//! reader-writer lock so request handlers can read while boot code writes.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::RegistryError;
use crate::event::{DomainEvent, EventBus};
use crate::fetcher::{FallbackFetcher, Fetcher, FetcherDescriptor, FetcherHandle};
use crate::key::FetchKey;

/// Registry of available fetchers, keyed by [`FetchKey`].
#[derive(Default)]
pub struct FetcherRegistry {
    fetchers: RwLock<HashMap<FetchKey, FetcherHandle>>,
    events: Option<Arc<EventBus>>,
}

impl FetcherRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry that publishes to `events`.
    pub fn with_events(events: Arc<EventBus>) -> Self {
        Self {
            fetchers: RwLock::default(),
            events: Some(events),
        }
    }

    /// The event bus this registry (and its Contexts) publish to.
    pub fn events(&self) -> Option<&Arc<EventBus>> {
        self.events.as_ref()
    }

    /// Bind `handle` to `key`. Replaces any existing fetcher for that key.
    pub fn register(&self, key: &str, handle: FetcherHandle) -> Result<(), RegistryError> {
        let key = FetchKey::parse(key)?;
        let fetcher = handle.name().to_string();
        let supports_fallback = handle.supports_fallback();

        let previous = self.write().insert(key.clone(), handle);
        let replaced = previous.is_some();
        if let Some(previous) = previous {
            warn!(
                key = %key,
                previous = %previous.name(),
                fetcher = %fetcher,
                "Replaced registered fetcher"
            );
        }
        info!(key = %key, fetcher = %fetcher, fallback = supports_fallback, "Registered fetcher");

        self.publish(DomainEvent::FetcherRegistered {
            key: key.to_string(),
            fetcher,
            supports_fallback,
            replaced,
            timestamp: Utc::now(),
        });
        Ok(())
    }

    /// Register a fetcher without fallback support.
    pub fn register_basic<F: Fetcher + 'static>(
        &self,
        key: &str,
        fetcher: F,
    ) -> Result<(), RegistryError> {
        self.register(key, FetcherHandle::basic(fetcher))
    }

    /// Register a fetcher that can supply fallback data.
    pub fn register_with_fallback<F: FallbackFetcher + 'static>(
        &self,
        key: &str,
        fetcher: F,
    ) -> Result<(), RegistryError> {
        self.register(key, FetcherHandle::with_fallback(fetcher))
    }

    /// Get a fetcher by key.
    pub fn get(&self, key: &str) -> Option<FetcherHandle> {
        self.read().get(key).cloned()
    }

    /// Get a fetcher together with its canonical key.
    pub fn resolve(&self, key: &str) -> Option<(FetchKey, FetcherHandle)> {
        self.read()
            .get_key_value(key)
            .map(|(k, h)| (k.clone(), h.clone()))
    }

    pub fn is_registered(&self, key: &str) -> bool {
        self.read().contains_key(key)
    }

    /// Remove and return the fetcher bound to `key`, if any.
    pub fn unregister(&self, key: &str) -> Option<FetcherHandle> {
        let removed = self.write().remove(key);
        match &removed {
            Some(handle) => {
                info!(key = %key, fetcher = %handle.name(), "Unregistered fetcher");
                self.publish(DomainEvent::FetcherUnregistered {
                    key: key.to_string(),
                    fetcher: handle.name().to_string(),
                    timestamp: Utc::now(),
                });
            }
            None => debug!(key = %key, "Unregister of unknown key ignored"),
        }
        removed
    }

    /// Snapshot of all registered keys.
    pub fn keys(&self) -> BTreeSet<FetchKey> {
        self.read().keys().cloned().collect()
    }

    /// Snapshot of every entry's introspection data, sorted by key.
    pub fn descriptors(&self) -> Vec<FetcherDescriptor> {
        let mut descriptors: Vec<_> = self
            .read()
            .iter()
            .map(|(key, handle)| handle.descriptor(key))
            .collect();
        descriptors.sort_by(|a, b| a.key.cmp(&b.key));
        descriptors
    }

    /// Number of registered fetchers.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Remove every entry. Meant for test isolation and fresh boot, not for
    /// reconfiguration under load.
    pub fn clear(&self) {
        let removed = {
            let mut fetchers = self.write();
            let n = fetchers.len();
            fetchers.clear();
            n
        };
        info!(removed, "Cleared fetcher registry");
        self.publish(DomainEvent::RegistryCleared {
            removed,
            timestamp: Utc::now(),
        });
    }

    fn publish(&self, event: DomainEvent) {
        if let Some(events) = &self.events {
            events.publish(event);
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<FetchKey, FetcherHandle>> {
        self.fetchers.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<FetchKey, FetcherHandle>> {
        self.fetchers.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for FetcherRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetcherRegistry")
            .field("keys", &self.keys())
            .field("events", &self.events.is_some())
            .finish()
    }
}
