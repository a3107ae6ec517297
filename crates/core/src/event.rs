//! Domain event system: observable registry and fetch activity.
//!
//! Events are published when the registry changes or a Context finishes a
//! fetch. Operational tooling can subscribe without coupling to the engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// How a single fetch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchOutcome {
    Success,
    FailedNoFallback,
    FailedWithFallback,
}

/// All domain events in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    /// A fetcher was bound to a key (possibly replacing another)
    FetcherRegistered {
        key: String,
        fetcher: String,
        supports_fallback: bool,
        replaced: bool,
        timestamp: DateTime<Utc>,
    },

    /// A key's fetcher was removed
    FetcherUnregistered {
        key: String,
        fetcher: String,
        timestamp: DateTime<Utc>,
    },

    /// Every registry entry was removed
    RegistryCleared {
        removed: usize,
        timestamp: DateTime<Utc>,
    },

    /// A Context finished fetching one key
    FetchCompleted {
        context_id: String,
        key: String,
        outcome: FetchOutcome,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for domain events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
pub struct EventBus {
    sender: broadcast::Sender<Arc<DomainEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: DomainEvent) {
        // No subscribers is fine
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DomainEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
