//! The per-invocation aggregator.
//!
//! Holds immutable base data plus one [`FetchSlot`] per fetched key. A
//! fetcher failure is recorded in its slot and never aborts the
//! aggregation; only an unknown key is reported to the caller.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::future::join_all;
use gleaner_core::{
    ContextError, DomainEvent, EventBus, FetchKey, FetcherHandle, FetcherRegistry, Params,
};
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::request::FetchRequest;
use crate::slot::FetchSlot;

/// Aggregates base data with selectively fetched data for one job or request.
///
/// Not meant to be shared: every method that changes state takes
/// `&mut self`. Create one Context per concurrent unit of work.
#[derive(Debug)]
pub struct Context {
    id: Uuid,
    registry: Arc<FetcherRegistry>,
    base_data: Params,
    slots: BTreeMap<FetchKey, FetchSlot>,
}

impl Context {
    pub fn new(registry: Arc<FetcherRegistry>, base_data: Params) -> Self {
        Self {
            id: Uuid::new_v4(),
            registry,
            base_data,
            slots: BTreeMap::new(),
        }
    }

    /// Unique id of this aggregation, attached to every log line and event.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn base_data(&self) -> &Params {
        &self.base_data
    }

    /// Fetch data for `key`, with `params` layered over the base data.
    ///
    /// Returns the fetched data, the fallback data when the fetcher failed
    /// and offers a fallback, or an empty mapping when it failed without
    /// one. Only an unregistered key is an error.
    pub async fn fetch(&mut self, key: &str, params: Params) -> Result<Params, ContextError> {
        let (key, handle) = self.resolve(key)?;
        let fetch_params = self.merge_params(params);

        let slot = execute(
            self.id,
            self.registry.events(),
            &key,
            &handle,
            &fetch_params,
        )
        .await;

        let data = slot.data().cloned().unwrap_or_default();
        self.slots.insert(key, slot);
        Ok(data)
    }

    /// Fetch each entry in order. A repeated key keeps only its last result.
    ///
    /// Stops at the first unregistered key; entries before it keep their
    /// results. Returns a snapshot of all fetched data.
    pub async fn fetch_multiple<I>(
        &mut self,
        entries: I,
    ) -> Result<BTreeMap<FetchKey, Params>, ContextError>
    where
        I: IntoIterator,
        I::Item: Into<FetchRequest>,
    {
        for entry in entries {
            let (key, params) = entry.into().into_parts();
            self.fetch(&key, params).await?;
        }
        Ok(self.fetched_data())
    }

    /// Same final state as [`fetch_multiple`](Self::fetch_multiple), with
    /// the fetches running concurrently.
    ///
    /// Every key is resolved before anything runs, so an unregistered key
    /// fails the whole batch up front. Outcomes are applied in submission
    /// order: the last entry for a key wins regardless of completion order.
    pub async fn fetch_concurrent<I>(
        &mut self,
        entries: I,
    ) -> Result<BTreeMap<FetchKey, Params>, ContextError>
    where
        I: IntoIterator,
        I::Item: Into<FetchRequest>,
    {
        let mut prepared = Vec::new();
        for entry in entries {
            let (key, params) = entry.into().into_parts();
            let (key, handle) = self.resolve(&key)?;
            let fetch_params = self.merge_params(params);
            prepared.push((key, handle, fetch_params));
        }

        let events = self.registry.events();
        let slots = join_all(prepared.iter().map(|(key, handle, params)| {
            execute(self.id, events, key, handle, params)
        }))
        .await;

        for ((key, _, _), slot) in prepared.into_iter().zip(slots) {
            self.slots.insert(key, slot);
        }
        Ok(self.fetched_data())
    }

    /// Base data overlaid with every fetched mapping. Fetched values win.
    pub fn to_mapping(&self) -> Params {
        let mut mapping = self.base_data.clone();
        for (key, slot) in &self.slots {
            if let Some(data) = slot.data() {
                mapping.insert(key.to_string(), Value::Object(data.clone()));
            }
        }
        mapping
    }

    /// Fetched (or fallback) data for `key`. Ignores errors.
    pub fn get(&self, key: &str) -> Option<&Params> {
        self.slots.get(key).and_then(FetchSlot::data)
    }

    /// The full outcome record for `key`.
    pub fn slot(&self, key: &str) -> Option<&FetchSlot> {
        self.slots.get(key)
    }

    /// True only when the primary fetch succeeded. Fallback data present
    /// for a failed key does not count.
    pub fn is_success(&self, key: &str) -> bool {
        self.slots.get(key).is_some_and(FetchSlot::is_success)
    }

    pub fn is_error(&self, key: &str) -> bool {
        self.error_message(key).is_some()
    }

    pub fn error_message(&self, key: &str) -> Option<&str> {
        self.slots.get(key).and_then(FetchSlot::error)
    }

    pub fn has_errors(&self) -> bool {
        self.slots.values().any(|slot| slot.error().is_some())
    }

    pub fn successful_keys(&self) -> BTreeSet<FetchKey> {
        self.slots
            .iter()
            .filter(|(_, slot)| slot.is_success())
            .map(|(key, _)| key.clone())
            .collect()
    }

    pub fn error_keys(&self) -> BTreeSet<FetchKey> {
        self.slots
            .iter()
            .filter(|(_, slot)| slot.error().is_some())
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Snapshot of every key that carries data.
    pub fn fetched_data(&self) -> BTreeMap<FetchKey, Params> {
        self.slots
            .iter()
            .filter_map(|(key, slot)| slot.data().map(|data| (key.clone(), data.clone())))
            .collect()
    }

    /// Snapshot of every recorded failure message.
    pub fn errors(&self) -> BTreeMap<FetchKey, String> {
        self.slots
            .iter()
            .filter_map(|(key, slot)| slot.error().map(|error| (key.clone(), error.to_string())))
            .collect()
    }

    /// Forget every fetch outcome. Base data is untouched.
    pub fn reset(&mut self) {
        debug!(context_id = %self.id, cleared = self.slots.len(), "Context reset");
        self.slots.clear();
    }

    fn resolve(&self, key: &str) -> Result<(FetchKey, FetcherHandle), ContextError> {
        self.registry
            .resolve(key)
            .ok_or_else(|| ContextError::NotRegistered(key.to_string()))
    }

    fn merge_params(&self, params: Params) -> Params {
        let mut merged = self.base_data.clone();
        merged.extend(params);
        merged
    }
}

/// Run one fetch and turn its result into a slot. Never fails.
async fn execute(
    context_id: Uuid,
    events: Option<&Arc<EventBus>>,
    key: &FetchKey,
    handle: &FetcherHandle,
    params: &Params,
) -> FetchSlot {
    let started = Instant::now();

    let slot = match handle.fetch(params).await {
        Ok(data) => FetchSlot::Success { data },
        Err(e) => {
            let error = format!("Failed to fetch data for '{key}': {e}");
            match handle.fallback_data(params).await {
                Some(data) => FetchSlot::FailedWithFallback { data, error },
                None => FetchSlot::FailedNoFallback { error },
            }
        }
    };

    let duration_ms = started.elapsed().as_millis() as u64;
    match slot.error() {
        None => debug!(
            context_id = %context_id,
            key = %key,
            fetcher = %handle.name(),
            duration_ms,
            "Fetched context data"
        ),
        Some(error) => warn!(
            context_id = %context_id,
            key = %key,
            fetcher = %handle.name(),
            fallback = slot.data().is_some(),
            duration_ms,
            error = %error,
            "Fetcher failed"
        ),
    }

    if let Some(events) = events {
        events.publish(DomainEvent::FetchCompleted {
            context_id: context_id.to_string(),
            key: key.to_string(),
            outcome: slot.outcome(),
            duration_ms,
            timestamp: Utc::now(),
        });
    }

    slot
}
