//! # Gleaner Core
//!
//! The fetcher contract, the fetcher registry, error types and domain
//! events for the Gleaner context aggregation engine. Concrete data
//! sources implement [`Fetcher`] in their own crates; Contexts live in
//! `gleaner-context`.
//!
//! ## Design Philosophy
//!
//! The optional fallback capability is carried by the type of the
//! registered [`FetcherHandle`], and the registry is an explicit instance
//! shared through an `Arc`. There is no ambient global state.

pub mod error;
pub mod event;
pub mod fetcher;
pub mod key;
pub mod registry;

// Re-export key types at crate root for ergonomics
pub use error::{ContextError, Error, FetchError, RegistryError, Result};
pub use event::{DomainEvent, EventBus, FetchOutcome};
pub use fetcher::{FallbackFetcher, Fetcher, FetcherDescriptor, FetcherHandle, Params};
pub use key::FetchKey;
pub use registry::FetcherRegistry;
