//! Error types for the Gleaner domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Gleaner operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Registry errors ---
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    // --- Context errors ---
    #[error("Context error: {0}")]
    Context(#[from] ContextError),

    // --- Fetcher errors ---
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Raised at registration time. Misconfiguration fails fast at boot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Invalid fetch key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },
}

/// Raised by a Context when a requested key cannot be served at all.
///
/// This is a deployment or programming mistake, so it is propagated to the
/// caller rather than recorded as a per-key failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("No fetcher registered for key: {0}")]
    NotRegistered(String),
}

/// Raised by a fetcher's primary `fetch`. Always recovered by the Context.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("{0}")]
    Failed(String),

    #[error("data source unavailable: {0}")]
    Unavailable(String),

    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error("timed out after {timeout_ms}ms ({fetcher})")]
    Timeout { fetcher: String, timeout_ms: u64 },
}

impl FetchError {
    /// Shorthand for the generic failure variant.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}
