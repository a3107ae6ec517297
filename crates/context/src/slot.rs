//! The per-key outcome record held by a Context.

use gleaner_core::{FetchOutcome, Params};
use serde::Serialize;

/// Outcome of the most recent fetch of one key.
///
/// A later fetch of the same key replaces the whole slot; outcomes are
/// never merged.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FetchSlot {
    Success { data: Params },
    FailedNoFallback { error: String },
    FailedWithFallback { data: Params, error: String },
}

impl FetchSlot {
    /// Data produced for the key, by the fetcher or its fallback.
    pub fn data(&self) -> Option<&Params> {
        match self {
            Self::Success { data } | Self::FailedWithFallback { data, .. } => Some(data),
            Self::FailedNoFallback { .. } => None,
        }
    }

    /// Formatted failure message, if the primary fetch failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::FailedNoFallback { error } | Self::FailedWithFallback { error, .. } => {
                Some(error)
            }
        }
    }

    /// Fallback data does not count as success.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn outcome(&self) -> FetchOutcome {
        match self {
            Self::Success { .. } => FetchOutcome::Success,
            Self::FailedNoFallback { .. } => FetchOutcome::FailedNoFallback,
            Self::FailedWithFallback { .. } => FetchOutcome::FailedWithFallback,
        }
    }
}
