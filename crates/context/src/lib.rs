//! Context aggregation: the per-invocation half of Gleaner.
//!
//! A [`Context`] is created once per job or request with immutable base
//! data (current user, workspace, ...). Calling code then pulls
//! enrichment data from registered fetchers by key:
//!
//! 1. **Resolve** the key in the shared registry (unknown keys are an error)
//! 2. **Merge** base data with the call's params (params win)
//! 3. **Fetch**, recording the outcome in the key's slot
//! 4. **Recover** from fetcher failures locally, using fallback data when
//!    the fetcher offers it
//!
//! [`Context::to_mapping`] then yields base data overlaid with everything
//! fetched, ready for prompt construction.

pub mod context;
pub mod request;
pub mod slot;

pub use context::Context;
pub use request::FetchRequest;
pub use slot::FetchSlot;
