//! Echo fetcher: returns exactly the params it was called with.
//!
//! Handy for checking what a Context hands its fetchers: the result is the
//! base data merged with the call params.

use async_trait::async_trait;
use gleaner_core::{FetchError, Fetcher, Params};

pub struct EchoFetcher;

#[async_trait]
impl Fetcher for EchoFetcher {
    async fn fetch(&self, params: &Params) -> Result<Params, FetchError> {
        Ok(params.clone())
    }

    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Returns the merged base data and call params unchanged"
    }
}
