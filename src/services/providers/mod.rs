/// Point-of-interest data providers
///
/// A provider answers an Overpass QL query with the raw interpreter response.
/// Single endpoints and the ordered failover wrapper share the same trait, so
/// the orchestrator never knows how many interpreters sit behind it.
use crate::{error::AppResult, models::OverpassResponse};

pub mod failover;
pub mod overpass;

pub use failover::FailoverProvider;
pub use overpass::{build_overpass_query, OverpassEndpoint};

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PoiProvider: Send + Sync {
    /// Runs one Overpass QL query
    async fn query(&self, overpass_query: &str) -> AppResult<OverpassResponse>;

    /// Provider name for logging and debugging
    fn name(&self) -> String;
}
