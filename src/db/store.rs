use crate::{
    error::AppResult,
    models::{Place, PlaceId, RecommendationQuery, RecommendationSnapshot},
};

/// Read access to places created by the place-selection flow
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PlaceRepository: Send + Sync {
    /// Returns `None` when no place with this id exists
    async fn find_place(&self, id: &PlaceId) -> AppResult<Option<Place>>;
}

/// Time-bounded store of recommendation snapshots
///
/// Entries are append-only: `put` never replaces an earlier entry for the same
/// query, and `get` only considers the newest entry, which must still be within
/// the store's TTL. Expired entries are ignored rather than purged.
///
/// Writes may be applied asynchronously: a `get` issued right after `put`
/// returns is not guaranteed to observe the new entry.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecommendationStore: Send + Sync {
    async fn get(&self, query: &RecommendationQuery) -> AppResult<Option<RecommendationSnapshot>>;

    async fn put(
        &self,
        query: &RecommendationQuery,
        snapshot: &RecommendationSnapshot,
    ) -> AppResult<()>;
}
