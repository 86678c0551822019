use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{
    db::{PlaceRepository, RecommendationStore},
    error::AppResult,
    models::{CacheEntry, Place, PlaceId, RecommendationQuery, RecommendationSnapshot},
};

/// Source of the current time, swappable in tests
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Process-local snapshot store with the same append-only semantics as Redis
pub struct InMemoryRecommendationStore {
    entries: RwLock<Vec<CacheEntry>>,
    ttl: Duration,
    clock: Clock,
}

impl InMemoryRecommendationStore {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(Utc::now))
    }

    pub fn with_clock(ttl: Duration, clock: Clock) -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            ttl,
            clock,
        }
    }

    /// Number of entries ever written, stale ones included
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl RecommendationStore for InMemoryRecommendationStore {
    async fn get(&self, query: &RecommendationQuery) -> AppResult<Option<RecommendationSnapshot>> {
        let now = (self.clock)();
        let entries = self.entries.read().await;

        let snapshot = entries
            .iter()
            .rev()
            .find(|entry| entry.query == *query)
            .filter(|entry| entry.is_fresh(now, self.ttl))
            .map(|entry| entry.snapshot.clone());

        Ok(snapshot)
    }

    async fn put(
        &self,
        query: &RecommendationQuery,
        snapshot: &RecommendationSnapshot,
    ) -> AppResult<()> {
        let entry = CacheEntry::new(*query, snapshot.clone(), (self.clock)());
        self.entries.write().await.push(entry);
        Ok(())
    }
}

/// Fixed set of places, for tests and local runs
#[derive(Default)]
pub struct InMemoryPlaceRepository {
    places: RwLock<HashMap<PlaceId, Place>>,
}

impl InMemoryPlaceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, place: Place) {
        self.places.write().await.insert(place.id, place);
    }
}

#[async_trait::async_trait]
impl PlaceRepository for InMemoryPlaceRepository {
    async fn find_place(&self, id: &PlaceId) -> AppResult<Option<Place>> {
        Ok(self.places.read().await.get(id).cloned())
    }
}
