use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::PlaceId;

/// Cache-equivalence key for a recommendation lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecommendationQuery {
    pub place_id: PlaceId,
    pub radius_meters: u32,
    pub limit: usize,
}

impl Display for RecommendationQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "recs:{}:{}:{}",
            self.place_id, self.radius_meters, self.limit
        )
    }
}

/// One point of interest returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationItem {
    pub name: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub wiki_url: Option<String>,
    pub image: Option<String>,
}

/// The ordered result of one aggregation pass
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationSnapshot {
    pub items: Vec<RecommendationItem>,
    pub created_at: DateTime<Utc>,
}

impl RecommendationSnapshot {
    pub fn new(items: Vec<RecommendationItem>) -> Self {
        Self {
            items,
            created_at: Utc::now(),
        }
    }

    pub fn available(&self) -> bool {
        !self.items.is_empty()
    }
}

/// A stored snapshot. Entries are immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheEntry {
    pub query: RecommendationQuery,
    pub snapshot: RecommendationSnapshot,
    pub created_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(
        query: RecommendationQuery,
        snapshot: RecommendationSnapshot,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            query,
            snapshot,
            created_at,
        }
    }

    /// Whether the entry may still satisfy a read at `now`
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.created_at < ttl
    }
}

/// Response body for the recommendations endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationsResponse {
    pub available: bool,
    pub items: Vec<RecommendationItem>,
}

impl RecommendationsResponse {
    pub fn unavailable() -> Self {
        Self {
            available: false,
            items: Vec::new(),
        }
    }
}

impl From<RecommendationSnapshot> for RecommendationsResponse {
    fn from(snapshot: RecommendationSnapshot) -> Self {
        Self {
            available: snapshot.available(),
            items: snapshot.items,
        }
    }
}
