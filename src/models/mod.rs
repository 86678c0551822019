use serde::Deserialize;
use std::collections::HashMap;

pub mod place;
pub mod recommendation;

pub use place::{Place, PlaceId};
pub use recommendation::{
    CacheEntry, RecommendationItem, RecommendationQuery, RecommendationSnapshot,
    RecommendationsResponse,
};

/// OSM tags attached to an element
pub type Tags = HashMap<String, String>;

// ============================================================================
// Overpass API Types
// ============================================================================

/// Raw interpreter response; only `elements` is consumed
#[derive(Debug, Clone, Deserialize, Default)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<OverpassElement>,
}

/// A node, way or relation as returned with `out center`
#[derive(Debug, Clone, Deserialize, Default)]
pub struct OverpassElement {
    #[serde(default, rename = "type")]
    pub element_type: Option<String>,
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    /// Centroid for ways and relations
    #[serde(default)]
    pub center: Option<Center>,
    #[serde(default)]
    pub tags: Tags,
}

#[derive(Debug, Clone, Copy, Deserialize, Default)]
pub struct Center {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

impl OverpassElement {
    /// Non-blank `name` tag
    pub fn name(&self) -> Option<&str> {
        self.tags
            .get("name")
            .map(String::as_str)
            .filter(|name| !name.trim().is_empty())
    }

    /// Direct coordinates, falling back to the centroid per axis
    pub fn coordinates(&self) -> (Option<f64>, Option<f64>) {
        let lat = self.lat.or_else(|| self.center.and_then(|c| c.lat));
        let lon = self.lon.or_else(|| self.center.and_then(|c| c.lon));
        (lat, lon)
    }
}
