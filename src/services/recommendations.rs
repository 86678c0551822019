use futures::stream::{self, StreamExt};
use reqwest::Client as HttpClient;
use std::sync::Arc;

use crate::{
    cached,
    config::Config,
    db::{PlaceRepository, RecommendationStore},
    error::{AppError, AppResult},
    models::{
        OverpassElement, PlaceId, RecommendationItem, RecommendationQuery,
        RecommendationSnapshot, RecommendationsResponse,
    },
    services::{
        enrichment::{reference_url, ImageResolverChain},
        providers::{build_overpass_query, FailoverProvider, PoiProvider},
    },
};

pub const DEFAULT_LIMIT: usize = 9;
pub const DEFAULT_RADIUS_METERS: u32 = 50_000;
pub const DEFAULT_ENRICHMENT_CONCURRENCY: usize = 4;
pub const DEFAULT_OVERPASS_TIMEOUT_SECS: u64 = 25;

#[derive(Debug, Clone, Copy)]
pub struct RecommendationSettings {
    pub radius_meters: u32,
    pub enrichment_concurrency: usize,
    /// Written into the query as the server-side `[timeout:N]`
    pub overpass_timeout_secs: u64,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            radius_meters: DEFAULT_RADIUS_METERS,
            enrichment_concurrency: DEFAULT_ENRICHMENT_CONCURRENCY,
            overpass_timeout_secs: DEFAULT_OVERPASS_TIMEOUT_SECS,
        }
    }
}

/// Points of interest around a stored place, enriched and cached
///
/// `recommend` never fails from the caller's point of view: a malformed id,
/// an unknown place or an unreachable Overpass all come back as an empty,
/// unavailable response. Only a successful Overpass answer is cached, even
/// when no element qualifies.
pub struct RecommendationService {
    places: Arc<dyn PlaceRepository>,
    store: Arc<dyn RecommendationStore>,
    provider: Arc<dyn PoiProvider>,
    images: Arc<ImageResolverChain>,
    settings: RecommendationSettings,
}

impl RecommendationService {
    pub fn new(
        places: Arc<dyn PlaceRepository>,
        store: Arc<dyn RecommendationStore>,
        provider: Arc<dyn PoiProvider>,
        images: Arc<ImageResolverChain>,
        settings: RecommendationSettings,
    ) -> Self {
        // `buffered(0)` would never poll the enrichment stream
        let settings = RecommendationSettings {
            enrichment_concurrency: settings.enrichment_concurrency.max(1),
            ..settings
        };

        Self {
            places,
            store,
            provider,
            images,
            settings,
        }
    }

    /// Wires the Overpass failover and the standard image chain from config
    pub fn from_config(
        config: &Config,
        http_client: HttpClient,
        places: Arc<dyn PlaceRepository>,
        store: Arc<dyn RecommendationStore>,
    ) -> AppResult<Self> {
        let provider = FailoverProvider::from_endpoints(
            http_client.clone(),
            &config.overpass_urls,
            config.overpass_timeout(),
            &config.user_agent,
        )?;
        let images = ImageResolverChain::standard(http_client, config);

        Ok(Self::new(
            places,
            store,
            Arc::new(provider),
            Arc::new(images),
            RecommendationSettings {
                radius_meters: config.search_radius_meters,
                enrichment_concurrency: config.enrichment_concurrency,
                overpass_timeout_secs: config.overpass_timeout_secs,
            },
        ))
    }

    pub async fn recommend(&self, place_id: &str, limit: usize) -> RecommendationsResponse {
        let place_id: PlaceId = match place_id.parse() {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(error = %e, "Rejected recommendation request");
                return RecommendationsResponse::unavailable();
            }
        };

        let query = RecommendationQuery {
            place_id,
            radius_meters: self.settings.radius_meters,
            limit,
        };

        let result: AppResult<RecommendationSnapshot> =
            cached!(self.store, query, self.compute_snapshot(&query));

        match result {
            Ok(snapshot) => {
                tracing::info!(
                    key = %query,
                    items = snapshot.items.len(),
                    "Recommendations ready"
                );
                snapshot.into()
            }
            Err(e) => {
                tracing::warn!(key = %query, error = %e, "No recommendations available");
                RecommendationsResponse::unavailable()
            }
        }
    }

    /// Cache-miss path: place → Overpass → map and enrich
    async fn compute_snapshot(&self, query: &RecommendationQuery) -> AppResult<RecommendationSnapshot> {
        let place = self
            .places
            .find_place(&query.place_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Place {}", query.place_id)))?;

        let overpass_query = build_overpass_query(
            place.latitude,
            place.longitude,
            query.radius_meters,
            self.settings.overpass_timeout_secs,
        );
        let response = self.provider.query(&overpass_query).await?;

        tracing::debug!(
            place_id = %query.place_id,
            elements = response.elements.len(),
            "Mapping Overpass elements"
        );

        let items = self.map_and_enrich(response.elements, query.limit).await;
        Ok(RecommendationSnapshot::new(items))
    }

    /// Named elements in source order, cut at `limit` before any enrichment
    ///
    /// Enrichment runs with bounded concurrency; output order is input order.
    async fn map_and_enrich(
        &self,
        elements: Vec<OverpassElement>,
        limit: usize,
    ) -> Vec<RecommendationItem> {
        let candidates = elements
            .into_iter()
            .filter(|element| element.name().is_some())
            .take(limit);

        stream::iter(candidates)
            .map(|element| self.enrich(element))
            .buffered(self.settings.enrichment_concurrency)
            .collect()
            .await
    }

    async fn enrich(&self, element: OverpassElement) -> RecommendationItem {
        let (lat, lon) = element.coordinates();
        let wiki_url = reference_url(&element.tags);
        let image = self.images.resolve(&element.tags).await;

        RecommendationItem {
            name: element.name().unwrap_or_default().to_string(),
            lat,
            lon,
            wiki_url,
            image,
        }
    }
}
