use reqwest::Client as HttpClient;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    error::{AppError, AppResult},
    models::OverpassResponse,
    services::providers::{OverpassEndpoint, PoiProvider},
};

/// Ordered list of interchangeable providers
///
/// Every call starts again from the first provider; a provider that fails is
/// skipped for the rest of that call only. Nothing is remembered between calls.
pub struct FailoverProvider {
    providers: Vec<Arc<dyn PoiProvider>>,
}

impl FailoverProvider {
    pub fn new(providers: Vec<Arc<dyn PoiProvider>>) -> AppResult<Self> {
        if providers.is_empty() {
            return Err(AppError::InvalidInput(
                "At least one Overpass endpoint is required".to_string(),
            ));
        }
        Ok(Self { providers })
    }

    /// One [`OverpassEndpoint`] per non-blank URL, in the given order
    pub fn from_endpoints(
        http_client: HttpClient,
        urls: &[String],
        timeout: Duration,
        user_agent: &str,
    ) -> AppResult<Self> {
        let providers = urls
            .iter()
            .map(|url| url.trim())
            .filter(|url| !url.is_empty())
            .map(|url| {
                Arc::new(OverpassEndpoint::new(
                    http_client.clone(),
                    url.to_string(),
                    timeout,
                    user_agent.to_string(),
                )) as Arc<dyn PoiProvider>
            })
            .collect();

        Self::new(providers)
    }
}

#[async_trait::async_trait]
impl PoiProvider for FailoverProvider {
    async fn query(&self, overpass_query: &str) -> AppResult<OverpassResponse> {
        for (attempt, provider) in self.providers.iter().enumerate() {
            match provider.query(overpass_query).await {
                Ok(response) => {
                    tracing::info!(
                        endpoint = %provider.name(),
                        attempt = attempt + 1,
                        elements = response.elements.len(),
                        "Overpass query answered"
                    );
                    return Ok(response);
                }
                Err(e) => {
                    tracing::warn!(
                        endpoint = %provider.name(),
                        attempt = attempt + 1,
                        error = %e,
                        "Overpass endpoint failed, trying next"
                    );
                }
            }
        }

        Err(AppError::ExternalApi(format!(
            "All {} Overpass endpoints failed",
            self.providers.len()
        )))
    }

    fn name(&self) -> String {
        "failover".to_string()
    }
}
