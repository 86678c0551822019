use reqwest::{header::USER_AGENT, Client as HttpClient};
use std::time::Duration;

use crate::{
    error::{AppError, AppResult},
    models::OverpassResponse,
    services::providers::PoiProvider,
};

/// Tourism values that count as a recommendation
const TOURISM_PATTERN: &str = "museum|attraction|viewpoint|gallery";

/// Builds the around-query for tourism and historic features
///
/// Ways and relations are requested with `out center` so they carry a centroid.
/// `timeout_secs` is the server-side budget and should match the client timeout.
pub fn build_overpass_query(lat: f64, lon: f64, radius_meters: u32, timeout_secs: u64) -> String {
    let around = format!("(around:{},{},{})", radius_meters, lat, lon);
    let mut query = format!("[out:json][timeout:{}];\n(\n", timeout_secs);

    for element in ["node", "way", "relation"] {
        query.push_str(&format!(
            "  {}[\"tourism\"~\"{}\"]{};\n",
            element, TOURISM_PATTERN, around
        ));
    }
    for element in ["node", "way", "relation"] {
        query.push_str(&format!("  {}[\"historic\"]{};\n", element, around));
    }

    query.push_str(");\nout center;\n");
    query
}

/// One Overpass interpreter
#[derive(Clone)]
pub struct OverpassEndpoint {
    http_client: HttpClient,
    url: String,
    timeout: Duration,
    user_agent: String,
}

impl OverpassEndpoint {
    pub fn new(http_client: HttpClient, url: String, timeout: Duration, user_agent: String) -> Self {
        Self {
            http_client,
            url,
            timeout,
            user_agent,
        }
    }
}

#[async_trait::async_trait]
impl PoiProvider for OverpassEndpoint {
    async fn query(&self, overpass_query: &str) -> AppResult<OverpassResponse> {
        let response = self
            .http_client
            .post(&self.url)
            .header(USER_AGENT, &self.user_agent)
            .timeout(self.timeout)
            .form(&[("data", overpass_query)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Overpass returned status {}: {}",
                status, body
            )));
        }

        let data: OverpassResponse = response.json().await?;

        tracing::debug!(
            endpoint = %self.url,
            elements = data.elements.len(),
            "Overpass query succeeded"
        );

        Ok(data)
    }

    fn name(&self) -> String {
        self.url.clone()
    }
}
