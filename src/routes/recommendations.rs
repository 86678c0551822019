use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::RecommendationsResponse,
    routes::AppState,
    services::recommendations::DEFAULT_LIMIT,
};

pub const MAX_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct RecommendationParams {
    pub limit: Option<usize>,
}

/// Handler for the place recommendations endpoint
///
/// Upstream trouble never turns into an error status; callers get
/// `{"available": false, "items": []}` instead.
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(place_id): Path<String>,
    Query(params): Query<RecommendationParams>,
) -> AppResult<Json<RecommendationsResponse>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(AppError::InvalidInput(format!(
            "limit must be between 1 and {}",
            MAX_LIMIT
        )));
    }

    tracing::info!(
        request_id = %request_id,
        place_id = %place_id,
        limit,
        "Processing recommendations request"
    );

    let response = state.recommendations.recommend(&place_id, limit).await;

    tracing::info!(
        request_id = %request_id,
        available = response.available,
        items = response.items.len(),
        "Recommendations request completed"
    );

    Ok(Json(response))
}
