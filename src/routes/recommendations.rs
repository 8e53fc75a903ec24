use axum::{
    extract::{Path, State},
    Extension, Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::AppResult, middleware::RequestId, models::RecommendationResponse, routes::AppState,
};

/// Handler for personalized recommendations
///
/// Always answers with a well-formed body; an empty `results` array means there
/// is nothing to recommend, not that something failed.
pub async fn personalized(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<RecommendationResponse>> {
    tracing::info!(
        request_id = %request_id,
        user_id = %user_id,
        "Processing recommendation request"
    );

    let response = state.engine.recommend(user_id).await.map_err(|e| {
        tracing::error!(
            request_id = %request_id,
            user_id = %user_id,
            error = %e,
            "Recommendation request failed"
        );
        e
    })?;

    tracing::info!(
        request_id = %request_id,
        total_results = response.total_results,
        "Recommendation request completed"
    );

    Ok(Json(response))
}
