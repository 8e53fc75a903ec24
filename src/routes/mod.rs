use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    middleware::{make_span_with_request_id, request_id_middleware},
    services::{
        providers::CatalogProvider,
        recommendations::{RecommendationEngine, RecommendationSettings},
        store::{FavoriteStore, ProfileStore, RatingStore},
    },
};

pub mod favorites;
pub mod recommendations;
pub mod reviews;
pub mod watched;

/// Shared handler state: store handles and the recommendation engine
#[derive(Clone)]
pub struct AppState {
    pub ratings: Arc<dyn RatingStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub favorites: Arc<dyn FavoriteStore>,
    pub engine: RecommendationEngine,
}

impl AppState {
    pub fn new(
        ratings: Arc<dyn RatingStore>,
        profiles: Arc<dyn ProfileStore>,
        favorites: Arc<dyn FavoriteStore>,
        catalog: Arc<dyn CatalogProvider>,
        settings: RecommendationSettings,
    ) -> Self {
        let engine = RecommendationEngine::new(
            ratings.clone(),
            profiles.clone(),
            favorites.clone(),
            catalog,
            settings,
        );

        Self {
            ratings,
            profiles,
            favorites,
            engine,
        }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/users/:user_id/recommendations",
            get(recommendations::personalized),
        )
        .route("/users/:user_id/watched", get(watched::list))
        .route("/users/:user_id/watched/:movie_id", post(watched::mark))
        .route(
            "/users/:user_id/preferences/genres",
            put(watched::set_favorite_genres),
        )
        .route(
            "/users/:user_id/favorites",
            get(favorites::list).post(favorites::add),
        )
        .route(
            "/users/:user_id/favorites/:movie_id",
            get(favorites::check).delete(favorites::remove),
        )
        .route("/users/:user_id/reviews", post(reviews::create))
        .route(
            "/users/:user_id/movies/:movie_id/review",
            get(reviews::own),
        )
        .route(
            "/users/:user_id/reviews/:review_id",
            put(reviews::update).delete(reviews::remove),
        )
        .route("/movies/:movie_id/reviews", get(reviews::for_movie))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
