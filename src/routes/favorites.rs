use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::{error::AppResult, models::MovieId, routes::AppState};

#[derive(Debug, Deserialize)]
pub struct AddFavoriteRequest {
    pub movie_id: MovieId,
}

#[derive(Debug, Serialize)]
pub struct FavoriteStatus {
    pub is_favorite: bool,
}

/// Newest first
pub async fn list(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<Vec<MovieId>>> {
    let ids = state.favorites.favorite_movie_ids(user_id).await?;
    Ok(Json(ids))
}

pub async fn add(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<AddFavoriteRequest>,
) -> AppResult<StatusCode> {
    state.favorites.add_favorite(user_id, request.movie_id).await?;
    Ok(StatusCode::CREATED)
}

pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path((user_id, movie_id)): Path<(Uuid, MovieId)>,
) -> AppResult<StatusCode> {
    state.favorites.remove_favorite(user_id, movie_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn check(
    State(state): State<Arc<AppState>>,
    Path((user_id, movie_id)): Path<(Uuid, MovieId)>,
) -> AppResult<Json<FavoriteStatus>> {
    let is_favorite = state.favorites.is_favorite(user_id, movie_id).await?;
    Ok(Json(FavoriteStatus { is_favorite }))
}
