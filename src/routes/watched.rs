use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{GenreId, MovieId, WatchedMovies},
    routes::AppState,
};

#[derive(Debug, Deserialize, Serialize)]
pub struct FavoriteGenres {
    pub genre_ids: Vec<GenreId>,
}

/// Lists the user's watched movies in the order they were marked
pub async fn list(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<WatchedMovies>> {
    let profile = state.profiles.user_profile(user_id).await?;
    Ok(Json(WatchedMovies {
        watched_movies: profile.watched_movies,
    }))
}

/// Marks a movie as watched; repeating the call is a no-op
pub async fn mark(
    State(state): State<Arc<AppState>>,
    Path((user_id, movie_id)): Path<(Uuid, MovieId)>,
) -> AppResult<Json<WatchedMovies>> {
    let watched_movies = state.profiles.mark_watched(user_id, movie_id).await?;
    tracing::debug!(user_id = %user_id, movie_id, "Movie marked as watched");
    Ok(Json(WatchedMovies { watched_movies }))
}

/// Replaces the user's declared favorite genres
pub async fn set_favorite_genres(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<FavoriteGenres>,
) -> AppResult<Json<FavoriteGenres>> {
    let genre_ids = state
        .profiles
        .set_favorite_genres(user_id, body.genre_ids)
        .await?;
    Ok(Json(FavoriteGenres { genre_ids }))
}
