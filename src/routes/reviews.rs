use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{MovieId, NewRating, Rating, RatingUpdate},
    routes::AppState,
};

/// Submits a review; one per user and movie
pub async fn create(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<NewRating>,
) -> AppResult<(StatusCode, Json<Rating>)> {
    let rating = state
        .ratings
        .create_rating(user_id, request.validated()?)
        .await?;
    Ok((StatusCode::CREATED, Json(rating)))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path((user_id, review_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<RatingUpdate>,
) -> AppResult<Json<Rating>> {
    let rating = state
        .ratings
        .update_rating(user_id, review_id, request.validated()?)
        .await?;
    Ok(Json(rating))
}

pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path((user_id, review_id)): Path<(Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    state.ratings.delete_rating(user_id, review_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// All reviews of a movie, newest first
pub async fn for_movie(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<MovieId>,
) -> AppResult<Json<Vec<Rating>>> {
    let ratings = state.ratings.ratings_for_movie(movie_id).await?;
    Ok(Json(ratings))
}

/// The user's own review of a movie; `null` when they have not reviewed it
pub async fn own(
    State(state): State<Arc<AppState>>,
    Path((user_id, movie_id)): Path<(Uuid, MovieId)>,
) -> AppResult<Json<Option<Rating>>> {
    let rating = state.ratings.rating_for_user_movie(user_id, movie_id).await?;
    Ok(Json(rating))
}
