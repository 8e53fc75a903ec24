//! Persistent store abstractions
//!
//! The recommendation engine and the input-side endpoints only see these traits.
//! The Postgres implementation lives in `db::postgres`; tests substitute mocks or
//! in-memory fakes.

use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{GenreId, MovieId, NewRating, Rating, RatingUpdate, UserProfile},
};

/// Ratings (reviews) keyed by (user, movie)
///
/// The queries the engine reads return rows in creation order. The engine relies
/// on that order for choosing similarity seeds and for breaking ties between
/// neighbors.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RatingStore: Send + Sync {
    /// All ratings written by `user_id`
    async fn ratings_by_user(&self, user_id: Uuid) -> AppResult<Vec<Rating>>;

    /// Ratings at or above `min_score` on any of `movie_ids`, written by anyone
    /// other than `exclude_user`
    async fn high_ratings_for_movies(
        &self,
        movie_ids: &[MovieId],
        min_score: i16,
        exclude_user: Uuid,
    ) -> AppResult<Vec<Rating>>;

    /// Ratings at or above `min_score` written by any of `user_ids`
    async fn high_ratings_by_users(
        &self,
        user_ids: &[Uuid],
        min_score: i16,
    ) -> AppResult<Vec<Rating>>;

    /// Every review of `movie_id`, newest first
    async fn ratings_for_movie(&self, movie_id: MovieId) -> AppResult<Vec<Rating>>;

    /// The user's own review of `movie_id`, if any
    async fn rating_for_user_movie(
        &self,
        user_id: Uuid,
        movie_id: MovieId,
    ) -> AppResult<Option<Rating>>;

    /// Inserts a rating; `Conflict` if the user already reviewed the movie,
    /// `NotFound` if the user does not exist
    async fn create_rating(&self, user_id: Uuid, rating: NewRating) -> AppResult<Rating>;

    /// `NotFound` if absent, `Forbidden` if owned by another user
    async fn update_rating(
        &self,
        user_id: Uuid,
        rating_id: Uuid,
        update: RatingUpdate,
    ) -> AppResult<Rating>;

    /// Same ownership rules as `update_rating`
    async fn delete_rating(&self, user_id: Uuid, rating_id: Uuid) -> AppResult<()>;
}

/// User profile data: watched list and declared genre preferences
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ProfileStore: Send + Sync {
    /// `NotFound` if the user does not exist
    async fn user_profile(&self, user_id: Uuid) -> AppResult<UserProfile>;

    /// Idempotent append; returns the full watched list
    async fn mark_watched(&self, user_id: Uuid, movie_id: MovieId) -> AppResult<Vec<MovieId>>;

    /// Replaces declared favorite genres; returns the stored list
    async fn set_favorite_genres(
        &self,
        user_id: Uuid,
        genre_ids: Vec<GenreId>,
    ) -> AppResult<Vec<GenreId>>;
}

/// Favorite markers (set membership per user)
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait FavoriteStore: Send + Sync {
    /// Newest first; `NotFound` if the user does not exist
    async fn favorite_movie_ids(&self, user_id: Uuid) -> AppResult<Vec<MovieId>>;

    async fn is_favorite(&self, user_id: Uuid, movie_id: MovieId) -> AppResult<bool>;

    /// `Conflict` if the movie is already a favorite, `NotFound` if the user
    /// does not exist
    async fn add_favorite(&self, user_id: Uuid, movie_id: MovieId) -> AppResult<()>;

    /// `NotFound` if the movie was not a favorite
    async fn remove_favorite(&self, user_id: Uuid, movie_id: MovieId) -> AppResult<()>;
}
