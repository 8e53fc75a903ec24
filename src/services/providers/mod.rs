//! Movie catalog provider abstraction
//!
//! The engine needs three catalog lookups: item-to-item similarity, genre
//! discovery, and detail hydration. `TmdbProvider` is the production source.

use crate::{
    error::AppResult,
    models::{DiscoverQuery, MovieDetails, MovieId, MovieSummary},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// Trait for movie catalog providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Movies the catalog considers similar to `movie_id`, in catalog order
    async fn similar_movies(&self, movie_id: MovieId) -> AppResult<Vec<MovieSummary>>;

    /// Genre-filtered slice of the catalog, sorted and floored as requested
    async fn discover_by_genres(&self, query: &DiscoverQuery) -> AppResult<Vec<MovieSummary>>;

    /// Full display metadata; `NotFound` when the catalog has no such movie
    async fn movie_details(&self, movie_id: MovieId) -> AppResult<MovieDetails>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
