pub mod movie;
pub mod rating;
pub mod user;

pub use movie::{
    DiscoverQuery, DiscoverSort, Genre, MovieDetails, MovieSummary, PagedResponse,
    RecommendationResponse,
};
pub use rating::{NewRating, Rating, RatingUpdate};
pub use user::{UserProfile, WatchedMovies};

/// Catalog identifier for a movie (TMDB movie id)
pub type MovieId = i64;

/// Catalog identifier for a genre (TMDB genre id)
pub type GenreId = i32;
