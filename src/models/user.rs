use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{GenreId, MovieId};

/// The parts of a user record the recommendation engine reads
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default, sqlx::FromRow)]
pub struct UserProfile {
    pub id: Uuid,
    /// Watched movie ids in the order they were marked
    pub watched_movies: Vec<MovieId>,
    /// Declared favorite genres, possibly empty
    pub favorite_genres: Vec<GenreId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WatchedMovies {
    pub watched_movies: Vec<MovieId>,
}

/// Appends `movie_id` unless it is already present
pub fn append_watched(watched: &mut Vec<MovieId>, movie_id: MovieId) -> bool {
    if watched.contains(&movie_id) {
        return false;
    }
    watched.push(movie_id);
    true
}

/// Removes duplicate genre ids, keeping the first occurrence
pub fn normalize_genres(genre_ids: Vec<GenreId>) -> Vec<GenreId> {
    let mut normalized = Vec::with_capacity(genre_ids.len());
    for id in genre_ids {
        if !normalized.contains(&id) {
            normalized.push(id);
        }
    }
    normalized
}
