use std::collections::HashSet;

use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{MovieId, Rating, UserProfile},
    services::store::{FavoriteStore, ProfileStore, RatingStore},
};

/// Everything the pipeline reads about the requesting user
#[derive(Debug, Clone)]
pub struct UserInputs {
    /// The user's ratings in store order
    pub ratings: Vec<Rating>,
    pub profile: UserProfile,
    pub favorites: Vec<MovieId>,
}

impl UserInputs {
    /// Fetches ratings, profile and favorites concurrently.
    ///
    /// Any failure is returned as-is: without all three the engine cannot tell
    /// which movies to exclude.
    pub async fn fetch(
        ratings: &dyn RatingStore,
        profiles: &dyn ProfileStore,
        favorites: &dyn FavoriteStore,
        user_id: Uuid,
    ) -> AppResult<Self> {
        let (ratings, profile, favorites) = tokio::try_join!(
            ratings.ratings_by_user(user_id),
            profiles.user_profile(user_id),
            favorites.favorite_movie_ids(user_id),
        )?;

        Ok(Self {
            ratings,
            profile,
            favorites,
        })
    }

    /// Movies rated at or above `threshold`, in store order
    pub fn high_rated_movies(&self, threshold: i16) -> Vec<MovieId> {
        self.ratings
            .iter()
            .filter(|r| r.is_high(threshold))
            .map(|r| r.movie_id)
            .collect()
    }
}

/// Movies the user has already rated, watched, or favorited
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeenSet(HashSet<MovieId>);

impl SeenSet {
    pub fn from_inputs(inputs: &UserInputs) -> Self {
        let seen = inputs
            .ratings
            .iter()
            .map(|r| r.movie_id)
            .chain(inputs.profile.watched_movies.iter().copied())
            .chain(inputs.favorites.iter().copied())
            .collect();
        Self(seen)
    }

    pub fn contains(&self, movie_id: MovieId) -> bool {
        self.0.contains(&movie_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Drops seen movies, keeping the order of the rest
    pub fn unseen<'a, I>(&'a self, movie_ids: I) -> impl Iterator<Item = MovieId> + 'a
    where
        I: IntoIterator<Item = MovieId>,
        I::IntoIter: 'a,
    {
        movie_ids.into_iter().filter(move |id| !self.contains(*id))
    }
}

impl FromIterator<MovieId> for SeenSet {
    fn from_iter<T: IntoIterator<Item = MovieId>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
