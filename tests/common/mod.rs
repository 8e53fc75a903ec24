use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum_test::TestServer;
use chrono::Utc;
use uuid::Uuid;

use marquee_api::{
    db::Cache,
    error::{AppError, AppResult},
    models::{
        user::{append_watched, normalize_genres},
        GenreId, MovieId, NewRating, Rating, RatingUpdate, UserProfile,
    },
    routes::{create_router, AppState},
    services::{
        providers::TmdbProvider,
        recommendations::RecommendationSettings,
        store::{FavoriteStore, ProfileStore, RatingStore},
    },
};

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, UserProfile>,
    reviews: Vec<Rating>,
    favorites: Vec<(Uuid, MovieId)>,
}

/// In-memory store honoring the same contracts as the Postgres store
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn add_user(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.inner.lock().unwrap().users.insert(
            id,
            UserProfile {
                id,
                ..Default::default()
            },
        );
        id
    }

    fn require_user(inner: &Inner, user_id: Uuid) -> AppResult<()> {
        if inner.users.contains_key(&user_id) {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("User {} not found", user_id)))
        }
    }

    fn owned_review(inner: &mut Inner, user_id: Uuid, rating_id: Uuid) -> AppResult<usize> {
        let pos = inner
            .reviews
            .iter()
            .position(|r| r.id == rating_id)
            .ok_or_else(|| AppError::NotFound(format!("Review {} not found", rating_id)))?;
        if inner.reviews[pos].user_id != user_id {
            return Err(AppError::Forbidden(
                "Reviews can only be changed by their author".to_string(),
            ));
        }
        Ok(pos)
    }
}

#[async_trait::async_trait]
impl RatingStore for MemoryStore {
    async fn ratings_by_user(&self, user_id: Uuid) -> AppResult<Vec<Rating>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .reviews
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn high_ratings_for_movies(
        &self,
        movie_ids: &[MovieId],
        min_score: i16,
        exclude_user: Uuid,
    ) -> AppResult<Vec<Rating>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .reviews
            .iter()
            .filter(|r| {
                movie_ids.contains(&r.movie_id) && r.rating >= min_score && r.user_id != exclude_user
            })
            .cloned()
            .collect())
    }

    async fn high_ratings_by_users(
        &self,
        user_ids: &[Uuid],
        min_score: i16,
    ) -> AppResult<Vec<Rating>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .reviews
            .iter()
            .filter(|r| user_ids.contains(&r.user_id) && r.rating >= min_score)
            .cloned()
            .collect())
    }

    async fn ratings_for_movie(&self, movie_id: MovieId) -> AppResult<Vec<Rating>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .reviews
            .iter()
            .rev()
            .filter(|r| r.movie_id == movie_id)
            .cloned()
            .collect())
    }

    async fn rating_for_user_movie(
        &self,
        user_id: Uuid,
        movie_id: MovieId,
    ) -> AppResult<Option<Rating>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .reviews
            .iter()
            .find(|r| r.user_id == user_id && r.movie_id == movie_id)
            .cloned())
    }

    async fn create_rating(&self, user_id: Uuid, rating: NewRating) -> AppResult<Rating> {
        let mut inner = self.inner.lock().unwrap();
        Self::require_user(&inner, user_id)?;
        if inner
            .reviews
            .iter()
            .any(|r| r.user_id == user_id && r.movie_id == rating.movie_id)
        {
            return Err(AppError::Conflict(
                "You have already reviewed this movie".to_string(),
            ));
        }

        let now = Utc::now();
        let created = Rating {
            id: Uuid::new_v4(),
            user_id,
            movie_id: rating.movie_id,
            rating: rating.rating,
            content: rating.content,
            created_at: now,
            updated_at: now,
        };
        inner.reviews.push(created.clone());
        Ok(created)
    }

    async fn update_rating(
        &self,
        user_id: Uuid,
        rating_id: Uuid,
        update: RatingUpdate,
    ) -> AppResult<Rating> {
        let mut inner = self.inner.lock().unwrap();
        let pos = Self::owned_review(&mut inner, user_id, rating_id)?;
        let review = &mut inner.reviews[pos];
        review.rating = update.rating;
        review.content = update.content;
        review.updated_at = Utc::now();
        Ok(review.clone())
    }

    async fn delete_rating(&self, user_id: Uuid, rating_id: Uuid) -> AppResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let pos = Self::owned_review(&mut inner, user_id, rating_id)?;
        inner.reviews.remove(pos);
        Ok(())
    }
}

#[async_trait::async_trait]
impl ProfileStore for MemoryStore {
    async fn user_profile(&self, user_id: Uuid) -> AppResult<UserProfile> {
        let inner = self.inner.lock().unwrap();
        inner
            .users
            .get(&user_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
    }

    async fn mark_watched(&self, user_id: Uuid, movie_id: MovieId) -> AppResult<Vec<MovieId>> {
        let mut inner = self.inner.lock().unwrap();
        let profile = inner
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;
        append_watched(&mut profile.watched_movies, movie_id);
        Ok(profile.watched_movies.clone())
    }

    async fn set_favorite_genres(
        &self,
        user_id: Uuid,
        genre_ids: Vec<GenreId>,
    ) -> AppResult<Vec<GenreId>> {
        let mut inner = self.inner.lock().unwrap();
        let profile = inner
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;
        profile.favorite_genres = normalize_genres(genre_ids);
        Ok(profile.favorite_genres.clone())
    }
}

#[async_trait::async_trait]
impl FavoriteStore for MemoryStore {
    async fn favorite_movie_ids(&self, user_id: Uuid) -> AppResult<Vec<MovieId>> {
        let inner = self.inner.lock().unwrap();
        Self::require_user(&inner, user_id)?;
        Ok(inner
            .favorites
            .iter()
            .rev()
            .filter(|(u, _)| *u == user_id)
            .map(|(_, m)| *m)
            .collect())
    }

    async fn is_favorite(&self, user_id: Uuid, movie_id: MovieId) -> AppResult<bool> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.favorites.contains(&(user_id, movie_id)))
    }

    async fn add_favorite(&self, user_id: Uuid, movie_id: MovieId) -> AppResult<()> {
        let mut inner = self.inner.lock().unwrap();
        Self::require_user(&inner, user_id)?;
        if inner.favorites.contains(&(user_id, movie_id)) {
            return Err(AppError::Conflict("Movie already in favorites".to_string()));
        }
        inner.favorites.push((user_id, movie_id));
        Ok(())
    }

    async fn remove_favorite(&self, user_id: Uuid, movie_id: MovieId) -> AppResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.favorites.len();
        inner.favorites.retain(|f| *f != (user_id, movie_id));
        if inner.favorites.len() == before {
            return Err(AppError::NotFound("Favorite not found".to_string()));
        }
        Ok(())
    }
}

/// Router wired to `store` and a TMDB provider pointed at `catalog_url`
pub fn create_test_server(store: Arc<MemoryStore>, catalog_url: &str) -> TestServer {
    let catalog = Arc::new(TmdbProvider::new(
        Cache::disabled(),
        "test_key".to_string(),
        catalog_url.to_string(),
    ));
    let state = AppState::new(
        store.clone(),
        store.clone(),
        store,
        catalog,
        RecommendationSettings::default(),
    );
    TestServer::new(create_router(Arc::new(state))).unwrap()
}
