//! Personalized recommendation engine
//!
//! A stateless per-request pipeline:
//!
//! ```text
//! fetch inputs → seen-set → { neighbors → collaborative candidates }
//!                           { similarity + genre discovery          } → merge → hydrate
//! ```
//!
//! Store reads are fatal on failure; every catalog call is best-effort and
//! degrades to an empty contribution. The hybrid blend is plain concatenation
//! (collaborative first), deduplication and truncation. There is no weighting
//! between the two sources.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinError;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{MovieId, RecommendationResponse},
    services::{
        providers::CatalogProvider,
        store::{FavoriteStore, ProfileStore, RatingStore},
    },
};

pub mod collaborative;
pub mod content;
pub mod hydrate;
pub mod merge;
pub mod seen;

pub use seen::{SeenSet, UserInputs};

/// Tunable parameters of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendationSettings {
    /// Ratings at or above this score (1-10) count as high-rated
    pub high_rating_threshold: i16,
    /// Neighbors kept after ranking by overlap
    pub neighbor_limit: usize,
    /// High-rated movies used as similarity seeds, in store order
    pub similarity_seeds: usize,
    /// Unseen similar movies taken per seed
    pub similar_per_seed: usize,
    /// Unseen movies taken from genre discovery
    pub genre_limit: usize,
    /// Vote-count floor applied to genre discovery
    pub min_vote_count: u32,
    /// Maximum number of merged candidates
    pub max_results: usize,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            high_rating_threshold: 4,
            neighbor_limit: 5,
            similarity_seeds: 3,
            similar_per_seed: 5,
            genre_limit: 10,
            min_vote_count: 100,
            max_results: 20,
        }
    }
}

/// Hybrid collaborative + content recommender
#[derive(Clone)]
pub struct RecommendationEngine {
    ratings: Arc<dyn RatingStore>,
    profiles: Arc<dyn ProfileStore>,
    favorites: Arc<dyn FavoriteStore>,
    catalog: Arc<dyn CatalogProvider>,
    settings: RecommendationSettings,
}

impl RecommendationEngine {
    pub fn new(
        ratings: Arc<dyn RatingStore>,
        profiles: Arc<dyn ProfileStore>,
        favorites: Arc<dyn FavoriteStore>,
        catalog: Arc<dyn CatalogProvider>,
        settings: RecommendationSettings,
    ) -> Self {
        Self {
            ratings,
            profiles,
            favorites,
            catalog,
            settings,
        }
    }

    /// Movies the user has rated, watched, or favorited
    pub async fn seen_set(&self, user_id: Uuid) -> AppResult<SeenSet> {
        let inputs = self.fetch_inputs(user_id).await?;
        Ok(SeenSet::from_inputs(&inputs))
    }

    async fn fetch_inputs(&self, user_id: Uuid) -> AppResult<UserInputs> {
        UserInputs::fetch(
            self.ratings.as_ref(),
            self.profiles.as_ref(),
            self.favorites.as_ref(),
            user_id,
        )
        .await
    }

    /// Candidate ids before hydration, in merged order
    pub async fn candidate_ids(&self, user_id: Uuid) -> AppResult<Vec<MovieId>> {
        let inputs = self.fetch_inputs(user_id).await?;
        let seen = SeenSet::from_inputs(&inputs);
        let high_rated = inputs.high_rated_movies(self.settings.high_rating_threshold);

        let (collaborative, content) = tokio::join!(
            self.collaborative_branch(user_id, &high_rated, &seen),
            content::content_candidates(
                self.catalog.clone(),
                &high_rated,
                &inputs.profile.favorite_genres,
                &seen,
                &self.settings,
            ),
        );
        let collaborative = collaborative?;

        let merged = merge::hybrid_merge(&collaborative, &content, self.settings.max_results);

        tracing::info!(
            user_id = %user_id,
            seen = seen.len(),
            high_rated = high_rated.len(),
            collaborative = collaborative.len(),
            content = content.len(),
            merged = merged.len(),
            "Recommendation candidates generated"
        );

        Ok(merged)
    }

    async fn collaborative_branch(
        &self,
        user_id: Uuid,
        high_rated: &[MovieId],
        seen: &SeenSet,
    ) -> AppResult<Vec<MovieId>> {
        let neighbors =
            collaborative::find_neighbors(self.ratings.as_ref(), user_id, high_rated, &self.settings)
                .await?;

        collaborative::collaborative_candidates(
            self.ratings.as_ref(),
            &neighbors,
            seen,
            self.settings.high_rating_threshold,
        )
        .await
    }

    /// Full pipeline: candidates hydrated into display metadata
    pub async fn recommend(&self, user_id: Uuid) -> AppResult<RecommendationResponse> {
        let start = Instant::now();

        let candidates = self.candidate_ids(user_id).await?;
        let results = hydrate::hydrate(self.catalog.clone(), &candidates).await;

        tracing::info!(
            user_id = %user_id,
            candidates = candidates.len(),
            hydrated = results.len(),
            provider = self.catalog.name(),
            processing_time_ms = start.elapsed().as_millis(),
            "Personalized recommendations completed"
        );

        Ok(RecommendationResponse::new(results))
    }
}

/// Best-effort catalog call that failed or panicked
#[derive(Debug, Clone, Copy)]
pub(crate) enum Lookup {
    Similar(MovieId),
    Discover,
    Details(MovieId),
}

impl Display for Lookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Lookup::Similar(id) => write!(f, "similar:{}", id),
            Lookup::Discover => write!(f, "discover"),
            Lookup::Details(id) => write!(f, "details:{}", id),
        }
    }
}

/// Collapses the outcome of a spawned catalog call into its value, or the empty
/// value when the call errored or its task did not complete.
pub(crate) fn or_empty<T: Default>(lookup: Lookup, outcome: Result<AppResult<T>, JoinError>) -> T {
    match outcome {
        Ok(Ok(value)) => value,
        Ok(Err(e)) => {
            tracing::warn!(lookup = %lookup, error = %e, "Catalog lookup failed, contributing nothing");
            T::default()
        }
        Err(e) => {
            tracing::error!(lookup = %lookup, error = %e, "Catalog lookup task join error");
            T::default()
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{details, rating, summaries};
    use super::*;
    use crate::error::AppError;
    use crate::models::{MovieDetails, UserProfile};
    use crate::services::providers::MockCatalogProvider;
    use crate::services::store::{MockFavoriteStore, MockProfileStore, MockRatingStore};

    fn profile(user_id: Uuid, watched: Vec<MovieId>, genres: Vec<i32>) -> UserProfile {
        UserProfile {
            id: user_id,
            watched_movies: watched,
            favorite_genres: genres,
        }
    }

    fn engine(
        ratings: MockRatingStore,
        profiles: MockProfileStore,
        favorites: MockFavoriteStore,
        catalog: MockCatalogProvider,
    ) -> RecommendationEngine {
        RecommendationEngine::new(
            Arc::new(ratings),
            Arc::new(profiles),
            Arc::new(favorites),
            Arc::new(catalog),
            RecommendationSettings::default(),
        )
    }

    fn catalog_with_details() -> MockCatalogProvider {
        let mut catalog = MockCatalogProvider::new();
        catalog
            .expect_movie_details()
            .returning(|id| Ok(details(id)));
        catalog.expect_name().return_const("mock");
        catalog
    }

    #[tokio::test]
    async fn test_new_user_gets_empty_result() {
        let user = Uuid::new_v4();

        let mut ratings = MockRatingStore::new();
        ratings.expect_ratings_by_user().returning(|_| Ok(vec![]));
        ratings.expect_high_ratings_for_movies().never();
        ratings.expect_high_ratings_by_users().never();

        let mut profiles = MockProfileStore::new();
        profiles
            .expect_user_profile()
            .returning(move |_| Ok(profile(user, vec![], vec![])));

        let mut favorites = MockFavoriteStore::new();
        favorites.expect_favorite_movie_ids().returning(|_| Ok(vec![]));

        let mut catalog = MockCatalogProvider::new();
        catalog.expect_similar_movies().never();
        catalog.expect_discover_by_genres().never();
        catalog.expect_movie_details().never();
        catalog.expect_name().return_const("mock");

        let engine = engine(ratings, profiles, favorites, catalog);

        assert!(engine.seen_set(user).await.unwrap().is_empty());
        let response = engine.recommend(user).await.unwrap();
        assert!(response.results.is_empty());
        assert_eq!(response.total_results, 0);
    }

    #[tokio::test]
    async fn test_favorites_only_user_gets_empty_result() {
        let user = Uuid::new_v4();

        let mut ratings = MockRatingStore::new();
        ratings.expect_ratings_by_user().returning(|_| Ok(vec![]));
        ratings.expect_high_ratings_for_movies().never();

        let mut profiles = MockProfileStore::new();
        profiles
            .expect_user_profile()
            .returning(move |_| Ok(profile(user, vec![], vec![])));

        let mut favorites = MockFavoriteStore::new();
        favorites
            .expect_favorite_movie_ids()
            .returning(|_| Ok(vec![550, 680]));

        let mut catalog = MockCatalogProvider::new();
        catalog.expect_similar_movies().never();
        catalog.expect_discover_by_genres().never();
        catalog.expect_name().return_const("mock");

        let engine = engine(ratings, profiles, favorites, catalog);

        let seen = engine.seen_set(user).await.unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen.contains(550) && seen.contains(680));

        let response = engine.recommend(user).await.unwrap();
        assert_eq!(response.total_results, 0);
    }

    #[tokio::test]
    async fn test_only_high_rated_movies_seed_both_branches() {
        let user = Uuid::new_v4();
        let neighbor = Uuid::new_v4();

        let mut ratings = MockRatingStore::new();
        ratings
            .expect_ratings_by_user()
            .returning(move |u| Ok(vec![rating(u, 10, 5, 0), rating(u, 20, 3, 1)]));
        ratings
            .expect_high_ratings_for_movies()
            .withf(move |ids, min, exclude| ids.to_vec() == vec![10] && *min == 4 && *exclude == user)
            .times(1)
            .returning(move |_, _, _| Ok(vec![rating(neighbor, 10, 9, 2)]));
        ratings
            .expect_high_ratings_by_users()
            .times(1)
            .returning(move |_, _| Ok(vec![rating(neighbor, 10, 9, 2), rating(neighbor, 30, 8, 3)]));

        let mut profiles = MockProfileStore::new();
        profiles
            .expect_user_profile()
            .returning(move |_| Ok(profile(user, vec![], vec![])));

        let mut favorites = MockFavoriteStore::new();
        favorites.expect_favorite_movie_ids().returning(|_| Ok(vec![]));

        let mut catalog = catalog_with_details();
        catalog
            .expect_similar_movies()
            .withf(|id| *id == 10)
            .times(1)
            .returning(|_| Ok(summaries(&[20, 40])));

        let engine = engine(ratings, profiles, favorites, catalog);

        let seen = engine.seen_set(user).await.unwrap();
        assert!(seen.contains(20));

        let candidates = engine.candidate_ids(user).await.unwrap();
        assert_eq!(candidates, vec![30, 40]);
    }

    #[tokio::test]
    async fn test_seen_movies_never_recommended_and_results_capped() {
        let user = Uuid::new_v4();
        let neighbors: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();

        let mut ratings = MockRatingStore::new();
        ratings
            .expect_ratings_by_user()
            .returning(move |u| Ok(vec![rating(u, 1, 9, 0), rating(u, 2, 8, 1)]));
        let overlap_rows = neighbors.clone();
        ratings.expect_high_ratings_for_movies().returning(move |_, _, _| {
            Ok(overlap_rows
                .iter()
                .enumerate()
                .map(|(i, n)| rating(*n, 1, 8, i as i64))
                .collect())
        });
        let neighbor_rows = neighbors.clone();
        ratings.expect_high_ratings_by_users().returning(move |_, _| {
            // neighbor i rates 100+2i .. 100+2i+3: 50% overlap with neighbor i+1
            Ok(neighbor_rows
                .iter()
                .enumerate()
                .flat_map(|(i, n)| {
                    let base = 100 + 2 * i as MovieId;
                    (0..4).map(move |k| rating(*n, base + k, 7, k))
                })
                .collect())
        });

        let mut profiles = MockProfileStore::new();
        profiles
            .expect_user_profile()
            .returning(move |_| Ok(profile(user, vec![100, 101], vec![28])));

        let mut favorites = MockFavoriteStore::new();
        favorites.expect_favorite_movie_ids().returning(|_| Ok(vec![102]));

        let mut catalog = catalog_with_details();
        catalog
            .expect_similar_movies()
            .returning(|id| Ok(summaries(&[200 + id, 210 + id, 220 + id, 230 + id, 240 + id, 250 + id])));
        catalog
            .expect_discover_by_genres()
            .returning(|_| Ok(summaries(&(300..320).collect::<Vec<_>>())));

        let engine = engine(ratings, profiles, favorites, catalog);
        let response = engine.recommend(user).await.unwrap();

        assert_eq!(response.total_results, 20);
        assert_eq!(response.results.len(), 20);

        let ids: Vec<MovieId> = response.results.iter().map(|m| m.id).collect();
        for seen in [1, 2, 100, 101, 102] {
            assert!(!ids.contains(&seen), "seen movie {} recommended", seen);
        }

        // Collaborative unique remainder comes first: 103..=111
        assert_eq!(&ids[..9], &[103, 104, 105, 106, 107, 108, 109, 110, 111]);
        let mut deduped = ids.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(deduped.len(), ids.len());
    }

    #[tokio::test]
    async fn test_failed_similarity_lookup_degrades() {
        let user = Uuid::new_v4();

        let mut ratings = MockRatingStore::new();
        ratings.expect_ratings_by_user().returning(move |u| {
            Ok(vec![rating(u, 1, 9, 0), rating(u, 2, 9, 1), rating(u, 3, 9, 2)])
        });
        ratings
            .expect_high_ratings_for_movies()
            .returning(|_, _, _| Ok(vec![]));
        ratings.expect_high_ratings_by_users().never();

        let mut profiles = MockProfileStore::new();
        profiles
            .expect_user_profile()
            .returning(move |_| Ok(profile(user, vec![], vec![])));

        let mut favorites = MockFavoriteStore::new();
        favorites.expect_favorite_movie_ids().returning(|_| Ok(vec![]));

        let mut catalog = catalog_with_details();
        catalog.expect_similar_movies().returning(|id| match id {
            2 => Err(AppError::ExternalApi("TMDB API returned status 500".to_string())),
            _ => Ok(summaries(&[id * 10])),
        });

        let engine = engine(ratings, profiles, favorites, catalog);
        let response = engine.recommend(user).await.unwrap();

        let ids: Vec<MovieId> = response.results.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![10, 30]);
    }

    #[tokio::test]
    async fn test_profile_failure_is_fatal() {
        let user = Uuid::new_v4();

        let mut ratings = MockRatingStore::new();
        ratings.expect_ratings_by_user().returning(|_| Ok(vec![]));

        let mut profiles = MockProfileStore::new();
        profiles
            .expect_user_profile()
            .returning(|_| Err(AppError::NotFound("User not found".to_string())));

        let mut favorites = MockFavoriteStore::new();
        favorites.expect_favorite_movie_ids().returning(|_| Ok(vec![]));

        let mut catalog = MockCatalogProvider::new();
        catalog.expect_movie_details().never();

        let engine = engine(ratings, profiles, favorites, catalog);
        let result = engine.recommend(user).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_identical_inputs_give_identical_output() {
        let user = Uuid::new_v4();

        let mut ratings = MockRatingStore::new();
        ratings
            .expect_ratings_by_user()
            .returning(move |u| Ok(vec![rating(u, 1, 9, 0)]));
        ratings
            .expect_high_ratings_for_movies()
            .returning(|_, _, _| Ok(vec![]));

        let mut profiles = MockProfileStore::new();
        profiles
            .expect_user_profile()
            .returning(move |_| Ok(profile(user, vec![], vec![18])));

        let mut favorites = MockFavoriteStore::new();
        favorites.expect_favorite_movie_ids().returning(|_| Ok(vec![]));

        let mut catalog = catalog_with_details();
        catalog
            .expect_similar_movies()
            .returning(|_| Ok(summaries(&[7, 8, 9])));
        catalog
            .expect_discover_by_genres()
            .returning(|_| Ok(summaries(&[9, 5, 7, 4])));

        let engine = engine(ratings, profiles, favorites, catalog);
        let first: Vec<MovieDetails> = engine.recommend(user).await.unwrap().results;
        let second: Vec<MovieDetails> = engine.recommend(user).await.unwrap().results;

        assert_eq!(first, second);
        let ids: Vec<MovieId> = first.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![7, 8, 9, 5, 4]);
    }

    #[test]
    fn test_default_settings() {
        let settings = RecommendationSettings::default();
        assert_eq!(settings.high_rating_threshold, 4);
        assert_eq!(settings.neighbor_limit, 5);
        assert_eq!(settings.similarity_seeds, 3);
        assert_eq!(settings.similar_per_seed, 5);
        assert_eq!(settings.genre_limit, 10);
        assert_eq!(settings.min_vote_count, 100);
        assert_eq!(settings.max_results, 20);
    }

    #[test]
    fn test_or_empty_degrades_errors() {
        let failed: Vec<MovieId> = or_empty(
            Lookup::Similar(1),
            Ok(Err(AppError::ExternalApi("boom".to_string()))),
        );
        assert!(failed.is_empty());

        let ok: Vec<MovieId> = or_empty(Lookup::Discover, Ok(Ok(vec![3])));
        assert_eq!(ok, vec![3]);
    }

    #[test]
    fn test_lookup_display() {
        assert_eq!(Lookup::Similar(5).to_string(), "similar:5");
        assert_eq!(Lookup::Discover.to_string(), "discover");
        assert_eq!(Lookup::Details(9).to_string(), "details:9");
    }
}
