use std::sync::Arc;

use super::{or_empty, Lookup, RecommendationSettings, SeenSet};
use crate::models::{DiscoverQuery, DiscoverSort, GenreId, MovieId, MovieSummary};
use crate::services::providers::CatalogProvider;

/// Content-based candidates: catalog similarity for the first few high-rated
/// movies, then top-rated movies in the user's favorite genres.
///
/// Every lookup runs as its own task and is best-effort. A failed lookup adds
/// nothing and never fails the request. Output order is seed order, then genre
/// discovery order.
pub async fn content_candidates(
    catalog: Arc<dyn CatalogProvider>,
    high_rated: &[MovieId],
    favorite_genres: &[GenreId],
    seen: &SeenSet,
    settings: &RecommendationSettings,
) -> Vec<MovieId> {
    let similarity_tasks: Vec<_> = high_rated
        .iter()
        .take(settings.similarity_seeds)
        .map(|&seed| {
            let catalog = catalog.clone();
            let task = tokio::spawn(async move { catalog.similar_movies(seed).await });
            (seed, task)
        })
        .collect();

    let genre_task = if favorite_genres.is_empty() {
        None
    } else {
        let query = DiscoverQuery {
            genre_ids: favorite_genres.to_vec(),
            sort_by: DiscoverSort::VoteAverageDesc,
            min_vote_count: settings.min_vote_count,
        };
        let catalog = catalog.clone();
        Some(tokio::spawn(async move {
            catalog.discover_by_genres(&query).await
        }))
    };

    let mut candidates = Vec::new();

    for (seed, task) in similarity_tasks {
        let similar = or_empty(Lookup::Similar(seed), task.await);
        candidates.extend(take_unseen(&similar, seen, settings.similar_per_seed));
    }

    if let Some(task) = genre_task {
        let discovered = or_empty(Lookup::Discover, task.await);
        candidates.extend(take_unseen(&discovered, seen, settings.genre_limit));
    }

    candidates
}

/// First `limit` unseen ids, filtering before truncating
fn take_unseen(movies: &[MovieSummary], seen: &SeenSet, limit: usize) -> Vec<MovieId> {
    seen.unseen(movies.iter().map(|m| m.id)).take(limit).collect()
}
