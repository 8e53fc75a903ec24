use std::sync::Arc;

use super::{or_empty, Lookup};
use crate::models::{MovieDetails, MovieId};
use crate::services::providers::CatalogProvider;

/// Resolves candidate ids to display metadata.
///
/// Lookups run concurrently, one task per id. Results come back in candidate
/// order regardless of completion order; ids whose lookup fails are dropped.
pub async fn hydrate(catalog: Arc<dyn CatalogProvider>, candidates: &[MovieId]) -> Vec<MovieDetails> {
    let tasks: Vec<_> = candidates
        .iter()
        .map(|&movie_id| {
            let catalog = catalog.clone();
            let task = tokio::spawn(async move { catalog.movie_details(movie_id).await.map(Some) });
            (movie_id, task)
        })
        .collect();

    let mut results = Vec::with_capacity(tasks.len());
    for (movie_id, task) in tasks {
        if let Some(details) = or_empty(Lookup::Details(movie_id), task.await) {
            results.push(details);
        }
    }

    if results.len() < candidates.len() {
        tracing::warn!(
            requested = candidates.len(),
            hydrated = results.len(),
            "Partial detail hydration failure"
        );
    }

    results
}
