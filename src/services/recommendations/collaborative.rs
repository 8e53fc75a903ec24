use std::collections::HashMap;

use uuid::Uuid;

use super::{RecommendationSettings, SeenSet};
use crate::{
    error::AppResult,
    models::{MovieId, Rating},
    services::store::RatingStore,
};

/// Another user whose high ratings overlap the requesting user's
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbor {
    pub user_id: Uuid,
    /// Number of the requesting user's high-rated movies this user also rated highly
    pub overlap: usize,
}

/// Finds the users most aligned with `user_id`'s high-rated movies.
///
/// Returns an empty list without touching the store when `high_rated` is empty.
pub async fn find_neighbors(
    store: &dyn RatingStore,
    user_id: Uuid,
    high_rated: &[MovieId],
    settings: &RecommendationSettings,
) -> AppResult<Vec<Neighbor>> {
    if high_rated.is_empty() {
        return Ok(Vec::new());
    }

    let rows = store
        .high_ratings_for_movies(high_rated, settings.high_rating_threshold, user_id)
        .await?;

    let neighbors = rank_neighbors(&rows, user_id, settings.neighbor_limit);

    tracing::debug!(
        user_id = %user_id,
        overlapping_ratings = rows.len(),
        neighbors = neighbors.len(),
        "Neighbors ranked"
    );

    Ok(neighbors)
}

/// Groups overlap rows by user, ranks by overlap descending and keeps `limit`.
///
/// Users are first listed in the order their first row appears, then sorted
/// with a stable sort, so equal overlaps keep store order.
pub fn rank_neighbors(rows: &[Rating], exclude: Uuid, limit: usize) -> Vec<Neighbor> {
    let mut neighbors: Vec<Neighbor> = Vec::new();
    let mut positions: HashMap<Uuid, usize> = HashMap::new();

    for row in rows.iter().filter(|r| r.user_id != exclude) {
        match positions.get(&row.user_id) {
            Some(&pos) => neighbors[pos].overlap += 1,
            None => {
                positions.insert(row.user_id, neighbors.len());
                neighbors.push(Neighbor {
                    user_id: row.user_id,
                    overlap: 1,
                });
            }
        }
    }

    neighbors.sort_by(|a, b| b.overlap.cmp(&a.overlap));
    neighbors.truncate(limit);
    neighbors
}

/// Neighbors' high-rated movies the requesting user has not seen.
///
/// Duplicates across neighbors are kept; the merge step removes them.
pub async fn collaborative_candidates(
    store: &dyn RatingStore,
    neighbors: &[Neighbor],
    seen: &SeenSet,
    threshold: i16,
) -> AppResult<Vec<MovieId>> {
    if neighbors.is_empty() {
        return Ok(Vec::new());
    }

    let neighbor_ids: Vec<Uuid> = neighbors.iter().map(|n| n.user_id).collect();
    let ratings = store.high_ratings_by_users(&neighbor_ids, threshold).await?;

    Ok(seen.unseen(ratings.iter().map(|r| r.movie_id)).collect())
}
