use std::collections::HashSet;

use crate::models::MovieId;

/// Unions collaborative and content candidates, deduplicates and truncates.
///
/// Order is first occurrence across `collaborative` followed by `content`, so a
/// fixed input always yields the same output. No source is weighted above the
/// other beyond that ordering.
pub fn hybrid_merge(
    collaborative: &[MovieId],
    content: &[MovieId],
    max_results: usize,
) -> Vec<MovieId> {
    let mut seen = HashSet::new();
    collaborative
        .iter()
        .chain(content)
        .copied()
        .filter(|id| seen.insert(*id))
        .take(max_results)
        .collect()
}
