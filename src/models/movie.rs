use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::{GenreId, MovieId};

/// Full display metadata for a movie, as returned by the catalog detail endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetails {
    pub id: MovieId,
    pub title: String,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub vote_count: Option<u32>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
}

/// Movie entry inside a catalog list response (similar, discover)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MovieSummary {
    pub id: MovieId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub vote_count: Option<u32>,
}

/// Paged list envelope used by the catalog list endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct PagedResponse<T> {
    #[serde(default)]
    pub page: u32,
    pub results: Vec<T>,
    #[serde(default)]
    pub total_results: u64,
}

/// Sort order for catalog discovery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoverSort {
    VoteAverageDesc,
}

impl Display for DiscoverSort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscoverSort::VoteAverageDesc => write!(f, "vote_average.desc"),
        }
    }
}

/// Genre-filtered discovery request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoverQuery {
    pub genre_ids: Vec<GenreId>,
    pub sort_by: DiscoverSort,
    pub min_vote_count: u32,
}

impl DiscoverQuery {
    /// Comma-joined genre list in the form the catalog expects
    pub fn genres_param(&self) -> String {
        self.genre_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Personalized recommendation payload returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationResponse {
    pub results: Vec<MovieDetails>,
    pub total_results: usize,
}

impl RecommendationResponse {
    pub fn new(results: Vec<MovieDetails>) -> Self {
        let total_results = results.len();
        Self {
            results,
            total_results,
        }
    }
}
