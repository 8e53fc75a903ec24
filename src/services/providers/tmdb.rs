//! TMDB catalog provider
//!
//! API Flow:
//! 1. Similarity: /movie/{id}/similar → paged list of movie summaries
//! 2. Discovery: /discover/movie?with_genres=..&sort_by=..&vote_count.gte=.. → paged list
//! 3. Details: /movie/{id} → full display metadata (cached in Redis)
//!
//! Authenticates with the v3 `api_key` query parameter.

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{DiscoverQuery, MovieDetails, MovieId, MovieSummary, PagedResponse},
    services::providers::CatalogProvider,
};
use reqwest::{Client as HttpClient, Response, StatusCode};
use serde::de::DeserializeOwned;

const DETAILS_CACHE_TTL: u64 = 3600; // 1 hour

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Cache,
}

impl TmdbProvider {
    pub fn new(cache: Cache, api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            cache,
        }
    }

    /// Issues a GET against the catalog and decodes the JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .send()
            .await?;

        let response = Self::check_status(path, response).await?;

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                path = %path,
                "Failed to deserialize TMDB response"
            );
            AppError::ExternalApi(format!("Failed to parse TMDB response: {}", e))
        })
    }

    async fn check_status(path: &str, response: Response) -> AppResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("TMDB resource {}", path)));
        }

        tracing::warn!(
            path = %path,
            status = %status,
            body = %body,
            "TMDB request failed"
        );
        Err(AppError::ExternalApi(format!(
            "TMDB API returned status {}: {}",
            status, body
        )))
    }
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbProvider {
    async fn similar_movies(&self, movie_id: MovieId) -> AppResult<Vec<MovieSummary>> {
        let path = format!("/movie/{}/similar", movie_id);
        let page: PagedResponse<MovieSummary> = self.get_json(&path, &[]).await?;

        tracing::debug!(
            movie_id,
            results = page.results.len(),
            provider = "tmdb",
            "Similar movies fetched"
        );

        Ok(page.results)
    }

    async fn discover_by_genres(&self, query: &DiscoverQuery) -> AppResult<Vec<MovieSummary>> {
        if query.genre_ids.is_empty() {
            return Err(AppError::InvalidInput(
                "Genre discovery requires at least one genre".to_string(),
            ));
        }

        let params = [
            ("with_genres", query.genres_param()),
            ("sort_by", query.sort_by.to_string()),
            ("vote_count.gte", query.min_vote_count.to_string()),
        ];
        let page: PagedResponse<MovieSummary> = self.get_json("/discover/movie", &params).await?;

        tracing::debug!(
            genres = %query.genres_param(),
            results = page.results.len(),
            provider = "tmdb",
            "Genre discovery completed"
        );

        Ok(page.results)
    }

    async fn movie_details(&self, movie_id: MovieId) -> AppResult<MovieDetails> {
        cached!(
            self.cache,
            CacheKey::MovieDetails(movie_id),
            DETAILS_CACHE_TTL,
            async move {
                let path = format!("/movie/{}", movie_id);
                self.get_json::<MovieDetails>(&path, &[]).await
            }
        )
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
