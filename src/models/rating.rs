use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::MovieId;
use crate::error::{AppError, AppResult};

pub const MIN_SCORE: i16 = 1;
pub const MAX_SCORE: i16 = 10;
const MIN_CONTENT_LEN: usize = 10;
const MAX_CONTENT_LEN: usize = 1000;

/// A user's review of a movie. One per (user, movie) pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Rating {
    pub id: Uuid,
    pub user_id: Uuid,
    pub movie_id: MovieId,
    /// Score on the 1-10 scale
    pub rating: i16,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Rating {
    pub fn is_high(&self, threshold: i16) -> bool {
        self.rating >= threshold
    }
}

/// Review submission body
#[derive(Debug, Clone, Deserialize)]
pub struct NewRating {
    pub movie_id: MovieId,
    pub rating: i16,
    pub content: String,
}

/// Review edit body
#[derive(Debug, Clone, Deserialize)]
pub struct RatingUpdate {
    pub rating: i16,
    pub content: String,
}

impl NewRating {
    /// Checks score range and content length, trimming the content
    pub fn validated(self) -> AppResult<Self> {
        Ok(Self {
            movie_id: self.movie_id,
            rating: validate_score(self.rating)?,
            content: validate_content(&self.content)?,
        })
    }
}

impl RatingUpdate {
    pub fn validated(self) -> AppResult<Self> {
        Ok(Self {
            rating: validate_score(self.rating)?,
            content: validate_content(&self.content)?,
        })
    }
}

fn validate_score(score: i16) -> AppResult<i16> {
    if (MIN_SCORE..=MAX_SCORE).contains(&score) {
        Ok(score)
    } else {
        Err(AppError::InvalidInput(format!(
            "Rating must be between {} and {}",
            MIN_SCORE, MAX_SCORE
        )))
    }
}

fn validate_content(content: &str) -> AppResult<String> {
    let trimmed = content.trim();
    let len = trimmed.chars().count();
    if !(MIN_CONTENT_LEN..=MAX_CONTENT_LEN).contains(&len) {
        return Err(AppError::InvalidInput(format!(
            "Review content must be between {} and {} characters",
            MIN_CONTENT_LEN, MAX_CONTENT_LEN
        )));
    }
    Ok(trimmed.to_string())
}
