use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        user::{append_watched, normalize_genres},
        GenreId, MovieId, NewRating, Rating, RatingUpdate, UserProfile,
    },
    services::store::{FavoriteStore, ProfileStore, RatingStore},
};

/// Creates a PostgreSQL connection pool
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the migrations embedded from `migrations/`
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

fn user_not_found(user_id: Uuid) -> AppError {
    AppError::NotFound(format!("User {} not found", user_id))
}

const RATING_COLUMNS: &str = "id, user_id, movie_id, rating, content, created_at, updated_at";

/// Postgres-backed implementation of the rating, profile and favorite stores
///
/// Rating queries order by `(created_at, id)` so callers see a stable store order.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn rating_owner(&self, rating_id: Uuid) -> AppResult<Uuid> {
        let owner: Option<Uuid> = sqlx::query_scalar("SELECT user_id FROM reviews WHERE id = $1")
            .bind(rating_id)
            .fetch_optional(&self.pool)
            .await?;

        owner.ok_or_else(|| AppError::NotFound(format!("Review {} not found", rating_id)))
    }

    async fn ensure_user(&self, user_id: Uuid) -> AppResult<()> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        if !exists {
            return Err(user_not_found(user_id));
        }
        Ok(())
    }

    async fn ensure_owner(&self, user_id: Uuid, rating_id: Uuid) -> AppResult<()> {
        if self.rating_owner(rating_id).await? != user_id {
            return Err(AppError::Forbidden(
                "Reviews can only be changed by their author".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl RatingStore for PgStore {
    async fn ratings_by_user(&self, user_id: Uuid) -> AppResult<Vec<Rating>> {
        let sql = format!(
            "SELECT {} FROM reviews WHERE user_id = $1 ORDER BY created_at, id",
            RATING_COLUMNS
        );
        let ratings = sqlx::query_as::<_, Rating>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(ratings)
    }

    async fn high_ratings_for_movies(
        &self,
        movie_ids: &[MovieId],
        min_score: i16,
        exclude_user: Uuid,
    ) -> AppResult<Vec<Rating>> {
        let sql = format!(
            "SELECT {} FROM reviews \
             WHERE movie_id = ANY($1) AND rating >= $2 AND user_id <> $3 \
             ORDER BY created_at, id",
            RATING_COLUMNS
        );
        let ratings = sqlx::query_as::<_, Rating>(&sql)
            .bind(movie_ids)
            .bind(min_score)
            .bind(exclude_user)
            .fetch_all(&self.pool)
            .await?;
        Ok(ratings)
    }

    async fn high_ratings_by_users(
        &self,
        user_ids: &[Uuid],
        min_score: i16,
    ) -> AppResult<Vec<Rating>> {
        let sql = format!(
            "SELECT {} FROM reviews \
             WHERE user_id = ANY($1) AND rating >= $2 \
             ORDER BY created_at, id",
            RATING_COLUMNS
        );
        let ratings = sqlx::query_as::<_, Rating>(&sql)
            .bind(user_ids)
            .bind(min_score)
            .fetch_all(&self.pool)
            .await?;
        Ok(ratings)
    }

    async fn ratings_for_movie(&self, movie_id: MovieId) -> AppResult<Vec<Rating>> {
        let sql = format!(
            "SELECT {} FROM reviews WHERE movie_id = $1 ORDER BY created_at DESC, id DESC",
            RATING_COLUMNS
        );
        let ratings = sqlx::query_as::<_, Rating>(&sql)
            .bind(movie_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(ratings)
    }

    async fn rating_for_user_movie(
        &self,
        user_id: Uuid,
        movie_id: MovieId,
    ) -> AppResult<Option<Rating>> {
        let sql = format!(
            "SELECT {} FROM reviews WHERE user_id = $1 AND movie_id = $2",
            RATING_COLUMNS
        );
        let rating = sqlx::query_as::<_, Rating>(&sql)
            .bind(user_id)
            .bind(movie_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(rating)
    }

    async fn create_rating(&self, user_id: Uuid, rating: NewRating) -> AppResult<Rating> {
        let sql = format!(
            "INSERT INTO reviews (id, user_id, movie_id, rating, content) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            RATING_COLUMNS
        );
        let created = sqlx::query_as::<_, Rating>(&sql)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(rating.movie_id)
            .bind(rating.rating)
            .bind(&rating.content)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match AppError::from(e) {
                AppError::Conflict(_) => {
                    AppError::Conflict("You have already reviewed this movie".to_string())
                }
                AppError::NotFound(_) => user_not_found(user_id),
                other => other,
            })?;

        tracing::info!(
            user_id = %user_id,
            movie_id = created.movie_id,
            rating = created.rating,
            "Review created"
        );

        Ok(created)
    }

    async fn update_rating(
        &self,
        user_id: Uuid,
        rating_id: Uuid,
        update: RatingUpdate,
    ) -> AppResult<Rating> {
        self.ensure_owner(user_id, rating_id).await?;

        let sql = format!(
            "UPDATE reviews SET rating = $1, content = $2, updated_at = NOW() \
             WHERE id = $3 RETURNING {}",
            RATING_COLUMNS
        );
        let updated = sqlx::query_as::<_, Rating>(&sql)
            .bind(update.rating)
            .bind(&update.content)
            .bind(rating_id)
            .fetch_optional(&self.pool)
            .await?;

        updated.ok_or_else(|| AppError::NotFound(format!("Review {} not found", rating_id)))
    }

    async fn delete_rating(&self, user_id: Uuid, rating_id: Uuid) -> AppResult<()> {
        self.ensure_owner(user_id, rating_id).await?;

        sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(rating_id)
            .execute(&self.pool)
            .await?;

        tracing::info!(user_id = %user_id, rating_id = %rating_id, "Review deleted");
        Ok(())
    }
}

#[async_trait::async_trait]
impl ProfileStore for PgStore {
    async fn user_profile(&self, user_id: Uuid) -> AppResult<UserProfile> {
        let profile = sqlx::query_as::<_, UserProfile>(
            "SELECT id, watched_movies, favorite_genres FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        profile.ok_or_else(|| user_not_found(user_id))
    }

    async fn mark_watched(&self, user_id: Uuid, movie_id: MovieId) -> AppResult<Vec<MovieId>> {
        let mut tx = self.pool.begin().await?;

        let watched: Option<Vec<MovieId>> =
            sqlx::query_scalar("SELECT watched_movies FROM users WHERE id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
        let mut watched = watched.ok_or_else(|| user_not_found(user_id))?;

        if append_watched(&mut watched, movie_id) {
            sqlx::query("UPDATE users SET watched_movies = $1 WHERE id = $2")
                .bind(&watched)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(watched)
    }

    async fn set_favorite_genres(
        &self,
        user_id: Uuid,
        genre_ids: Vec<GenreId>,
    ) -> AppResult<Vec<GenreId>> {
        let genres = normalize_genres(genre_ids);

        let stored: Option<Vec<GenreId>> = sqlx::query_scalar(
            "UPDATE users SET favorite_genres = $1 WHERE id = $2 RETURNING favorite_genres",
        )
        .bind(&genres)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        stored.ok_or_else(|| user_not_found(user_id))
    }
}

#[async_trait::async_trait]
impl FavoriteStore for PgStore {
    async fn favorite_movie_ids(&self, user_id: Uuid) -> AppResult<Vec<MovieId>> {
        self.ensure_user(user_id).await?;

        let ids = sqlx::query_scalar(
            "SELECT movie_id FROM favorites WHERE user_id = $1 \
             ORDER BY created_at DESC, movie_id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn is_favorite(&self, user_id: Uuid, movie_id: MovieId) -> AppResult<bool> {
        let found: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM favorites WHERE user_id = $1 AND movie_id = $2)",
        )
        .bind(user_id)
        .bind(movie_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(found)
    }

    async fn add_favorite(&self, user_id: Uuid, movie_id: MovieId) -> AppResult<()> {
        sqlx::query("INSERT INTO favorites (user_id, movie_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(movie_id)
            .execute(&self.pool)
            .await
            .map_err(|e| match AppError::from(e) {
                AppError::Conflict(_) => {
                    AppError::Conflict("Movie already in favorites".to_string())
                }
                AppError::NotFound(_) => user_not_found(user_id),
                other => other,
            })?;
        Ok(())
    }

    async fn remove_favorite(&self, user_id: Uuid, movie_id: MovieId) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND movie_id = $2")
            .bind(user_id)
            .bind(movie_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Favorite not found".to_string()));
        }
        Ok(())
    }
}
