//! Repository for the `reviews` table (the score ledger).
//!
//! Writes go through [`crate::review_writer::ReviewWriter`], which wraps the
//! connection-level methods here in a transaction together with the
//! uniqueness guard and rating recompute. Nothing else should call
//! [`ReviewRepo::insert`], [`ReviewRepo::update`] or [`ReviewRepo::delete`].

use sqlx::{PgConnection, PgPool};
use yamdb_core::types::DbId;

use crate::models::review::Review;

/// Select list for reviews joined with their author.
const REVIEW_SELECT: &str = "SELECT r.id, r.title_id, r.author_id, u.username AS author, \
    r.text, r.score, r.created_at \
    FROM reviews r JOIN users u ON u.id = r.author_id";

/// Provides ledger queries for reviews.
pub struct ReviewRepo;

impl ReviewRepo {
    /// List a title's reviews in insertion order.
    pub async fn list_for_title(
        pool: &PgPool,
        title_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Review>, sqlx::Error> {
        let query = format!(
            "{REVIEW_SELECT}
             WHERE r.title_id = $1
             ORDER BY r.created_at ASC, r.id ASC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(title_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Find a review by id, scoped to its title.
    pub async fn find_in_title(
        pool: &PgPool,
        title_id: DbId,
        review_id: DbId,
    ) -> Result<Option<Review>, sqlx::Error> {
        let query = format!("{REVIEW_SELECT} WHERE r.id = $1 AND r.title_id = $2");
        sqlx::query_as::<_, Review>(&query)
            .bind(review_id)
            .bind(title_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a review by id on an open connection.
    pub async fn find_by_id(
        conn: &mut PgConnection,
        review_id: DbId,
    ) -> Result<Option<Review>, sqlx::Error> {
        let query = format!("{REVIEW_SELECT} WHERE r.id = $1");
        sqlx::query_as::<_, Review>(&query)
            .bind(review_id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Return the id of `author_id`'s review of `title_id`, if any.
    pub async fn find_id_by_title_and_author(
        conn: &mut PgConnection,
        title_id: DbId,
        author_id: DbId,
    ) -> Result<Option<DbId>, sqlx::Error> {
        let row: Option<(DbId,)> =
            sqlx::query_as("SELECT id FROM reviews WHERE title_id = $1 AND author_id = $2")
                .bind(title_id)
                .bind(author_id)
                .fetch_optional(&mut *conn)
                .await?;
        Ok(row.map(|r| r.0))
    }

    /// Insert a review row, returning its id. `created_at` is server-assigned.
    pub async fn insert(
        conn: &mut PgConnection,
        title_id: DbId,
        author_id: DbId,
        score: i16,
        text: &str,
    ) -> Result<DbId, sqlx::Error> {
        let (id,): (DbId,) = sqlx::query_as(
            "INSERT INTO reviews (title_id, author_id, score, text)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(title_id)
        .bind(author_id)
        .bind(score)
        .bind(text)
        .fetch_one(&mut *conn)
        .await?;
        Ok(id)
    }

    /// Patch `score` and/or `text`. Returns `false` if no review with this id
    /// belongs to `title_id`.
    pub async fn update(
        conn: &mut PgConnection,
        title_id: DbId,
        review_id: DbId,
        score: Option<i16>,
        text: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE reviews SET
                score = COALESCE($1, score),
                text = COALESCE($2, text)
             WHERE id = $3 AND title_id = $4",
        )
        .bind(score)
        .bind(text)
        .bind(review_id)
        .bind(title_id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a review (its comments cascade). Returns `false` if no review
    /// with this id belongs to `title_id`.
    pub async fn delete(
        conn: &mut PgConnection,
        title_id: DbId,
        review_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1 AND title_id = $2")
            .bind(review_id)
            .bind(title_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Snapshot of every score for a title, in insertion order.
    pub async fn scores_for_title(
        conn: &mut PgConnection,
        title_id: DbId,
    ) -> Result<Vec<i16>, sqlx::Error> {
        let rows: Vec<(i16,)> = sqlx::query_as(
            "SELECT score FROM reviews WHERE title_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(title_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    /// Distinct ids of titles an author has reviewed, ascending.
    pub async fn title_ids_for_author(
        conn: &mut PgConnection,
        author_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> = sqlx::query_as(
            "SELECT DISTINCT title_id FROM reviews WHERE author_id = $1 ORDER BY title_id ASC",
        )
        .bind(author_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }
}
