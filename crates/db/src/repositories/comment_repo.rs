//! Repository for the `comments` table.

use sqlx::PgPool;
use yamdb_core::types::DbId;

use crate::models::comment::Comment;

/// Select list for comments joined with their author.
const COMMENT_SELECT: &str = "SELECT c.id, c.review_id, c.author_id, u.username AS author, \
    c.text, c.created_at \
    FROM comments c JOIN users u ON u.id = c.author_id";

/// Provides CRUD operations for comments scoped to a review.
pub struct CommentRepo;

impl CommentRepo {
    /// List a review's comments, oldest first.
    pub async fn list_for_review(
        pool: &PgPool,
        review_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Comment>, sqlx::Error> {
        let query = format!(
            "{COMMENT_SELECT}
             WHERE c.review_id = $1
             ORDER BY c.created_at ASC, c.id ASC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(review_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Find a comment by id, scoped to its review.
    pub async fn find_in_review(
        pool: &PgPool,
        review_id: DbId,
        comment_id: DbId,
    ) -> Result<Option<Comment>, sqlx::Error> {
        let query = format!("{COMMENT_SELECT} WHERE c.id = $1 AND c.review_id = $2");
        sqlx::query_as::<_, Comment>(&query)
            .bind(comment_id)
            .bind(review_id)
            .fetch_optional(pool)
            .await
    }

    /// Create a comment, returning the created row.
    pub async fn create(
        pool: &PgPool,
        review_id: DbId,
        author_id: DbId,
        text: &str,
    ) -> Result<Comment, sqlx::Error> {
        sqlx::query_as::<_, Comment>(
            "WITH inserted AS (
                INSERT INTO comments (review_id, author_id, text)
                VALUES ($1, $2, $3)
                RETURNING *
             )
             SELECT c.id, c.review_id, c.author_id, u.username AS author, c.text, c.created_at
             FROM inserted c JOIN users u ON u.id = c.author_id",
        )
        .bind(review_id)
        .bind(author_id)
        .bind(text)
        .fetch_one(pool)
        .await
    }

    /// Update a comment's text. Returns `None` if it does not exist under
    /// this review.
    pub async fn update(
        pool: &PgPool,
        review_id: DbId,
        comment_id: DbId,
        text: Option<&str>,
    ) -> Result<Option<Comment>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(
            "WITH updated AS (
                UPDATE comments SET text = COALESCE($1, text)
                WHERE id = $2 AND review_id = $3
                RETURNING *
             )
             SELECT c.id, c.review_id, c.author_id, u.username AS author, c.text, c.created_at
             FROM updated c JOIN users u ON u.id = c.author_id",
        )
        .bind(text)
        .bind(comment_id)
        .bind(review_id)
        .fetch_optional(pool)
        .await
    }

    /// Delete a comment. Returns `true` if a row was removed.
    pub async fn delete(
        pool: &PgPool,
        review_id: DbId,
        comment_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1 AND review_id = $2")
            .bind(comment_id)
            .bind(review_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
