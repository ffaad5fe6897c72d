//! Transactional review writes.
//!
//! Every write follows the same shape:
//!
//! 1. validate input (no transaction needed yet)
//! 2. `BEGIN`, on create share-lock the author row
//! 3. lock the title row (`SELECT ... FOR UPDATE`)
//! 4. uniqueness guard (create only)
//! 5. ledger write
//! 6. rating recompute
//! 7. `COMMIT`
//!
//! Any error drops the transaction before step 7, which rolls it back. The
//! row lock is per title, so writes to different titles proceed in parallel.
//!
//! Lock order is always user row, then title rows in ascending id. Creates
//! and [`ReviewWriter::delete_user`] both follow it, so a user deletion
//! racing that user's own review cannot deadlock.

use sqlx::{PgConnection, PgPool};
use yamdb_core::catalog::validate_text;
use yamdb_core::error::CoreError;
use yamdb_core::scoring::score_from_json;
use yamdb_core::types::DbId;

use crate::aggregator::RatingAggregator;
use crate::error::ReviewWriteError;
use crate::guard::{is_review_unique_violation, UniquenessGuard, REVIEW_UNIQUE_CONSTRAINT};
use crate::models::review::{CreateReview, Review, UpdateReview};
use crate::repositories::{ReviewRepo, TitleRepo, UserRepo};

const REVIEW_TEXT_FIELD: &str = "Review text";

pub struct ReviewWriter;

impl ReviewWriter {
    /// Create `author_id`'s review of `title_id`.
    ///
    /// Fails with `OutOfRange` for a bad score, `NotFound` for an unknown
    /// author or title, and `DuplicateReview` if the author already reviewed
    /// it.
    pub async fn create(
        pool: &PgPool,
        title_id: DbId,
        author_id: DbId,
        input: &CreateReview,
    ) -> Result<Review, ReviewWriteError> {
        let score = score_from_json(&input.score)?;
        validate_text(REVIEW_TEXT_FIELD, &input.text)?;

        let mut tx = pool.begin().await?;
        // The insert's foreign key check would share-lock the author anyway;
        // taking it up front keeps the user-then-title order.
        if !UserRepo::lock_for_share(&mut *tx, author_id).await? {
            return Err(CoreError::NotFound {
                entity: "User",
                id: author_id,
            }
            .into());
        }
        lock_title(&mut *tx, title_id).await?;

        UniquenessGuard::check_can_create(&mut *tx, title_id, author_id).await?;

        let review_id = ReviewRepo::insert(&mut *tx, title_id, author_id, score, &input.text)
            .await
            .inspect_err(|err| {
                if is_review_unique_violation(err) {
                    tracing::error!(
                        title_id,
                        author_id,
                        constraint = REVIEW_UNIQUE_CONSTRAINT,
                        "Review unique index fired after the guard passed"
                    );
                }
            })?;

        let rating = RatingAggregator::recompute(&mut *tx, title_id).await?;
        let review = fetch_review(&mut *tx, review_id).await?;
        tx.commit().await?;

        tracing::info!(title_id, author_id, review_id, score, ?rating, "Review created");
        Ok(review)
    }

    /// Patch a review's score and/or text.
    ///
    /// Authorization is the caller's job; this only enforces existence and
    /// field validity.
    pub async fn update(
        pool: &PgPool,
        title_id: DbId,
        review_id: DbId,
        input: &UpdateReview,
    ) -> Result<Review, ReviewWriteError> {
        let score = input.score.as_ref().map(score_from_json).transpose()?;
        if let Some(text) = &input.text {
            validate_text(REVIEW_TEXT_FIELD, text)?;
        }

        let mut tx = pool.begin().await?;
        lock_title(&mut *tx, title_id).await?;

        let updated =
            ReviewRepo::update(&mut *tx, title_id, review_id, score, input.text.as_deref()).await?;
        if !updated {
            return Err(review_not_found(review_id));
        }

        let rating = RatingAggregator::recompute(&mut *tx, title_id).await?;
        let review = fetch_review(&mut *tx, review_id).await?;
        tx.commit().await?;

        tracing::info!(title_id, review_id, ?score, ?rating, "Review updated");
        Ok(review)
    }

    /// Delete a review and its comments.
    pub async fn delete(
        pool: &PgPool,
        title_id: DbId,
        review_id: DbId,
    ) -> Result<(), ReviewWriteError> {
        let mut tx = pool.begin().await?;
        lock_title(&mut *tx, title_id).await?;

        if !ReviewRepo::delete(&mut *tx, title_id, review_id).await? {
            return Err(review_not_found(review_id));
        }

        let rating = RatingAggregator::recompute(&mut *tx, title_id).await?;
        tx.commit().await?;

        tracing::info!(title_id, review_id, ?rating, "Review deleted");
        Ok(())
    }

    /// Delete a user together with their reviews and comments, recomputing
    /// the rating of every title they had reviewed.
    ///
    /// Returns `false` if the user does not exist.
    pub async fn delete_user(pool: &PgPool, user_id: DbId) -> Result<bool, ReviewWriteError> {
        let mut tx = pool.begin().await?;

        // Blocks new reviews by this user until the delete commits.
        if !UserRepo::lock_for_update(&mut *tx, user_id).await? {
            return Ok(false);
        }

        // Ascending id order keeps lock acquisition consistent across writers.
        let title_ids = ReviewRepo::title_ids_for_author(&mut *tx, user_id).await?;
        for &title_id in &title_ids {
            TitleRepo::lock_for_update(&mut *tx, title_id).await?;
        }

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        for &title_id in &title_ids {
            RatingAggregator::recompute(&mut *tx, title_id).await?;
        }
        tx.commit().await?;

        tracing::info!(user_id, recomputed_titles = title_ids.len(), "User deleted");
        Ok(true)
    }
}

async fn lock_title(conn: &mut PgConnection, title_id: DbId) -> Result<(), ReviewWriteError> {
    if TitleRepo::lock_for_update(conn, title_id).await? {
        Ok(())
    } else {
        Err(CoreError::NotFound {
            entity: "Title",
            id: title_id,
        }
        .into())
    }
}

async fn fetch_review(
    conn: &mut PgConnection,
    review_id: DbId,
) -> Result<Review, ReviewWriteError> {
    ReviewRepo::find_by_id(conn, review_id)
        .await?
        .ok_or_else(|| review_not_found(review_id))
}

fn review_not_found(review_id: DbId) -> ReviewWriteError {
    CoreError::NotFound {
        entity: "Review",
        id: review_id,
    }
    .into()
}
