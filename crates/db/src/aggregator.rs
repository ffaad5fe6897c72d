//! Title rating maintenance.
//!
//! Ratings are recomputed eagerly from the full score set after every review
//! write, inside the same transaction, so a committed review set and its
//! title's rating never disagree.

use sqlx::{PgConnection, PgPool};
use yamdb_core::error::CoreError;
use yamdb_core::rating::average_rating;
use yamdb_core::types::DbId;

use crate::error::ReviewWriteError;
use crate::repositories::{ReviewRepo, TitleRepo};

pub struct RatingAggregator;

impl RatingAggregator {
    /// Recompute and store a title's rating on an open transaction.
    ///
    /// The caller must hold the title's row lock. Returns the stored value.
    pub async fn recompute(
        conn: &mut PgConnection,
        title_id: DbId,
    ) -> Result<Option<i16>, sqlx::Error> {
        let scores = ReviewRepo::scores_for_title(conn, title_id).await?;
        let rating = average_rating(&scores);
        TitleRepo::set_rating(conn, title_id, rating).await?;

        tracing::debug!(title_id, review_count = scores.len(), ?rating, "Rating recomputed");
        Ok(rating)
    }

    /// Recompute a single title's rating in its own transaction.
    ///
    /// Idempotent: with no intervening review writes, repeated calls store
    /// the same value.
    pub async fn recompute_title(
        pool: &PgPool,
        title_id: DbId,
    ) -> Result<Option<i16>, ReviewWriteError> {
        let mut tx = pool.begin().await?;

        if !TitleRepo::lock_for_update(&mut *tx, title_id).await? {
            return Err(CoreError::NotFound {
                entity: "Title",
                id: title_id,
            }
            .into());
        }

        let rating = Self::recompute(&mut *tx, title_id).await?;
        tx.commit().await?;
        Ok(rating)
    }
}
