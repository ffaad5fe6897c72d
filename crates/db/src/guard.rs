//! One-review-per-author-per-title guard.
//!
//! The check reads the ledger on the caller's connection. It is only sound
//! when that connection is inside a transaction that already holds the
//! title's row lock (see [`crate::repositories::TitleRepo::lock_for_update`]);
//! otherwise two concurrent creates can both pass it.

use sqlx::PgConnection;
use yamdb_core::error::CoreError;
use yamdb_core::types::DbId;

use crate::error::ReviewWriteError;
use crate::repositories::ReviewRepo;

/// Storage-level unique index backing the guard.
///
/// A violation of this constraint means the guard was bypassed and is a
/// defect, not a user error.
pub const REVIEW_UNIQUE_CONSTRAINT: &str = "uq_reviews_title_author";

pub struct UniquenessGuard;

impl UniquenessGuard {
    /// Reject the create if `author_id` already reviewed `title_id`.
    pub async fn check_can_create(
        conn: &mut PgConnection,
        title_id: DbId,
        author_id: DbId,
    ) -> Result<(), ReviewWriteError> {
        if let Some(existing_id) =
            ReviewRepo::find_id_by_title_and_author(conn, title_id, author_id).await?
        {
            tracing::warn!(
                title_id,
                author_id,
                existing_review_id = existing_id,
                "Duplicate review rejected"
            );
            return Err(CoreError::DuplicateReview { title_id }.into());
        }
        Ok(())
    }
}

/// Whether `err` is a violation of [`REVIEW_UNIQUE_CONSTRAINT`].
pub fn is_review_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.constraint() == Some(REVIEW_UNIQUE_CONSTRAINT),
        _ => false,
    }
}
