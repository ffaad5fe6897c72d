//! Handlers for reviews, nested under a title.
//!
//! Every write goes through [`ReviewWriter`], which runs the uniqueness
//! guard, the ledger write, and the rating recompute in one transaction.
//! Update and delete look the review up before the access check so that a
//! missing review is a 404 rather than a 403.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use yamdb_core::access::{Action, Resource, Subject};
use yamdb_core::error::CoreError;
use yamdb_core::types::DbId;
use yamdb_db::models::review::{CreateReview, Review, UpdateReview};
use yamdb_db::repositories::{ReviewRepo, TitleRepo};
use yamdb_db::review_writer::ReviewWriter;
use yamdb_db::DbPool;

use super::{caller_id, ensure_allowed};
use crate::error::{AppError, AppResult};
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/titles/{title_id}/reviews
///
/// Public. Reviews are listed in the order they were written.
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(title_id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    if !TitleRepo::exists(&state.pool, title_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Title",
            id: title_id,
        }));
    }

    let (limit, offset) = params.window();
    let reviews = ReviewRepo::list_for_title(&state.pool, title_id, limit, offset).await?;

    Ok(Json(DataResponse { data: reviews }))
}

/// GET /api/v1/titles/{title_id}/reviews/{review_id}
pub async fn get_review(
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let review = find_review(&state.pool, title_id, review_id).await?;

    Ok(Json(DataResponse { data: review }))
}

/// POST /api/v1/titles/{title_id}/reviews
///
/// Any authenticated user, once per title. A second review by the same
/// author is a 400 `DUPLICATE_REVIEW`.
pub async fn create_review(
    subject: Subject,
    State(state): State<AppState>,
    Path(title_id): Path<DbId>,
    Json(input): Json<CreateReview>,
) -> AppResult<impl IntoResponse> {
    ensure_allowed(
        &subject,
        Action::Create,
        &Resource::Review { author_id: None },
    )?;
    let author_id = caller_id(&subject)?;

    let review = ReviewWriter::create(&state.pool, title_id, author_id, &input).await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: review })))
}

/// PATCH /api/v1/titles/{title_id}/reviews/{review_id}
///
/// Author, moderator, or admin.
pub async fn update_review(
    subject: Subject,
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateReview>,
) -> AppResult<impl IntoResponse> {
    let existing = find_review(&state.pool, title_id, review_id).await?;
    ensure_allowed(
        &subject,
        Action::Update,
        &Resource::Review {
            author_id: Some(existing.author_id),
        },
    )?;

    let review = ReviewWriter::update(&state.pool, title_id, review_id, &input).await?;

    tracing::debug!(review_id, editor_id = ?subject.user_id(), "Review edited");

    Ok(Json(DataResponse { data: review }))
}

/// DELETE /api/v1/titles/{title_id}/reviews/{review_id}
///
/// Author, moderator, or admin. The review's comments are deleted with it.
pub async fn delete_review(
    subject: Subject,
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let existing = find_review(&state.pool, title_id, review_id).await?;
    ensure_allowed(
        &subject,
        Action::Delete,
        &Resource::Review {
            author_id: Some(existing.author_id),
        },
    )?;

    ReviewWriter::delete(&state.pool, title_id, review_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Load a review that belongs to `title_id`, or 404.
pub(crate) async fn find_review(
    pool: &DbPool,
    title_id: DbId,
    review_id: DbId,
) -> AppResult<Review> {
    ReviewRepo::find_in_title(pool, title_id, review_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Review",
            id: review_id,
        }))
}
