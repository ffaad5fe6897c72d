//! Handlers for comments, nested under a review.
//!
//! Comments do not affect ratings. The enclosing review must belong to the
//! title in the path; otherwise the request is a 404.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use yamdb_core::access::{Action, Resource, Subject};
use yamdb_core::catalog::validate_text;
use yamdb_core::error::CoreError;
use yamdb_core::types::DbId;
use yamdb_db::models::comment::{Comment, CreateComment, UpdateComment};
use yamdb_db::repositories::CommentRepo;
use yamdb_db::DbPool;

use super::reviews::find_review;
use super::{caller_id, ensure_allowed};
use crate::error::{AppError, AppResult};
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

const COMMENT_TEXT_FIELD: &str = "Comment text";

/// GET /api/v1/titles/{title_id}/reviews/{review_id}/comments
pub async fn list_comments(
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(DbId, DbId)>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    find_review(&state.pool, title_id, review_id).await?;

    let (limit, offset) = params.window();
    let comments = CommentRepo::list_for_review(&state.pool, review_id, limit, offset).await?;

    Ok(Json(DataResponse { data: comments }))
}

/// GET /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}
pub async fn get_comment(
    State(state): State<AppState>,
    Path((title_id, review_id, comment_id)): Path<(DbId, DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    find_review(&state.pool, title_id, review_id).await?;
    let comment = find_comment(&state.pool, review_id, comment_id).await?;

    Ok(Json(DataResponse { data: comment }))
}

/// POST /api/v1/titles/{title_id}/reviews/{review_id}/comments
///
/// Any authenticated user; no per-author limit.
pub async fn create_comment(
    subject: Subject,
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(DbId, DbId)>,
    Json(input): Json<CreateComment>,
) -> AppResult<impl IntoResponse> {
    ensure_allowed(
        &subject,
        Action::Create,
        &Resource::Comment { author_id: None },
    )?;
    let author_id = caller_id(&subject)?;
    validate_text(COMMENT_TEXT_FIELD, &input.text)?;

    find_review(&state.pool, title_id, review_id).await?;
    let comment = CommentRepo::create(&state.pool, review_id, author_id, &input.text).await?;

    tracing::info!(
        comment_id = comment.id,
        review_id,
        author_id,
        "Comment created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: comment })))
}

/// PATCH /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}
///
/// Author, moderator, or admin.
pub async fn update_comment(
    subject: Subject,
    State(state): State<AppState>,
    Path((title_id, review_id, comment_id)): Path<(DbId, DbId, DbId)>,
    Json(input): Json<UpdateComment>,
) -> AppResult<impl IntoResponse> {
    find_review(&state.pool, title_id, review_id).await?;
    let existing = find_comment(&state.pool, review_id, comment_id).await?;
    ensure_allowed(
        &subject,
        Action::Update,
        &Resource::Comment {
            author_id: Some(existing.author_id),
        },
    )?;
    if let Some(text) = &input.text {
        validate_text(COMMENT_TEXT_FIELD, text)?;
    }

    let comment =
        CommentRepo::update(&state.pool, review_id, comment_id, input.text.as_deref())
            .await?
            .ok_or(comment_not_found(comment_id))?;

    tracing::info!(comment_id, review_id, editor_id = ?subject.user_id(), "Comment updated");

    Ok(Json(DataResponse { data: comment }))
}

/// DELETE /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}
pub async fn delete_comment(
    subject: Subject,
    State(state): State<AppState>,
    Path((title_id, review_id, comment_id)): Path<(DbId, DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    find_review(&state.pool, title_id, review_id).await?;
    let existing = find_comment(&state.pool, review_id, comment_id).await?;
    ensure_allowed(
        &subject,
        Action::Delete,
        &Resource::Comment {
            author_id: Some(existing.author_id),
        },
    )?;

    if !CommentRepo::delete(&state.pool, review_id, comment_id).await? {
        return Err(comment_not_found(comment_id));
    }

    tracing::info!(comment_id, review_id, user_id = ?subject.user_id(), "Comment deleted");

    Ok(StatusCode::NO_CONTENT)
}

async fn find_comment(pool: &DbPool, review_id: DbId, comment_id: DbId) -> AppResult<Comment> {
    CommentRepo::find_in_review(pool, review_id, comment_id)
        .await?
        .ok_or(comment_not_found(comment_id))
}

fn comment_not_found(comment_id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Comment",
        id: comment_id,
    })
}
