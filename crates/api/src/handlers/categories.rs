//! Handlers for categories.
//!
//! Categories are addressed by slug. Reads are public; writes are admin-only.
//! Deleting a category leaves its titles uncategorized.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use yamdb_core::access::{Action, Resource, Subject};
use yamdb_core::catalog::{validate_name, validate_slug};
use yamdb_core::error::CoreError;
use yamdb_db::models::category::{CreateCategory, UpdateCategory};
use yamdb_db::repositories::CategoryRepo;

use super::ensure_allowed;
use crate::error::{AppError, AppResult};
use crate::query::SearchParams;
use crate::response::DataResponse;
use crate::state::AppState;

const CATEGORY_NAME_FIELD: &str = "Category name";

/// GET /api/v1/categories
pub async fn list_categories(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<impl IntoResponse> {
    let (limit, offset) = params.window();
    let categories =
        CategoryRepo::list(&state.pool, params.search.as_deref(), limit, offset).await?;

    Ok(Json(DataResponse { data: categories }))
}

/// GET /api/v1/categories/{slug}
pub async fn get_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let category = CategoryRepo::find_by_slug(&state.pool, &slug)
        .await?
        .ok_or_else(|| category_not_found(slug))?;

    Ok(Json(DataResponse { data: category }))
}

/// POST /api/v1/categories
///
/// Admin only. A taken slug is a 409 via `uq_categories_slug`.
pub async fn create_category(
    subject: Subject,
    State(state): State<AppState>,
    Json(input): Json<CreateCategory>,
) -> AppResult<impl IntoResponse> {
    ensure_allowed(&subject, Action::Create, &Resource::Category)?;
    validate_name(CATEGORY_NAME_FIELD, &input.name)?;
    validate_slug(&input.slug)?;

    let category = CategoryRepo::create(&state.pool, &input).await?;

    tracing::info!(slug = %category.slug, user_id = ?subject.user_id(), "Category created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: category })))
}

/// PATCH /api/v1/categories/{slug}
///
/// Admin only. Renames the category; the slug itself is fixed.
pub async fn update_category(
    subject: Subject,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(input): Json<UpdateCategory>,
) -> AppResult<impl IntoResponse> {
    ensure_allowed(&subject, Action::Update, &Resource::Category)?;
    if let Some(name) = &input.name {
        validate_name(CATEGORY_NAME_FIELD, name)?;
    }

    let category = CategoryRepo::update(&state.pool, &slug, &input)
        .await?
        .ok_or_else(|| category_not_found(slug.clone()))?;

    tracing::info!(%slug, user_id = ?subject.user_id(), "Category updated");

    Ok(Json(DataResponse { data: category }))
}

/// DELETE /api/v1/categories/{slug}
pub async fn delete_category(
    subject: Subject,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    ensure_allowed(&subject, Action::Delete, &Resource::Category)?;

    if !CategoryRepo::delete(&state.pool, &slug).await? {
        return Err(category_not_found(slug));
    }

    tracing::info!(%slug, user_id = ?subject.user_id(), "Category deleted");

    Ok(StatusCode::NO_CONTENT)
}

fn category_not_found(slug: String) -> AppError {
    AppError::Core(CoreError::NotFoundByKey {
        entity: "Category",
        key: slug,
    })
}
