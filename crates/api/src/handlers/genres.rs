//! Handlers for genres.
//!
//! Genres are addressed by slug. Reads are public; writes are admin-only.
//! Deleting a genre unlinks it from every title.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use yamdb_core::access::{Action, Resource, Subject};
use yamdb_core::catalog::{validate_name, validate_slug};
use yamdb_core::error::CoreError;
use yamdb_db::models::genre::{CreateGenre, UpdateGenre};
use yamdb_db::repositories::GenreRepo;

use super::ensure_allowed;
use crate::error::{AppError, AppResult};
use crate::query::SearchParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/genres
pub async fn list_genres(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<impl IntoResponse> {
    let (limit, offset) = params.window();
    let genres = GenreRepo::list(&state.pool, params.search.as_deref(), limit, offset).await?;

    Ok(Json(DataResponse { data: genres }))
}

/// GET /api/v1/genres/{slug}
pub async fn get_genre(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let genre = GenreRepo::find_by_slug(&state.pool, &slug)
        .await?
        .ok_or_else(|| genre_not_found(slug))?;

    Ok(Json(DataResponse { data: genre }))
}

/// POST /api/v1/genres
pub async fn create_genre(
    subject: Subject,
    State(state): State<AppState>,
    Json(input): Json<CreateGenre>,
) -> AppResult<impl IntoResponse> {
    ensure_allowed(&subject, Action::Create, &Resource::Genre)?;
    validate_name("Genre name", &input.name)?;
    validate_slug(&input.slug)?;

    let genre = GenreRepo::create(&state.pool, &input).await?;

    tracing::info!(slug = %genre.slug, user_id = ?subject.user_id(), "Genre created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: genre })))
}

/// PATCH /api/v1/genres/{slug}
pub async fn update_genre(
    subject: Subject,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(input): Json<UpdateGenre>,
) -> AppResult<impl IntoResponse> {
    ensure_allowed(&subject, Action::Update, &Resource::Genre)?;
    if let Some(name) = &input.name {
        validate_name("Genre name", name)?;
    }

    let genre = GenreRepo::update(&state.pool, &slug, &input)
        .await?
        .ok_or_else(|| genre_not_found(slug.clone()))?;

    tracing::info!(%slug, user_id = ?subject.user_id(), "Genre updated");

    Ok(Json(DataResponse { data: genre }))
}

/// DELETE /api/v1/genres/{slug}
pub async fn delete_genre(
    subject: Subject,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    ensure_allowed(&subject, Action::Delete, &Resource::Genre)?;

    if !GenreRepo::delete(&state.pool, &slug).await? {
        return Err(genre_not_found(slug));
    }

    tracing::info!(%slug, user_id = ?subject.user_id(), "Genre deleted");

    Ok(StatusCode::NO_CONTENT)
}

fn genre_not_found(slug: String) -> AppError {
    AppError::Core(CoreError::NotFoundByKey {
        entity: "Genre",
        key: slug,
    })
}
