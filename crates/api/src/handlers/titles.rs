//! Handlers for titles.
//!
//! Reads are public. Writes are admin-only. Category and genres are
//! referenced by slug on input and embedded as `{name, slug}` objects on
//! output. `rating` is read-only here; it changes only through review writes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use yamdb_core::access::{Action, Resource, Subject};
use yamdb_core::catalog::{validate_name, validate_year};
use yamdb_core::error::CoreError;
use yamdb_core::types::DbId;
use yamdb_db::models::title::{CreateTitle, NewTitle, TitleChanges, TitleFilter, UpdateTitle};
use yamdb_db::repositories::{CategoryRepo, GenreRepo, TitleRepo};
use yamdb_db::DbPool;

use super::ensure_allowed;
use crate::error::{AppError, AppResult};
use crate::query::TitleListParams;
use crate::response::DataResponse;
use crate::state::AppState;

const TITLE_NAME_FIELD: &str = "Title name";

/// GET /api/v1/titles
pub async fn list_titles(
    State(state): State<AppState>,
    Query(params): Query<TitleListParams>,
) -> AppResult<impl IntoResponse> {
    let (limit, offset) = params.window();
    let filter = TitleFilter {
        year: params.year,
        category: params.category,
        genre: params.genre,
        name: params.name,
    };

    let titles = TitleRepo::list(&state.pool, &filter, limit, offset).await?;

    Ok(Json(DataResponse { data: titles }))
}

/// GET /api/v1/titles/{title_id}
pub async fn get_title(
    State(state): State<AppState>,
    Path(title_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let title = TitleRepo::find_by_id(&state.pool, title_id)
        .await?
        .ok_or(title_not_found(title_id))?;

    Ok(Json(DataResponse { data: title }))
}

/// POST /api/v1/titles
///
/// Admin only. A new title has no reviews, so its rating starts as `null`.
pub async fn create_title(
    subject: Subject,
    State(state): State<AppState>,
    Json(input): Json<CreateTitle>,
) -> AppResult<impl IntoResponse> {
    ensure_allowed(&subject, Action::Create, &Resource::Title)?;

    validate_name(TITLE_NAME_FIELD, &input.name)?;
    validate_year(input.year)?;

    let category_id = match input.category.as_deref() {
        Some(slug) => Some(resolve_category(&state.pool, slug).await?),
        None => None,
    };
    let genre_ids = resolve_genres(&state.pool, &input.genres).await?;

    let title = TitleRepo::create(
        &state.pool,
        &NewTitle {
            name: input.name,
            year: input.year,
            description: input.description,
            category_id,
            genre_ids,
        },
    )
    .await?;

    tracing::info!(title_id = title.id, user_id = ?subject.user_id(), "Title created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: title })))
}

/// PATCH /api/v1/titles/{title_id}
///
/// Admin only. `"category": null` detaches the category; a `genres` array
/// replaces the whole genre set.
pub async fn update_title(
    subject: Subject,
    State(state): State<AppState>,
    Path(title_id): Path<DbId>,
    Json(input): Json<UpdateTitle>,
) -> AppResult<impl IntoResponse> {
    ensure_allowed(&subject, Action::Update, &Resource::Title)?;

    if let Some(name) = &input.name {
        validate_name(TITLE_NAME_FIELD, name)?;
    }
    if let Some(year) = input.year {
        validate_year(year)?;
    }

    let category_id = match &input.category {
        None => None,
        Some(None) => Some(None),
        Some(Some(slug)) => Some(Some(resolve_category(&state.pool, slug).await?)),
    };
    let genre_ids = match &input.genres {
        Some(slugs) => Some(resolve_genres(&state.pool, slugs).await?),
        None => None,
    };

    let changes = TitleChanges {
        name: input.name,
        year: input.year,
        description: input.description,
        category_id,
        genre_ids,
    };
    let title = TitleRepo::update(&state.pool, title_id, &changes)
        .await?
        .ok_or(title_not_found(title_id))?;

    tracing::info!(title_id, user_id = ?subject.user_id(), "Title updated");

    Ok(Json(DataResponse { data: title }))
}

/// DELETE /api/v1/titles/{title_id}
///
/// Admin only. Reviews and their comments go with the title.
pub async fn delete_title(
    subject: Subject,
    State(state): State<AppState>,
    Path(title_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_allowed(&subject, Action::Delete, &Resource::Title)?;

    if !TitleRepo::delete(&state.pool, title_id).await? {
        return Err(title_not_found(title_id));
    }

    tracing::info!(title_id, user_id = ?subject.user_id(), "Title deleted");

    Ok(StatusCode::NO_CONTENT)
}

/* --------------------------------------------------------------------------
Helpers
-------------------------------------------------------------------------- */

fn title_not_found(title_id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Title",
        id: title_id,
    })
}

async fn resolve_category(pool: &DbPool, slug: &str) -> AppResult<DbId> {
    CategoryRepo::id_for_slug(pool, slug)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "Category with slug '{slug}' does not exist"
            )))
        })
}

async fn resolve_genres(pool: &DbPool, slugs: &[String]) -> AppResult<Vec<DbId>> {
    if slugs.is_empty() {
        return Ok(Vec::new());
    }

    let (ids, missing) = GenreRepo::ids_for_slugs(pool, slugs).await?;
    if !missing.is_empty() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Genres with slugs [{}] do not exist",
            missing.join(", ")
        ))));
    }
    Ok(ids)
}
