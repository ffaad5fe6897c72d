//! Handlers for users.
//!
//! Accounts are issued by the identity service. This API lets callers read
//! and edit their own profile and lets admins list, create, re-role, and
//! remove users. Non-admins may read only themselves.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use yamdb_core::access::{Action, Resource, Subject};
use yamdb_core::catalog::{validate_email, validate_person_name, validate_username};
use yamdb_core::error::CoreError;
use yamdb_db::models::user::{CreateUser, UpdateProfile, UpdateUser, User};
use yamdb_db::repositories::UserRepo;
use yamdb_db::review_writer::ReviewWriter;
use yamdb_db::DbPool;

use super::ensure_allowed;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/users/me
pub async fn get_me(auth: AuthUser, State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;

    Ok(Json(DataResponse { data: user }))
}

/// PATCH /api/v1/users/me
///
/// Edit the caller's own profile. `role` is read-only here; admins change
/// roles through `PATCH /users/{username}`.
pub async fn update_me(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpdateProfile>,
) -> AppResult<impl IntoResponse> {
    let changes = UpdateUser::from(input);
    validate_changes(&changes)?;

    let updated = UserRepo::update(&state.pool, auth.user_id, &changes)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;

    tracing::info!(user_id = auth.user_id, "Profile updated");

    Ok(Json(DataResponse { data: updated }))
}

/// GET /api/v1/users
///
/// Admin only.
pub async fn list_users(
    subject: Subject,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    ensure_allowed(&subject, Action::Read, &Resource::User { user_id: None })?;

    let (limit, offset) = params.window();
    let users = UserRepo::list(&state.pool, limit, offset).await?;

    Ok(Json(DataResponse { data: users }))
}

/// POST /api/v1/users
///
/// Admin only. A taken username or email is a 409.
pub async fn create_user(
    subject: Subject,
    State(state): State<AppState>,
    Json(input): Json<CreateUser>,
) -> AppResult<impl IntoResponse> {
    ensure_allowed(&subject, Action::Create, &Resource::User { user_id: None })?;
    validate_username(&input.username)?;
    validate_email(&input.email)?;
    if let Some(first_name) = &input.first_name {
        validate_person_name("First name", first_name)?;
    }
    if let Some(last_name) = &input.last_name {
        validate_person_name("Last name", last_name)?;
    }

    let user = UserRepo::create(&state.pool, &input).await?;

    tracing::info!(
        new_user_id = user.id,
        username = %user.username,
        role = %user.role,
        admin_id = ?subject.user_id(),
        "User created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: user })))
}

/// GET /api/v1/users/{username}
pub async fn get_user(
    subject: Subject,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<impl IntoResponse> {
    let user = load_authorized(&state.pool, &subject, Action::Read, username).await?;

    Ok(Json(DataResponse { data: user }))
}

/// PATCH /api/v1/users/{username}
///
/// Admin only. Role changes take effect on the user's next token.
pub async fn update_user(
    subject: Subject,
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(input): Json<UpdateUser>,
) -> AppResult<impl IntoResponse> {
    let user = load_authorized(&state.pool, &subject, Action::Update, username).await?;
    validate_changes(&input)?;

    let updated = UserRepo::update(&state.pool, user.id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user.id,
        }))?;

    tracing::info!(
        target_user_id = user.id,
        role = %updated.role,
        admin_id = ?subject.user_id(),
        "User updated"
    );

    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/v1/users/{username}
///
/// Admin only. Removes the user's reviews and comments and recomputes the
/// rating of every title they had reviewed.
pub async fn delete_user(
    subject: Subject,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<impl IntoResponse> {
    let user = load_authorized(&state.pool, &subject, Action::Delete, username).await?;

    if !ReviewWriter::delete_user(&state.pool, user.id).await? {
        return Err(AppError::Core(CoreError::NotFoundByKey {
            entity: "User",
            key: user.username,
        }));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Look up a user by username and run the access check against them.
///
/// The check runs before the not-found check, against `None` when the user
/// is missing, so non-admins cannot tell which usernames exist.
async fn load_authorized(
    pool: &DbPool,
    subject: &Subject,
    action: Action,
    username: String,
) -> AppResult<User> {
    let user = UserRepo::find_by_username(pool, &username).await?;
    ensure_allowed(
        subject,
        action,
        &Resource::User {
            user_id: user.as_ref().map(|u| u.id),
        },
    )?;

    user.ok_or(AppError::Core(CoreError::NotFoundByKey {
        entity: "User",
        key: username,
    }))
}

fn validate_changes(changes: &UpdateUser) -> Result<(), CoreError> {
    if let Some(email) = &changes.email {
        validate_email(email)?;
    }
    if let Some(first_name) = &changes.first_name {
        validate_person_name("First name", first_name)?;
    }
    if let Some(last_name) = &changes.last_name {
        validate_person_name("Last name", last_name)?;
    }
    Ok(())
}
