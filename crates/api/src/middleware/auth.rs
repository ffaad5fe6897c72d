//! JWT-based caller extractors for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use yamdb_core::access::Subject;
use yamdb_core::error::CoreError;
use yamdb_core::roles::Role;
use yamdb_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Resolve the caller from the `Authorization` header.
///
/// No header yields [`Subject::Anonymous`]; read endpoints accept that and
/// the access policy turns it into 401 for writes. A header that is present
/// but malformed, expired, or carries an unknown role is rejected with 401
/// outright rather than downgraded to anonymous.
///
/// ```ignore
/// async fn create(subject: Subject, ...) -> AppResult<impl IntoResponse> {
///     authorize(&subject, Action::Create, &Resource::Title)?;
///     ...
/// }
/// ```
impl FromRequestParts<AppState> for Subject {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(AUTHORIZATION) else {
            return Ok(Subject::Anonymous);
        };

        let token = header
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| {
                unauthorized("Invalid Authorization format. Expected: Bearer <token>")
            })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|err| {
            tracing::warn!(error = %err, "Rejected access token");
            unauthorized("Invalid or expired token")
        })?;

        Ok(Subject::Authenticated {
            user_id: claims.sub,
            role: claims.role,
        })
    }
}

/// An authenticated caller. Rejects anonymous requests with 401.
///
/// Use this where the handler needs a user id regardless of resource, e.g.
/// `GET /users/me`. Resource-level checks still go through
/// [`yamdb_core::access::authorize`].
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    /// The user's internal database id (from `claims.sub`).
    pub user_id: DbId,
    pub role: Role,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match Subject::from_request_parts(parts, state).await? {
            Subject::Authenticated { user_id, role } => Ok(AuthUser { user_id, role }),
            Subject::Anonymous => Err(unauthorized(
                "Authentication credentials were not provided",
            )),
        }
    }
}

fn unauthorized(msg: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(msg.into()))
}
