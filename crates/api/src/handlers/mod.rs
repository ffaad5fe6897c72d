pub mod categories;
pub mod comments;
pub mod genres;
pub mod reviews;
pub mod titles;
pub mod users;

use yamdb_core::access::{authorize, Action, Resource, Subject};
use yamdb_core::error::CoreError;
use yamdb_core::types::DbId;

use crate::error::{AppError, AppResult};

/// Run the access policy and log denials.
pub(crate) fn ensure_allowed(
    subject: &Subject,
    action: Action,
    resource: &Resource,
) -> AppResult<()> {
    authorize(subject, action, resource).map_err(|err| {
        tracing::warn!(
            user_id = ?subject.user_id(),
            ?action,
            ?resource,
            reason = %err,
            "Access denied"
        );
        AppError::Core(err)
    })
}

/// The caller's user id. Anonymous callers get 401.
pub(crate) fn caller_id(subject: &Subject) -> AppResult<DbId> {
    subject.user_id().ok_or_else(|| {
        AppError::Core(CoreError::Unauthorized(
            "Authentication credentials were not provided".into(),
        ))
    })
}
