pub mod categories;
pub mod genres;
pub mod health;
pub mod titles;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /titles                                              list, create
/// /titles/{title_id}                                   get, update, delete
/// /titles/{title_id}/reviews                           list, create
/// /titles/{title_id}/reviews/{review_id}               get, update, delete
/// /titles/{title_id}/reviews/{review_id}/comments      list, create
/// /titles/{title_id}/reviews/{review_id}/comments/{comment_id}
///                                                      get, update, delete
///
/// /categories                                          list, create
/// /categories/{slug}                                   get, update, delete
///
/// /genres                                              list, create
/// /genres/{slug}                                       get, update, delete
///
/// /users                                               list, create (admin)
/// /users/me                                            caller's profile
/// /users/{username}                                    get, update, delete
/// ```
///
/// Trailing slashes are trimmed before routing (see
/// [`crate::router::build_app`]).
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/titles", titles::router())
        .nest("/categories", categories::router())
        .nest("/genres", genres::router())
        .nest("/users", users::router())
}
