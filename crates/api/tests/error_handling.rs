//! Tests for `AppError` -> HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values; no server is
//! involved. The SQLSTATE cases raise genuine PostgreSQL errors so the
//! classifier sees real error codes.

use assert_matches::assert_matches;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use sqlx::PgPool;
use yamdb_api::error::AppError;
use yamdb_core::error::CoreError;
use yamdb_db::ReviewWriteError;

/// Convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "Title",
        id: 42,
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Title with id 42 not found");
}

#[tokio::test]
async fn not_found_by_key_names_the_key() {
    let err = AppError::Core(CoreError::NotFoundByKey {
        entity: "Genre",
        key: "sci-fi".into(),
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Genre 'sci-fi' not found");
}

#[tokio::test]
async fn duplicate_review_is_a_400_not_a_409() {
    let err = AppError::Core(CoreError::DuplicateReview { title_id: 7 });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "DUPLICATE_REVIEW");
    assert!(json["error"].as_str().unwrap().contains("already reviewed"));
}

#[tokio::test]
async fn out_of_range_returns_400() {
    let err = AppError::Core(CoreError::OutOfRange {
        field: "score",
        value: "11".into(),
        min: 1,
        max: 10,
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "OUT_OF_RANGE");
    assert_eq!(json["error"], "score must be an integer between 1 and 10, got 11");
}

#[tokio::test]
async fn unauthorized_returns_401() {
    let err = AppError::Core(CoreError::Unauthorized("no credentials".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn forbidden_returns_403() {
    let err = AppError::Core(CoreError::Forbidden("not yours".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "FORBIDDEN");
    assert_eq!(json["error"], "not yours");
}

#[tokio::test]
async fn conflict_error_returns_409() {
    let err = AppError::Core(CoreError::Conflict("slug taken".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
}

#[tokio::test]
async fn bad_request_error_returns_400() {
    let err = AppError::BadRequest("invalid field value".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "invalid field value");
}

#[tokio::test]
async fn internal_error_returns_500_and_sanitizes_message() {
    let err = AppError::InternalError("secret database credentials leaked".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn row_not_found_returns_404() {
    let (status, json) = error_to_response(AppError::Database(sqlx::Error::RowNotFound)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn other_database_errors_are_sanitized() {
    let err = AppError::Database(sqlx::Error::PoolTimedOut);

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "An internal error occurred");
}

#[test]
fn review_write_errors_keep_their_kind() {
    let core: AppError = ReviewWriteError::Core(CoreError::DuplicateReview { title_id: 1 }).into();
    assert_matches!(core, AppError::Core(CoreError::DuplicateReview { title_id: 1 }));

    let db: AppError = ReviewWriteError::Database(sqlx::Error::RowNotFound).into();
    assert_matches!(db, AppError::Database(sqlx::Error::RowNotFound));
}

/// Raise a PostgreSQL error with the given condition name and return it.
async fn raise(pool: &PgPool, condition: &str) -> sqlx::Error {
    let sql = format!("DO $$ BEGIN RAISE EXCEPTION 'forced' USING ERRCODE = '{condition}'; END $$");
    sqlx::query(&sql).execute(pool).await.unwrap_err()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deadlock_is_a_retryable_503(pool: PgPool) {
    let err = raise(&pool, "deadlock_detected").await;

    let (status, json) = error_to_response(AppError::Database(err)).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], "RETRY");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn serialization_failure_is_a_retryable_503(pool: PgPool) {
    let err = raise(&pool, "serialization_failure").await;

    let (status, json) = error_to_response(AppError::Database(err)).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], "RETRY");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unclassified_sqlstate_stays_sanitized(pool: PgPool) {
    let err = raise(&pool, "division_by_zero").await;

    let (status, json) = error_to_response(AppError::Database(err)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "An internal error occurred");
}
