//! HTTP-level integration tests for reviews and comments.
//!
//! Covers anonymous reads, authentication for writes, author/moderator
//! permissions, the one-review-per-title rule, and rating maintenance as
//! seen through the title endpoint.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_user_with_token, delete_auth, get, patch_json_auth, post_json,
    post_json_auth, send,
};
use serde_json::json;
use sqlx::PgPool;
use yamdb_core::roles::Role;
use yamdb_core::types::DbId;
use yamdb_db::models::title::NewTitle;
use yamdb_db::repositories::TitleRepo;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_title(pool: &PgPool) -> DbId {
    TitleRepo::create(
        pool,
        &NewTitle {
            name: "Dune".to_string(),
            year: 1965,
            description: None,
            category_id: None,
            genre_ids: vec![],
        },
    )
    .await
    .expect("title creation should succeed")
    .id
}

fn reviews_uri(title_id: DbId) -> String {
    format!("/api/v1/titles/{title_id}/reviews")
}

async fn title_rating(pool: &PgPool, title_id: DbId) -> serde_json::Value {
    let app = common::build_test_app(pool.clone());
    let response = get(app, &format!("/api/v1/titles/{title_id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"]["rating"].clone()
}

async fn post_review(
    pool: &PgPool,
    title_id: DbId,
    token: &str,
    score: serde_json::Value,
) -> axum::http::Response<axum::body::Body> {
    let app = common::build_test_app(pool.clone());
    let body = json!({ "text": "Worth reading", "score": score });
    post_json_auth(app, &reviews_uri(title_id), body, token).await
}

// ---------------------------------------------------------------------------
// Anonymous access
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_anonymous_can_list_reviews(pool: PgPool) {
    let title_id = seed_title(&pool).await;
    let app = common::build_test_app(pool);

    let response = get(app, &reviews_uri(title_id)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"], json!([]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_trailing_slash_paths_resolve(pool: PgPool) {
    let title_id = seed_title(&pool).await;
    let app = common::build_test_app(pool);

    let response = get(app, &format!("/api/v1/titles/{title_id}/reviews/")).await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_anonymous_create_requires_authentication(pool: PgPool) {
    let title_id = seed_title(&pool).await;
    let app = common::build_test_app(pool.clone());

    let body = json!({ "text": "Anonymous opinion", "score": 5 });
    let response = post_json(app, &reviews_uri(title_id), body).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
    assert_eq!(title_rating(&pool, title_id).await, serde_json::Value::Null);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_malformed_token_is_rejected(pool: PgPool) {
    let title_id = seed_title(&pool).await;
    let app = common::build_test_app(pool);

    let body = json!({ "text": "x", "score": 5 });
    let response = send(
        app,
        axum::http::Method::POST,
        &reviews_uri(title_id),
        Some("not-a-real-token"),
        Some(body),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Create and the uniqueness guard
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_review_updates_title_rating(pool: PgPool) {
    let title_id = seed_title(&pool).await;
    let (_, token) = create_user_with_token(&pool, "reader", Role::User).await;

    let response = post_review(&pool, title_id, &token, json!(8)).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["score"], 8);
    assert_eq!(json["data"]["author"], "reader");
    assert_eq!(json["data"]["title"], title_id);
    assert!(json["data"]["pub_date"].is_string());
    assert_eq!(title_rating(&pool, title_id).await, 8);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_second_review_by_same_author_is_rejected(pool: PgPool) {
    let title_id = seed_title(&pool).await;
    let (_, token) = create_user_with_token(&pool, "repeat", Role::User).await;

    let first = post_review(&pool, title_id, &token, json!(8)).await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = post_review(&pool, title_id, &token, json!(2)).await;

    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    let json = body_json(second).await;
    assert_eq!(json["code"], "DUPLICATE_REVIEW");
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("already reviewed"));
    assert_eq!(title_rating(&pool, title_id).await, 8);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_out_of_range_scores_are_rejected(pool: PgPool) {
    let title_id = seed_title(&pool).await;
    let (_, token) = create_user_with_token(&pool, "bounds", Role::User).await;

    for score in [json!(0), json!(11), json!(7.5)] {
        let response = post_review(&pool, title_id, &token, score).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["code"], "OUT_OF_RANGE");
    }

    assert_eq!(title_rating(&pool, title_id).await, serde_json::Value::Null);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_non_numeric_scores_are_out_of_range(pool: PgPool) {
    let title_id = seed_title(&pool).await;
    let (_, token) = create_user_with_token(&pool, "typos", Role::User).await;

    for score in [json!("abc"), json!(null), json!(true)] {
        let response = post_review(&pool, title_id, &token, score.clone()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "score {score}");
        let json = body_json(response).await;
        assert_eq!(json["code"], "OUT_OF_RANGE", "score {score}");
    }

    // A missing score is rejected the same way.
    let app = common::build_test_app(pool.clone());
    let response =
        post_json_auth(app, &reviews_uri(title_id), json!({ "text": "no score" }), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "OUT_OF_RANGE");

    // On update, an explicit null is a bad score rather than "unchanged".
    let created = post_review(&pool, title_id, &token, json!(6)).await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let review_id = body_json(created).await["data"]["id"].clone();
    let app = common::build_test_app(pool.clone());
    let response = patch_json_auth(
        app,
        &format!("{}/{review_id}", reviews_uri(title_id)),
        json!({ "score": null }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "OUT_OF_RANGE");

    assert_eq!(title_rating(&pool, title_id).await, 6);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_review_on_missing_title_is_not_found(pool: PgPool) {
    let (_, token) = create_user_with_token(&pool, "lost", Role::User).await;

    let response = post_review(&pool, 999_999, &token, json!(5)).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Update / delete permissions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_non_author_cannot_edit_but_moderator_can(pool: PgPool) {
    let title_id = seed_title(&pool).await;
    let (_, author) = create_user_with_token(&pool, "author", Role::User).await;
    let (_, stranger) = create_user_with_token(&pool, "stranger", Role::User).await;
    let (_, moderator) = create_user_with_token(&pool, "moderator", Role::Moderator).await;

    let created = body_json(post_review(&pool, title_id, &author, json!(4)).await).await;
    let review_uri = format!("{}/{}", reviews_uri(title_id), created["data"]["id"]);
    let patch = json!({ "score": 10 });

    let app = common::build_test_app(pool.clone());
    let response = patch_json_auth(app, &review_uri, patch.clone(), &stranger).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(title_rating(&pool, title_id).await, 4);

    let app = common::build_test_app(pool.clone());
    let response = patch_json_auth(app, &review_uri, patch, &moderator).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["score"], 10);
    assert_eq!(json["data"]["text"], "Worth reading");
    assert_eq!(title_rating(&pool, title_id).await, 10);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_author_delete_clears_rating(pool: PgPool) {
    let title_id = seed_title(&pool).await;
    let (_, author) = create_user_with_token(&pool, "author", Role::User).await;

    let created = body_json(post_review(&pool, title_id, &author, json!(6)).await).await;
    let review_uri = format!("{}/{}", reviews_uri(title_id), created["data"]["id"]);

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &review_uri, &author).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(title_rating(&pool, title_id).await, serde_json::Value::Null);

    let app = common::build_test_app(pool.clone());
    let response = get(app, &review_uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_missing_review_is_404_before_permission_check(pool: PgPool) {
    let title_id = seed_title(&pool).await;
    let (_, stranger) = create_user_with_token(&pool, "stranger", Role::User).await;
    let app = common::build_test_app(pool);

    let uri = format!("{}/999999", reviews_uri(title_id));
    let response = patch_json_auth(app, &uri, json!({ "score": 3 }), &stranger).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_two_reviews_average_with_half_up_rounding(pool: PgPool) {
    let title_id = seed_title(&pool).await;
    let (_, a) = create_user_with_token(&pool, "reader_a", Role::User).await;
    let (_, b) = create_user_with_token(&pool, "reader_b", Role::User).await;

    post_review(&pool, title_id, &a, json!(7)).await;
    post_review(&pool, title_id, &b, json!(8)).await;

    assert_eq!(title_rating(&pool, title_id).await, 8);
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_comment_lifecycle(pool: PgPool) {
    let title_id = seed_title(&pool).await;
    let (_, author) = create_user_with_token(&pool, "author", Role::User).await;
    let (_, commenter) = create_user_with_token(&pool, "commenter", Role::User).await;

    let review = body_json(post_review(&pool, title_id, &author, json!(9)).await).await;
    let comments_uri = format!(
        "{}/{}/comments",
        reviews_uri(title_id),
        review["data"]["id"]
    );

    // Anonymous cannot comment.
    let app = common::build_test_app(pool.clone());
    let response = post_json(app, &comments_uri, json!({ "text": "hi" })).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, &comments_uri, json!({ "text": "Agreed" }), &commenter).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let comment = body_json(response).await;
    assert_eq!(comment["data"]["author"], "commenter");
    let comment_uri = format!("{comments_uri}/{}", comment["data"]["id"]);

    // The review author does not own the comment.
    let app = common::build_test_app(pool.clone());
    let response = patch_json_auth(app, &comment_uri, json!({ "text": "edited" }), &author).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool.clone());
    let response =
        patch_json_auth(app, &comment_uri, json!({ "text": "Strongly agreed" }), &commenter).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["text"], "Strongly agreed");

    let app = common::build_test_app(pool.clone());
    let response = get(app, &comments_uri).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 1);

    // Comments never touch the rating.
    assert_eq!(title_rating(&pool, title_id).await, 9);

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &comment_uri, &commenter).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_blank_comment_is_rejected(pool: PgPool) {
    let title_id = seed_title(&pool).await;
    let (_, author) = create_user_with_token(&pool, "author", Role::User).await;
    let review = body_json(post_review(&pool, title_id, &author, json!(9)).await).await;
    let comments_uri = format!(
        "{}/{}/comments",
        reviews_uri(title_id),
        review["data"]["id"]
    );

    let app = common::build_test_app(pool);
    let response = post_json_auth(app, &comments_uri, json!({ "text": "   " }), &author).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_comments_on_review_of_other_title_are_not_found(pool: PgPool) {
    let title_id = seed_title(&pool).await;
    let other_title = seed_title(&pool).await;
    let (_, author) = create_user_with_token(&pool, "author", Role::User).await;
    let review = body_json(post_review(&pool, title_id, &author, json!(9)).await).await;

    let app = common::build_test_app(pool);
    let uri = format!(
        "{}/{}/comments",
        reviews_uri(other_title),
        review["data"]["id"]
    );
    let response = get(app, &uri).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
