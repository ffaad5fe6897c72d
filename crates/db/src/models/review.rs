//! Review models.

use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use yamdb_core::types::{DbId, Timestamp};

/// A `reviews` row joined with its author's username.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Review {
    pub id: DbId,
    #[serde(rename = "title")]
    pub title_id: DbId,
    #[serde(skip_serializing)]
    pub author_id: DbId,
    /// Author's username.
    pub author: String,
    pub text: String,
    pub score: i16,
    #[serde(rename = "pub_date")]
    pub created_at: Timestamp,
}

/// DTO for creating a review. `score` stays a raw JSON value so that strings,
/// fractions, and out-of-range numbers are rejected with a range error rather
/// than a deserialization failure. A missing score reads as `null`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReview {
    pub text: String,
    #[serde(default)]
    pub score: serde_json::Value,
}

/// DTO for patching a review. Only `text` and `score` are mutable.
///
/// An explicit `"score": null` is kept as `Some(Value::Null)` and rejected,
/// not treated as "unchanged".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateReview {
    pub text: Option<String>,
    #[serde(default, deserialize_with = "present_value")]
    pub score: Option<serde_json::Value>,
}

fn present_value<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}
