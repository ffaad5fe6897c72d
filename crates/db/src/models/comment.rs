//! Comment models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use yamdb_core::types::{DbId, Timestamp};

/// A `comments` row joined with its author's username.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Comment {
    pub id: DbId,
    pub review_id: DbId,
    #[serde(skip_serializing)]
    pub author_id: DbId,
    /// Author's username.
    pub author: String,
    pub text: String,
    #[serde(rename = "pub_date")]
    pub created_at: Timestamp,
}

/// DTO for creating a comment.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateComment {
    pub text: String,
}

/// DTO for patching a comment.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateComment {
    pub text: Option<String>,
}
