//! Title models.
//!
//! Reads return [`Title`] with its category and genres embedded. Writes
//! reference the category and genres by slug ([`CreateTitle`],
//! [`UpdateTitle`]); handlers resolve slugs into ids ([`NewTitle`],
//! [`TitleChanges`]) before the repository sees them. `rating` appears only
//! on the read side.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use yamdb_core::types::DbId;

use super::double_option;

/* --------------------------------------------------------------------------
Read models
-------------------------------------------------------------------------- */

/// Name and slug of a category or genre, as embedded in a [`Title`].
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct TaxonRef {
    pub name: String,
    pub slug: String,
}

/// A `titles` row joined with its category.
#[derive(Debug, Clone, FromRow)]
pub struct TitleRow {
    pub id: DbId,
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    pub rating: Option<i16>,
    pub category_name: Option<String>,
    pub category_slug: Option<String>,
}

/// A genre link for one title (aggregation query result).
#[derive(Debug, Clone, FromRow)]
pub struct TitleGenreRow {
    pub title_id: DbId,
    pub name: String,
    pub slug: String,
}

/// A title as returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct Title {
    pub id: DbId,
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    /// `null` until the title has at least one review.
    pub rating: Option<i16>,
    pub category: Option<TaxonRef>,
    pub genres: Vec<TaxonRef>,
}

impl Title {
    pub fn from_row(row: TitleRow, genres: Vec<TaxonRef>) -> Self {
        let category = match (row.category_name, row.category_slug) {
            (Some(name), Some(slug)) => Some(TaxonRef { name, slug }),
            _ => None,
        };
        Self {
            id: row.id,
            name: row.name,
            year: row.year,
            description: row.description,
            rating: row.rating,
            category,
            genres,
        }
    }
}

/* --------------------------------------------------------------------------
Write models
-------------------------------------------------------------------------- */

/// DTO for creating a title. `category` and `genres` are slugs.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTitle {
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    pub category: Option<String>,
    #[serde(default, alias = "genre")]
    pub genres: Vec<String>,
}

/// DTO for patching a title. An explicit `"category": null` detaches the
/// category; omitting the field leaves it unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTitle {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub category: Option<Option<String>>,
    #[serde(alias = "genre")]
    pub genres: Option<Vec<String>>,
}

/// A title insert with slugs already resolved to ids.
#[derive(Debug, Clone)]
pub struct NewTitle {
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    pub category_id: Option<DbId>,
    pub genre_ids: Vec<DbId>,
}

/// A title patch with slugs already resolved to ids.
#[derive(Debug, Clone, Default)]
pub struct TitleChanges {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub category_id: Option<Option<DbId>>,
    pub genre_ids: Option<Vec<DbId>>,
}

/// Listing filters (`?year=&category=&genre=&name=`).
///
/// `category` and `genre` match slugs, `name` matches the title name; all
/// three are case-insensitive substring matches.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TitleFilter {
    pub year: Option<i32>,
    pub category: Option<String>,
    pub genre: Option<String>,
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_distinguishes_null_from_absent_category() {
        let absent: UpdateTitle = serde_json::from_str(r#"{"name": "Dune"}"#).unwrap();
        assert_eq!(absent.category, None);

        let cleared: UpdateTitle = serde_json::from_str(r#"{"category": null}"#).unwrap();
        assert_eq!(cleared.category, Some(None));

        let set: UpdateTitle = serde_json::from_str(r#"{"category": "book"}"#).unwrap();
        assert_eq!(set.category, Some(Some("book".to_string())));
    }

    #[test]
    fn create_accepts_singular_genre_key() {
        let input: CreateTitle =
            serde_json::from_str(r#"{"name": "Dune", "year": 1965, "genre": ["sci-fi"]}"#)
                .unwrap();
        assert_eq!(input.genres, vec!["sci-fi".to_string()]);
        assert_eq!(input.category, None);
    }

    #[test]
    fn read_model_serializes_null_rating_and_embedded_category() {
        let row = TitleRow {
            id: 1,
            name: "Dune".into(),
            year: 1965,
            description: None,
            rating: None,
            category_name: Some("Books".into()),
            category_slug: Some("books".into()),
        };
        let json = serde_json::to_value(Title::from_row(row, vec![])).unwrap();
        assert!(json["rating"].is_null());
        assert_eq!(json["category"]["slug"], "books");
        assert_eq!(json["genres"], serde_json::json!([]));
    }
}
