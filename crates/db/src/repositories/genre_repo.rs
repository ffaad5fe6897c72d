//! Repository for the `genres` table.

use sqlx::PgPool;
use yamdb_core::types::DbId;

use crate::models::genre::{CreateGenre, Genre, UpdateGenre};
use crate::repositories::contains_pattern;

/// Column list for genres queries.
const COLUMNS: &str = "id, name, slug, created_at";

/// Provides CRUD operations for genres, addressed by slug.
pub struct GenreRepo;

impl GenreRepo {
    /// List genres ordered by name, optionally filtered by a name substring.
    pub async fn list(
        pool: &PgPool,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Genre>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM genres
             WHERE ($1::text IS NULL OR name ILIKE $1)
             ORDER BY name ASC, id ASC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Genre>(&query)
            .bind(search.map(contains_pattern))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Find a genre by its slug.
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Genre>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM genres WHERE slug = $1");
        sqlx::query_as::<_, Genre>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// Create a new genre, returning the created row.
    ///
    /// A duplicate slug surfaces as a `uq_genres_slug` violation.
    pub async fn create(pool: &PgPool, input: &CreateGenre) -> Result<Genre, sqlx::Error> {
        let query =
            format!("INSERT INTO genres (name, slug) VALUES ($1, $2) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Genre>(&query)
            .bind(&input.name)
            .bind(&input.slug)
            .fetch_one(pool)
            .await
    }

    /// Rename a genre. Returns `None` if the slug does not exist.
    pub async fn update(
        pool: &PgPool,
        slug: &str,
        input: &UpdateGenre,
    ) -> Result<Option<Genre>, sqlx::Error> {
        let query = format!(
            "UPDATE genres SET name = COALESCE($1, name)
             WHERE slug = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Genre>(&query)
            .bind(&input.name)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// Delete a genre by slug. Its `genre_titles` links go with it; the
    /// titles themselves are untouched.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, slug: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM genres WHERE slug = $1")
            .bind(slug)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Resolve slugs into ids, preserving input order and dropping duplicates.
    ///
    /// Returns the ids found and the slugs that matched no genre.
    pub async fn ids_for_slugs(
        pool: &PgPool,
        slugs: &[String],
    ) -> Result<(Vec<DbId>, Vec<String>), sqlx::Error> {
        let rows: Vec<(DbId, String)> =
            sqlx::query_as("SELECT id, slug FROM genres WHERE slug = ANY($1)")
                .bind(slugs)
                .fetch_all(pool)
                .await?;

        let mut ids = Vec::with_capacity(slugs.len());
        let mut missing = Vec::new();
        for slug in slugs {
            match rows.iter().find(|(_, s)| s == slug) {
                Some((id, _)) if !ids.contains(id) => ids.push(*id),
                Some(_) => {}
                None => missing.push(slug.clone()),
            }
        }
        Ok((ids, missing))
    }
}
