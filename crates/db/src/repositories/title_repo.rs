//! Repository for the `titles` and `genre_titles` tables.
//!
//! `titles.rating` is written only by [`TitleRepo::set_rating`], which the
//! rating aggregator calls inside the review write transaction.

use std::collections::HashMap;

use sqlx::{PgConnection, PgPool};
use yamdb_core::types::DbId;

use crate::models::title::{
    NewTitle, TaxonRef, Title, TitleChanges, TitleFilter, TitleGenreRow, TitleRow,
};
use crate::repositories::contains_pattern;

/// Select list for titles joined with their category.
const TITLE_SELECT: &str = "SELECT t.id, t.name, t.year, t.description, t.rating, \
    c.name AS category_name, c.slug AS category_slug \
    FROM titles t LEFT JOIN categories c ON c.id = t.category_id";

/// Provides CRUD operations for titles and their genre links.
pub struct TitleRepo;

impl TitleRepo {
    /// List titles matching `filter`, ordered by id.
    pub async fn list(
        pool: &PgPool,
        filter: &TitleFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Title>, sqlx::Error> {
        let query = format!(
            "{TITLE_SELECT}
             WHERE ($1::int IS NULL OR t.year = $1)
               AND ($2::text IS NULL OR c.slug ILIKE $2)
               AND ($3::text IS NULL OR EXISTS (
                    SELECT 1 FROM genre_titles gt
                    JOIN genres g ON g.id = gt.genre_id
                    WHERE gt.title_id = t.id AND g.slug ILIKE $3))
               AND ($4::text IS NULL OR t.name ILIKE $4)
             ORDER BY t.id ASC
             LIMIT $5 OFFSET $6"
        );
        let rows = sqlx::query_as::<_, TitleRow>(&query)
            .bind(filter.year)
            .bind(filter.category.as_deref().map(contains_pattern))
            .bind(filter.genre.as_deref().map(contains_pattern))
            .bind(filter.name.as_deref().map(contains_pattern))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        Self::attach_genres(pool, rows).await
    }

    /// Find a title by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Title>, sqlx::Error> {
        let query = format!("{TITLE_SELECT} WHERE t.id = $1");
        let row = sqlx::query_as::<_, TitleRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        match row {
            Some(row) => Ok(Self::attach_genres(pool, vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Check whether a title exists.
    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM titles WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }

    /// Create a title and its genre links in one transaction.
    pub async fn create(pool: &PgPool, input: &NewTitle) -> Result<Title, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let (id,): (DbId,) = sqlx::query_as(
            "INSERT INTO titles (name, year, description, category_id)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(&input.name)
        .bind(input.year)
        .bind(&input.description)
        .bind(input.category_id)
        .fetch_one(&mut *tx)
        .await?;

        Self::replace_genres(&mut *tx, id, &input.genre_ids).await?;
        tx.commit().await?;

        Self::find_by_id(pool, id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    /// Apply a patch. Returns `None` if the title does not exist.
    ///
    /// `rating` is not patchable; it only changes through review writes.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        changes: &TitleChanges,
    ) -> Result<Option<Title>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let updated: Option<(DbId,)> = sqlx::query_as(
            "UPDATE titles SET
                name = COALESCE($1, name),
                year = COALESCE($2, year),
                description = COALESCE($3, description),
                category_id = CASE WHEN $4 THEN $5 ELSE category_id END
             WHERE id = $6
             RETURNING id",
        )
        .bind(&changes.name)
        .bind(changes.year)
        .bind(&changes.description)
        .bind(changes.category_id.is_some())
        .bind(changes.category_id.flatten())
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        if updated.is_none() {
            return Ok(None);
        }

        if let Some(genre_ids) = &changes.genre_ids {
            sqlx::query("DELETE FROM genre_titles WHERE title_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            Self::replace_genres(&mut *tx, id, genre_ids).await?;
        }

        tx.commit().await?;
        Self::find_by_id(pool, id).await
    }

    /// Delete a title. Its reviews, their comments, and its genre links are
    /// removed by `ON DELETE CASCADE`.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM titles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Take the per-title row lock for the rest of the enclosing transaction.
    ///
    /// Review writes for the same title serialize on this lock; writes for
    /// different titles do not contend. Returns `false` if the title does not
    /// exist.
    pub async fn lock_for_update(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let row: Option<(DbId,)> =
            sqlx::query_as("SELECT id FROM titles WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?;
        Ok(row.is_some())
    }

    /// Overwrite the stored rating.
    pub async fn set_rating(
        conn: &mut PgConnection,
        id: DbId,
        rating: Option<i16>,
    ) -> Result<(), sqlx::Error> {
        let result = sqlx::query("UPDATE titles SET rating = $1 WHERE id = $2")
            .bind(rating)
            .bind(id)
            .execute(&mut *conn)
            .await?;
        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }
        Ok(())
    }

    async fn replace_genres(
        conn: &mut PgConnection,
        title_id: DbId,
        genre_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        if genre_ids.is_empty() {
            return Ok(());
        }
        sqlx::query(
            "INSERT INTO genre_titles (title_id, genre_id)
             SELECT $1, UNNEST($2::bigint[])
             ON CONFLICT DO NOTHING",
        )
        .bind(title_id)
        .bind(genre_ids)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Load genres for every row in one query and build read models.
    async fn attach_genres(pool: &PgPool, rows: Vec<TitleRow>) -> Result<Vec<Title>, sqlx::Error> {
        let ids: Vec<DbId> = rows.iter().map(|r| r.id).collect();
        let links = sqlx::query_as::<_, TitleGenreRow>(
            "SELECT gt.title_id, g.name, g.slug
             FROM genre_titles gt
             JOIN genres g ON g.id = gt.genre_id
             WHERE gt.title_id = ANY($1)
             ORDER BY g.name ASC",
        )
        .bind(&ids)
        .fetch_all(pool)
        .await?;

        let mut by_title: HashMap<DbId, Vec<TaxonRef>> = HashMap::new();
        for link in links {
            by_title.entry(link.title_id).or_default().push(TaxonRef {
                name: link.name,
                slug: link.slug,
            });
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let genres = by_title.remove(&row.id).unwrap_or_default();
                Title::from_row(row, genres)
            })
            .collect())
    }
}
