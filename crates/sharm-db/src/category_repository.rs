use chrono::{DateTime, Utc};
use sharm_core::error::AppError;
use sharm_core::models::{Category, CategoryChanges, NewCategory};
use sqlx::{PgExecutor, PgPool, Pool, Postgres};

use crate::user_repository::{is_foreign_key_violation, map_write_error};

/// Advisory lock key serialising re-parenting moves.
const TREE_LOCK_KEY: i64 = 0x5348_4152_4d;

/// Repository for the category tree in PostgreSQL.
#[derive(Clone)]
pub struct CategoryRepository {
    pool: Pool<Postgres>,
}

impl CategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// `id` followed by every ancestor up to the root.
    pub async fn ancestor_ids(&self, id: i64) -> Result<Vec<i64>, AppError> {
        lineage(&self.pool, id).await
    }
}

/// Insert and update only reference the parent, so a foreign-key failure
/// means it is gone.
fn map_category_write_error(e: sqlx::Error) -> AppError {
    if is_foreign_key_violation(&e) {
        return AppError::NotFound("Parent category not found".into());
    }
    map_write_error(e, "Category url already in use")
}

async fn lineage<'e>(executor: impl PgExecutor<'e>, id: i64) -> Result<Vec<i64>, AppError> {
    let rows: Vec<(i64,)> = sqlx::query_as(
        r#"
        WITH RECURSIVE lineage (id, parent_id, depth) AS (
            SELECT id, parent_id, 0 FROM categories WHERE id = $1
            UNION ALL
            SELECT c.id, c.parent_id, l.depth + 1
            FROM categories c
            JOIN lineage l ON c.id = l.parent_id
            WHERE l.depth < 1000
        )
        SELECT id FROM lineage ORDER BY depth
        "#,
    )
    .bind(id)
    .fetch_all(executor)
    .await
    .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: i64,
    title: String,
    url: String,
    description: Option<String>,
    parent_id: Option<i64>,
    created_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            title: row.title,
            url: row.url,
            description: row.description,
            parent_id: row.parent_id,
            created_at: row.created_at,
        }
    }
}

impl sharm_core::traits::CategoryStore for CategoryRepository {
    async fn insert(&self, category: &NewCategory) -> Result<Category, AppError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            INSERT INTO categories (title, url, description, parent_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&category.title)
        .bind(&category.url)
        .bind(&category.description)
        .bind(category.parent_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_category_write_error)?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Category>, AppError> {
        let row = sqlx::query_as::<_, CategoryRow>(r#"SELECT * FROM categories WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(row.map(Into::into))
    }

    async fn find_by_url(&self, url: &str) -> Result<Option<Category>, AppError> {
        let row = sqlx::query_as::<_, CategoryRow>(r#"SELECT * FROM categories WHERE url = $1"#)
            .bind(url)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(row.map(Into::into))
    }

    async fn list(&self) -> Result<Vec<Category>, AppError> {
        let rows = sqlx::query_as::<_, CategoryRow>(r#"SELECT * FROM categories ORDER BY id"#)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn children(&self, id: i64) -> Result<Vec<Category>, AppError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r#"SELECT * FROM categories WHERE parent_id = $1 ORDER BY id"#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(
        &self,
        id: i64,
        changes: &CategoryChanges,
    ) -> Result<Option<Category>, AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        // Moves take the tree lock, so each sees the previous one committed.
        if let Some(new_parent) = changes.parent_id {
            sqlx::query(r#"SELECT pg_advisory_xact_lock($1)"#)
                .bind(TREE_LOCK_KEY)
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::DatabaseError(e.to_string()))?;

            if lineage(&mut *tx, new_parent).await?.contains(&id) {
                tracing::debug!(category_id = id, new_parent, "move would close a cycle");
                return Err(AppError::category_cycle(id, new_parent));
            }
        }

        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            UPDATE categories
            SET title = COALESCE($2, title),
                url = COALESCE($3, url),
                description = COALESCE($4, description),
                parent_id = COALESCE($5, parent_id)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.title)
        .bind(&changes.url)
        .bind(&changes.description)
        .bind(changes.parent_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_category_write_error)?;

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(row.map(Into::into))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(r#"DELETE FROM categories WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    AppError::Conflict("Category still has subcategories".into())
                } else {
                    AppError::DatabaseError(e.to_string())
                }
            })?;

        Ok(result.rows_affected() > 0)
    }
}
