use chrono::{DateTime, Utc};
use sharm_core::error::AppError;
use sharm_core::models::{NewUser, Role, SearchField, User, UserChanges};
use sqlx::{PgPool, Pool, Postgres};

/// Repository for user accounts in PostgreSQL.
#[derive(Clone)]
pub struct UserRepository {
    pool: Pool<Postgres>,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// -- Internal row type for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    password: String,
    role: String,
    name: String,
    surname: String,
    phone: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            password: row.password,
            role: parse_role(row.id, &row.role),
            name: row.name,
            surname: row.surname,
            phone: row.phone,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Unknown role strings fall back to the least privileged role.
fn parse_role(user_id: i64, raw: &str) -> Role {
    raw.parse().unwrap_or_else(|_| {
        tracing::warn!(user_id, role = raw, "unknown role in database, using 'user'");
        Role::User
    })
}

/// Map a sqlx error, turning unique violations into [`AppError::Conflict`].
pub(crate) fn map_write_error(e: sqlx::Error, conflict: &str) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict(conflict.to_string())
        }
        _ => AppError::DatabaseError(e.to_string()),
    }
}

pub(crate) fn is_foreign_key_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}

/// Escape `%`, `_` and `\` so a value matches literally inside a LIKE pattern.
pub(crate) fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

// -- Trait implementation --

impl sharm_core::traits::UserStore for UserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(r#"SELECT * FROM users WHERE email = $1"#)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(row.map(Into::into))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(r#"SELECT * FROM users WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(row.map(Into::into))
    }

    async fn list(&self, offset: u64, limit: u32) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT * FROM users
            ORDER BY created_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(i64::from(limit))
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count(&self) -> Result<u64, AppError> {
        let (count,): (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM users"#)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(count.max(0) as u64)
    }

    async fn insert(&self, user: &NewUser) -> Result<User, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (email, password, role, name, surname, phone)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.name)
        .bind(&user.surname)
        .bind(&user.phone)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "User already exist"))?;

        Ok(row.into())
    }

    async fn update(&self, id: i64, changes: &UserChanges) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET email = COALESCE($2, email),
                password = COALESCE($3, password),
                name = COALESCE($4, name),
                surname = COALESCE($5, surname),
                phone = COALESCE($6, phone),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.email)
        .bind(&changes.password_hash)
        .bind(&changes.name)
        .bind(&changes.surname)
        .bind(&changes.phone)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Email already in use"))?;

        Ok(row.map(Into::into))
    }

    async fn set_role(&self, id: i64, role: Role) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET role = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(role.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(row.map(Into::into))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(r#"DELETE FROM users WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn search(&self, field: SearchField, value: &str) -> Result<Vec<User>, AppError> {
        // `column()` only yields fixed identifiers, so interpolating it is safe.
        let sql = format!(
            r"SELECT * FROM users WHERE {} ILIKE $1 ESCAPE '\' ORDER BY created_at DESC",
            field.column()
        );
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .bind(format!("%{}%", escape_like(value)))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
