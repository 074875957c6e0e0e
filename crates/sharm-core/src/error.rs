use thiserror::Error;

/// Application-wide error types for Sharm.
#[derive(Error, Debug)]
pub enum AppError {
    /// The record would collide with an existing one (e.g. duplicate email).
    #[error("{0}")]
    Conflict(String),

    /// The targeted record does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The request is well-formed but not acceptable (bad search field, cycle, ...).
    #[error("{0}")]
    BadRequest(String),

    /// Payload failed declarative field validation.
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// Credentials are missing or wrong.
    #[error("{0}")]
    Unauthorized(String),

    /// The caller is authenticated but lacks the required role.
    #[error("{0}")]
    Forbidden(String),

    /// Session token could not be signed or verified.
    #[error("Token error: {0}")]
    TokenError(#[from] jsonwebtoken::errors::Error),

    /// Password hashing failed.
    #[error("Password hash error: {0}")]
    PasswordHash(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Missing or invalid configuration.
    #[error("Config error: {0}")]
    ConfigError(String),

    /// Generic error.
    #[error("{0}")]
    Generic(String),
}

impl AppError {
    pub fn user_not_found() -> Self {
        AppError::NotFound("User not found".into())
    }

    pub fn category_not_found(id: i64) -> Self {
        AppError::NotFound(format!("Category not found: {id}"))
    }

    /// Moving `id` under `new_parent` would make it its own ancestor.
    pub fn category_cycle(id: i64, new_parent: i64) -> Self {
        AppError::BadRequest(format!(
            "Category cycle: {new_parent} is {id} or one of its descendants"
        ))
    }

    /// Returns true if this error is the caller's fault (4xx family).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::Conflict(_)
                | AppError::NotFound(_)
                | AppError::BadRequest(_)
                | AppError::Validation(_)
                | AppError::Unauthorized(_)
                | AppError::Forbidden(_)
                | AppError::TokenError(_)
        )
    }
}
