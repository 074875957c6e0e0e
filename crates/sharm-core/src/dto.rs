//! Incoming payloads with their declarative field constraints.
//!
//! Services call [`validator::Validate::validate`] on these before touching
//! the store; failures surface as [`AppError::Validation`].

use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::error::AppError;
use crate::models::Role;

/// Slugs are lowercase ASCII letters, digits and dashes.
pub fn validate_slug(url: &str) -> Result<(), ValidationError> {
    let valid = !url.is_empty()
        && !url.starts_with('-')
        && !url.ends_with('-')
        && url
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if valid {
        Ok(())
    } else {
        let mut error = ValidationError::new("slug");
        error.message = Some("url must be a lowercase slug (a-z, 0-9, '-')".into());
        Err(error)
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserDto {
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 6, message = "password is too short"))]
    pub password: String,
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[validate(length(min = 1, message = "surname must not be empty"))]
    pub surname: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUserDto {
    #[validate(email(message = "email must be a valid address"))]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "password is too short"))]
    pub password: Option<String>,
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "surname must not be empty"))]
    pub surname: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRoleUserDto {
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginDto {
    #[validate(length(min = 1, message = "email must not be empty"))]
    pub email: String,
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// Reference to an existing category. Only the id is read.
#[derive(Debug, Clone, Copy, Deserialize, Validate)]
pub struct CategoryRef {
    #[validate(range(min = 1, message = "category id must be positive"))]
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCategoryDto {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    #[validate(custom(function = "validate_slug"))]
    pub url: String,
    pub description: Option<String>,
    #[validate(nested)]
    pub parent: CategoryRef,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCategoryDto {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    #[validate(nested)]
    pub parent: Option<CategoryRef>,
}

impl UpdateCategoryDto {
    /// Field validation plus the slug rule on the optional `url`.
    pub fn check(&self) -> Result<(), AppError> {
        let mut errors = match self.validate() {
            Ok(()) => validator::ValidationErrors::new(),
            Err(errors) => errors,
        };
        if let Some(Err(e)) = self.url.as_deref().map(validate_slug) {
            errors.add("url", e);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(errors))
        }
    }
}
