use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Id of the catalogue root category, inserted by the initial migration.
pub const ROOT_CATEGORY_ID: i64 = 1;

/// Upper bound on a single page of users.
pub const MAX_PAGE_LIMIT: u32 = 100;

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Coarse authorization tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// A stored user account.
///
/// `password` holds the argon2 PHC string and is never serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: Role,
    pub name: String,
    pub surname: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row to insert for a new user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub name: String,
    pub surname: String,
    pub phone: Option<String>,
}

/// Partial update of a user. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserChanges {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub name: Option<String>,
    pub surname: Option<String>,
    pub phone: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self == &UserChanges::default()
    }

    /// Apply the changes to an in-memory record.
    pub fn apply_to(&self, user: &mut User) {
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(hash) = &self.password_hash {
            user.password = hash.clone();
        }
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
        if let Some(surname) = &self.surname {
            user.surname = surname.clone();
        }
        if let Some(phone) = &self.phone {
            user.phone = Some(phone.clone());
        }
    }
}

/// Columns a caller may search users by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Name,
    Surname,
    Email,
    Phone,
    Role,
}

impl SearchField {
    /// Column name in the `users` table. Only ever one of a fixed set.
    pub fn column(&self) -> &'static str {
        match self {
            SearchField::Name => "name",
            SearchField::Surname => "surname",
            SearchField::Email => "email",
            SearchField::Phone => "phone",
            SearchField::Role => "role",
        }
    }

    /// The value of this field on a user, as stored.
    pub fn value_of<'a>(&self, user: &'a User) -> Option<&'a str> {
        match self {
            SearchField::Name => Some(&user.name),
            SearchField::Surname => Some(&user.surname),
            SearchField::Email => Some(&user.email),
            SearchField::Phone => user.phone.as_deref(),
            SearchField::Role => Some(user.role.as_str()),
        }
    }
}

impl FromStr for SearchField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(SearchField::Name),
            "surname" => Ok(SearchField::Surname),
            "email" => Ok(SearchField::Email),
            "phone" => Ok(SearchField::Phone),
            "role" => Ok(SearchField::Role),
            _ => Err(AppError::BadRequest("Invalid search field".into())),
        }
    }
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// A validated page request (1-indexed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Result<Self, AppError> {
        if page == 0 {
            return Err(AppError::BadRequest("page must be at least 1".into()));
        }
        if limit == 0 || limit > MAX_PAGE_LIMIT {
            return Err(AppError::BadRequest(format!(
                "limit must be between 1 and {MAX_PAGE_LIMIT}"
            )));
        }
        Ok(Self { page, limit })
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

/// One page of results plus the totals needed to navigate the rest.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub current_page: u32,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            data,
            total,
            current_page: request.page,
            total_pages: total.div_ceil(u64::from(request.limit)),
        }
    }
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// A node of the catalogue tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub parent_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Row to insert for a new category.
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub parent_id: i64,
}

/// Partial update of a category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryChanges {
    pub title: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub parent_id: Option<i64>,
}

impl CategoryChanges {
    pub fn apply_to(&self, category: &mut Category) {
        if let Some(title) = &self.title {
            category.title = title.clone();
        }
        if let Some(url) = &self.url {
            category.url = url.clone();
        }
        if let Some(description) = &self.description {
            category.description = Some(description.clone());
        }
        if let Some(parent_id) = self.parent_id {
            category.parent_id = Some(parent_id);
        }
    }
}
