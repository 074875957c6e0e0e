use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sharm_core::dto::{
    CategoryRef, CreateCategoryDto, CreateUserDto, LoginDto, UpdateCategoryDto,
    UpdateRoleUserDto, UpdateUserDto,
};
use sharm_core::{AppError, AuthenticatedUser, Category, Page, Role, User};

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SignupRequest {
    #[schema(example = "anna@example.com")]
    pub email: String,
    /// At least 6 characters
    pub password: String,
    pub name: String,
    pub surname: String,
    pub phone: Option<String>,
}

impl From<SignupRequest> for CreateUserDto {
    fn from(req: SignupRequest) -> Self {
        Self {
            email: req.email,
            password: req.password,
            name: req.name,
            surname: req.surname,
            phone: req.phone,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl From<LoginRequest> for LoginDto {
    fn from(req: LoginRequest) -> Self {
        Self {
            email: req.email,
            password: req.password,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    /// HS256 session token, sent back as `Authorization: Bearer <token>`
    pub token: String,
}

impl From<AuthenticatedUser> for AuthResponse {
    fn from(auth: AuthenticatedUser) -> Self {
        Self {
            user: auth.user.into(),
            token: auth.token,
        }
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    #[schema(example = "user")]
    pub role: String,
    pub name: String,
    pub surname: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role.to_string(),
            name: user.name,
            surname: user.surname,
            phone: user.phone,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UserPageResponse {
    pub data: Vec<UserResponse>,
    pub total: u64,
    pub current_page: u32,
    pub total_pages: u64,
}

impl From<Page<User>> for UserPageResponse {
    fn from(page: Page<User>) -> Self {
        Self {
            data: page.data.into_iter().map(UserResponse::from).collect(),
            total: page.total,
            current_page: page.current_page,
            total_pages: page.total_pages,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListUsersQuery {
    /// 1-based page number (default 1)
    pub page: Option<u32>,
    /// Page size, 1 to 100 (default 10)
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct SearchUsersQuery {
    /// One of `name`, `surname`, `email`, `phone`, `role`
    pub field: String,
    /// Case-insensitive substring to look for
    pub value: String,
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub surname: Option<String>,
    pub phone: Option<String>,
}

impl From<UpdateUserRequest> for UpdateUserDto {
    fn from(req: UpdateUserRequest) -> Self {
        Self {
            email: req.email,
            password: req.password,
            name: req.name,
            surname: req.surname,
            phone: req.phone,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateRoleRequest {
    #[schema(example = "admin")]
    pub role: String,
}

impl TryFrom<UpdateRoleRequest> for UpdateRoleUserDto {
    type Error = AppError;

    fn try_from(req: UpdateRoleRequest) -> Result<Self, Self::Error> {
        let role: Role = req.role.parse().map_err(AppError::BadRequest)?;
        Ok(Self { role })
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DeleteUserResponse {
    pub deleted: bool,
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Deserialize, utoipa::ToSchema)]
pub struct ParentRef {
    pub id: i64,
}

impl From<ParentRef> for CategoryRef {
    fn from(parent: ParentRef) -> Self {
        Self { id: parent.id }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateCategoryRequest {
    pub title: String,
    /// Lowercase slug, e.g. `face-creams`
    pub url: String,
    pub description: Option<String>,
    pub parent: ParentRef,
}

impl From<CreateCategoryRequest> for CreateCategoryDto {
    fn from(req: CreateCategoryRequest) -> Self {
        Self {
            title: req.title,
            url: req.url,
            description: req.description,
            parent: req.parent.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdateCategoryRequest {
    pub title: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub parent: Option<ParentRef>,
}

impl From<UpdateCategoryRequest> for UpdateCategoryDto {
    fn from(req: UpdateCategoryRequest) -> Self {
        Self {
            title: req.title,
            url: req.url,
            description: req.description,
            parent: req.parent.map(Into::into),
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CategoryResponse {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    /// `null` only for the catalogue root
    pub parent_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            title: c.title,
            url: c.url,
            description: c.description,
            parent_id: c.parent_id,
            created_at: c.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
