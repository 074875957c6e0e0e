use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, patch, post};
use axum::{Extension, Router, middleware};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use sharm_core::dto::UpdateRoleUserDto;
use sharm_core::{AppError, CategoryService, Requester, UserService};
use sharm_db::{CategoryRepository, UserRepository};

use crate::auth::{require_admin, require_auth};
use crate::dto::{
    AuthResponse, CategoryResponse, CreateCategoryRequest, DeleteUserResponse, HealthResponse,
    ListUsersQuery, LoginRequest, SearchUsersQuery, SignupRequest, UpdateCategoryRequest,
    UpdateRoleRequest, UpdateUserRequest, UserPageResponse, UserResponse,
};
use crate::error::ApiError;
use crate::openapi::ApiDoc;
use crate::state::AppState;

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_LIMIT: u32 = 10;

/// Build the full router: the JSON API under `/api` plus Swagger UI at `/documents`.
pub fn router(state: Arc<AppState>) -> Router {
    let public = Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/categories", get(list_categories))
        .route("/categories/{id}", get(get_category))
        .route("/categories/{id}/children", get(category_children))
        .route("/health", get(health));

    let authenticated = Router::new()
        .route("/auth/profile", get(profile))
        .route("/users/{id}", get(get_user).patch(update_user))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // Layers run bottom-up: authentication first, then the role check.
    let admin = Router::new()
        .route("/users", get(list_users))
        .route("/users/search", get(search_users))
        .route("/users/{id}", delete(delete_user))
        .route("/users/{id}/role", patch(update_role))
        .route("/categories", post(create_category))
        .route(
            "/categories/{id}",
            patch(update_category).delete(delete_category),
        )
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let api = public.merge(authenticated).merge(admin);

    Router::new()
        .nest("/api", api)
        .merge(SwaggerUi::new("/documents").url("/documents-json", ApiDoc::openapi()))
        .with_state(state)
}

fn user_service(state: &AppState) -> UserService<UserRepository> {
    UserService::new(state.db.user_repo(), state.keys.clone())
}

fn category_service(state: &AppState) -> CategoryService<CategoryRepository> {
    CategoryService::new(state.db.category_repo())
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid payload", body = crate::dto::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::dto::ErrorResponse),
    ),
    tag = "API"
)]
pub async fn signup(
    State(state): State<Arc<AppState>>,
    axum::Json(body): axum::Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let auth = user_service(&state).create(body.into()).await?;
    Ok((StatusCode::CREATED, axum::Json(AuthResponse::from(auth))))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = crate::dto::ErrorResponse),
    ),
    tag = "API"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    axum::Json(body): axum::Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let auth = user_service(&state).login(body.into()).await?;
    Ok(axum::Json(AuthResponse::from(auth)))
}

#[utoipa::path(
    get,
    path = "/api/auth/profile",
    responses(
        (status = 200, description = "The caller's account", body = UserResponse),
        (status = 401, description = "Unauthorized", body = crate::dto::ErrorResponse),
        (status = 404, description = "Account no longer exists", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "API"
)]
pub async fn profile(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Requester>,
) -> Result<impl IntoResponse, ApiError> {
    let user = user_service(&state).profile(&requester).await?;
    Ok(axum::Json(UserResponse::from(user)))
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "One page of users, newest first", body = UserPageResponse),
        (status = 400, description = "Invalid page or limit", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::dto::ErrorResponse),
        (status = 403, description = "Admin role required", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "API"
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListUsersQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = user_service(&state)
        .find_all(
            query.page.unwrap_or(DEFAULT_PAGE),
            query.limit.unwrap_or(DEFAULT_LIMIT),
        )
        .await?;
    Ok(axum::Json(UserPageResponse::from(page)))
}

#[utoipa::path(
    get,
    path = "/api/users/search",
    params(SearchUsersQuery),
    responses(
        (status = 200, description = "Matching users", body = Vec<UserResponse>),
        (status = 400, description = "Invalid search field", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::dto::ErrorResponse),
        (status = 403, description = "Admin role required", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "API"
)]
pub async fn search_users(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchUsersQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let users = user_service(&state)
        .search_by_field(&query.field, &query.value)
        .await?;
    Ok(axum::Json(
        users.into_iter().map(UserResponse::from).collect::<Vec<_>>(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(
        ("id" = i64, Path, description = "User ID; ignored for non-admin callers")
    ),
    responses(
        (status = 200, description = "User details", body = UserResponse),
        (status = 401, description = "Unauthorized", body = crate::dto::ErrorResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "API"
)]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Requester>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let user = user_service(&state)
        .find_by_id(id, &requester)
        .await?
        .ok_or_else(AppError::user_not_found)?;
    Ok(axum::Json(UserResponse::from(user)))
}

#[utoipa::path(
    patch,
    path = "/api/users/{id}",
    params(
        ("id" = i64, Path, description = "User ID; ignored for non-admin callers")
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "The record as it was before the update", body = UserResponse),
        (status = 400, description = "Invalid payload", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::dto::ErrorResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
        (status = 409, description = "Email already in use", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "API"
)]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Requester>,
    Path(id): Path<i64>,
    axum::Json(body): axum::Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let previous = user_service(&state)
        .update_user(id, body.into(), &requester)
        .await?;
    Ok(axum::Json(UserResponse::from(previous)))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User deleted", body = DeleteUserResponse),
        (status = 401, description = "Unauthorized", body = crate::dto::ErrorResponse),
        (status = 403, description = "Admin role required", body = crate::dto::ErrorResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "API"
)]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Requester>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = user_service(&state).delete_user(id, &requester).await?;
    Ok(axum::Json(DeleteUserResponse { deleted }))
}

#[utoipa::path(
    patch,
    path = "/api/users/{id}/role",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Unknown role", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::dto::ErrorResponse),
        (status = 403, description = "Admin role required", body = crate::dto::ErrorResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "API"
)]
pub async fn update_role(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Requester>,
    Path(id): Path<i64>,
    axum::Json(body): axum::Json<UpdateRoleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let dto = UpdateRoleUserDto::try_from(body)?;
    let user = user_service(&state)
        .update_role(dto, id, &requester)
        .await?;
    Ok(axum::Json(UserResponse::from(user)))
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "All categories ordered by id", body = Vec<CategoryResponse>),
    ),
    tag = "API"
)]
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let categories = category_service(&state).find_all().await?;
    Ok(axum::Json(
        categories
            .into_iter()
            .map(CategoryResponse::from)
            .collect::<Vec<_>>(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    params(
        ("id" = i64, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category details", body = CategoryResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
    ),
    tag = "API"
)]
pub async fn get_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let category = category_service(&state)
        .find_one(id)
        .await?
        .ok_or_else(|| AppError::category_not_found(id))?;
    Ok(axum::Json(CategoryResponse::from(category)))
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}/children",
    params(
        ("id" = i64, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Direct subcategories", body = Vec<CategoryResponse>),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
    ),
    tag = "API"
)]
pub async fn category_children(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let children = category_service(&state).children(id).await?;
    Ok(axum::Json(
        children
            .into_iter()
            .map(CategoryResponse::from)
            .collect::<Vec<_>>(),
    ))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Invalid payload", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::dto::ErrorResponse),
        (status = 403, description = "Admin role required", body = crate::dto::ErrorResponse),
        (status = 404, description = "Parent not found", body = crate::dto::ErrorResponse),
        (status = 409, description = "Slug already in use", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "API"
)]
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    axum::Json(body): axum::Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let category = category_service(&state).create(body.into()).await?;
    Ok((
        StatusCode::CREATED,
        axum::Json(CategoryResponse::from(category)),
    ))
}

#[utoipa::path(
    patch,
    path = "/api/categories/{id}",
    params(
        ("id" = i64, Path, description = "Category ID")
    ),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Updated category", body = CategoryResponse),
        (status = 400, description = "Invalid payload or cyclic move", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::dto::ErrorResponse),
        (status = 403, description = "Admin role required", body = crate::dto::ErrorResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
        (status = 409, description = "Slug already in use", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "API"
)]
pub async fn update_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    axum::Json(body): axum::Json<UpdateCategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let category = category_service(&state).update(id, body.into()).await?;
    Ok(axum::Json(CategoryResponse::from(category)))
}

#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(
        ("id" = i64, Path, description = "Category ID")
    ),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 400, description = "The root cannot be deleted", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::dto::ErrorResponse),
        (status = 403, description = "Admin role required", body = crate::dto::ErrorResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
        (status = 409, description = "Category has subcategories", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "API"
)]
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    category_service(&state).remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is unhealthy", body = HealthResponse),
    ),
    tag = "API"
)]
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let db_ok = match state.db.health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            false
        }
    };

    let (status, response) = if db_ok {
        (
            StatusCode::OK,
            HealthResponse {
                status: "healthy",
                database: "ok",
            },
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            HealthResponse {
                status: "unhealthy",
                database: "error",
            },
        )
    };

    (status, axum::Json(response))
}
