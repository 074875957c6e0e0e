use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Sharm Beauty API",
        version = "1.0",
        description = "API for Sharm Beauty"
    ),
    paths(
        crate::routes::signup,
        crate::routes::login,
        crate::routes::profile,
        crate::routes::list_users,
        crate::routes::search_users,
        crate::routes::get_user,
        crate::routes::update_user,
        crate::routes::delete_user,
        crate::routes::update_role,
        crate::routes::list_categories,
        crate::routes::get_category,
        crate::routes::category_children,
        crate::routes::create_category,
        crate::routes::update_category,
        crate::routes::delete_category,
        crate::routes::health,
    ),
    components(schemas(
        crate::dto::SignupRequest,
        crate::dto::LoginRequest,
        crate::dto::AuthResponse,
        crate::dto::UserResponse,
        crate::dto::UserPageResponse,
        crate::dto::UpdateUserRequest,
        crate::dto::UpdateRoleRequest,
        crate::dto::DeleteUserResponse,
        crate::dto::ParentRef,
        crate::dto::CreateCategoryRequest,
        crate::dto::UpdateCategoryRequest,
        crate::dto::CategoryResponse,
        crate::dto::HealthResponse,
        crate::dto::ErrorResponse,
    )),
    tags(
        (name = "API", description = "Sharm Beauty accounts and catalogue"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Adds the Bearer token security scheme to the OpenAPI document.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "Session token returned by /api/auth/signup and /api/auth/login.",
                        ))
                        .build(),
                ),
            );
        }
    }
}
