use crate::api::handlers;
use crate::store::UserSummary;
use axum::{response::IntoResponse, Json};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::root::root,
        handlers::health::health,
        handlers::users::users,
        handlers::signup::signup,
        handlers::login::login,
    ),
    components(schemas(
        handlers::ErrorResponse,
        handlers::UserView,
        handlers::AuthResponse,
        handlers::signup::SignupRequest,
        handlers::login::LoginRequest,
        handlers::users::UsersResponse,
        UserSummary,
    )),
    tags(
        (name = "auth", description = "Account sync gateway API"),
        (name = "health", description = "Liveness probe"),
        (name = "debug", description = "Development-only endpoints"),
    )
)]
pub struct ApiDoc;

// axum handler for the generated OpenAPI document
pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
