use axum::response::{IntoResponse, Json};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/api",
    responses(
        (status = 200, description = "API welcome message"),
    ),
    tag = "auth"
)]
// axum handler for the API root
pub async fn root() -> impl IntoResponse {
    Json(json!({ "message": "Welcome to API" }))
}
