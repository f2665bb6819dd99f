use crate::{
    api::handlers::{bearer_token, ErrorResponse},
    cli::globals::GlobalArgs,
    store::{UserStore, UserSummary},
};
use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, instrument};
use utoipa::ToSchema;

/// Debug listing page size.
const LIST_LIMIT: i64 = 50;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct UsersResponse {
    pub users: Vec<UserSummary>,
}

#[utoipa::path(
    get,
    path = "/api/auth/users",
    responses(
        (status = 200, description = "Most recently created rows, newest first", body = UsersResponse),
        (status = 401, description = "Missing or invalid debug token", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse),
    ),
    tag = "debug"
)]
// axum handler for the debug user listing, only mounted with --debug-users
#[instrument(skip_all)]
pub async fn users(
    store: Extension<Arc<dyn UserStore>>,
    globals: Extension<GlobalArgs>,
    headers: HeaderMap,
) -> Response {
    let Some(expected) = globals.debug_token.as_ref() else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new("Unauthorized")),
        )
            .into_response();
    };

    match bearer_token(&headers) {
        Some(token) if token == expected.expose_secret() => {}
        _ => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new("Unauthorized")),
            )
                .into_response();
        }
    }

    match store.list_recent(LIST_LIMIT).await {
        Ok(users) => (StatusCode::OK, Json(UsersResponse { users })).into_response(),
        Err(e) => {
            error!("List users error: {:?}", e);

            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to list users")),
            )
                .into_response()
        }
    }
}
