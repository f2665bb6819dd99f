use crate::{
    api::handlers::{valid_email, AuthResponse, ErrorResponse, UserView},
    cli::globals::GlobalArgs,
    password,
    provider::{self, IdentityProvider},
    store::UserStore,
    token,
};
use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Missing fields", body = ErrorResponse),
        (status = 401, description = "Provider rejected the credentials", body = ErrorResponse),
        (status = 500, description = "Downstream failure", body = ErrorResponse),
    ),
    tag = "auth"
)]
// axum handler for login
#[instrument(skip_all)]
pub async fn login(
    store: Extension<Arc<dyn UserStore>>,
    provider: Extension<Arc<dyn IdentityProvider>>,
    globals: Extension<GlobalArgs>,
    payload: Option<Json<LoginRequest>>,
) -> Response {
    let Some(Json(request)) = payload else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Email and password are required")),
        )
            .into_response();
    };

    if request.email.trim().is_empty() || request.password.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Email and password are required")),
        )
            .into_response();
    }

    if !valid_email(&request.email) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Invalid email")),
        )
            .into_response();
    }

    // The provider owns verification. A success without an identity object
    // gets the generic message rather than leaking detail.
    let identity = match provider
        .sign_in_with_password(&request.email, &request.password)
        .await
    {
        Ok(Some(identity)) => identity,
        Ok(None) => {
            debug!("Provider verified credentials but returned no identity");

            return (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new("Invalid email or password")),
            )
                .into_response();
        }
        Err(provider::Error::Rejected(message)) => {
            debug!("Provider rejected login: {}", message);

            return (StatusCode::UNAUTHORIZED, Json(ErrorResponse::new(message))).into_response();
        }
        Err(e) => {
            error!("Login error: {:?}", e);

            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to login")),
            )
                .into_response();
        }
    };

    // Read the mirror row, creating it if the store has fallen behind the
    // provider (account created elsewhere, or an earlier local write failed).
    let local_user = match store.find_by_email(&request.email).await {
        Ok(Some(user)) => Some(user),
        Ok(None) => {
            let password_hash = match password::hash(&request.password) {
                Ok(hash) => hash,
                Err(e) => {
                    error!("Login error: {:?}", e);

                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(ErrorResponse::new("Failed to login")),
                    )
                        .into_response();
                }
            };

            match store
                .create(&request.email, identity.name.as_deref(), &password_hash)
                .await
            {
                Ok(user) => {
                    debug!(id = user.id, email = %user.email, "local user row healed");

                    Some(user)
                }
                Err(e) => {
                    error!("Error creating user: {:?}", e);

                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(ErrorResponse::new("Failed to login")),
                    )
                        .into_response();
                }
            }
        }
        Err(e) => {
            error!("Error fetching user: {:?}", e);

            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to login")),
            )
                .into_response();
        }
    };

    let token = match token::issue(
        globals.jwt_secret.expose_secret().as_bytes(),
        &identity.id,
        &identity.email,
        Utc::now().timestamp(),
    ) {
        Ok(token) => token,
        Err(e) => {
            error!("Login error: {:?}", e);

            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to login")),
            )
                .into_response();
        }
    };

    // The local row's name wins over the remote metadata
    let name = local_user
        .and_then(|user| user.name)
        .or_else(|| identity.name.clone());

    (
        StatusCode::OK,
        Json(AuthResponse {
            message: "Logged in successfully".to_string(),
            token,
            user: UserView {
                id: identity.id,
                email: identity.email,
                name,
            },
        }),
    )
        .into_response()
}
