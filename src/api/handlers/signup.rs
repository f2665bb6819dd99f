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
use tracing::{debug, error, instrument, warn};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created and mirrored locally", body = AuthResponse),
        (status = 400, description = "Missing fields or provider rejection", body = ErrorResponse),
        (status = 500, description = "Downstream failure", body = ErrorResponse),
    ),
    tag = "auth"
)]
// axum handler for signup
#[instrument(skip_all)]
pub async fn signup(
    store: Extension<Arc<dyn UserStore>>,
    provider: Extension<Arc<dyn IdentityProvider>>,
    globals: Extension<GlobalArgs>,
    payload: Option<Json<SignupRequest>>,
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

    // The provider owns credential creation, it rejects duplicates and weak
    // passwords with its own message.
    let identity = match provider
        .sign_up(&request.email, &request.password, request.name.as_deref())
        .await
    {
        Ok(Some(identity)) => identity,
        Ok(None) => {
            error!("Provider accepted signup but returned no identity");

            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Signup failed")),
            )
                .into_response();
        }
        Err(provider::Error::Rejected(message)) => {
            debug!("Provider rejected signup: {}", message);

            return (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message))).into_response();
        }
        Err(e) => {
            error!("Signup error: {:?}", e);

            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to create user")),
            )
                .into_response();
        }
    };

    // Persist the mirror row with a hashed password
    let password_hash = match password::hash(&request.password) {
        Ok(hash) => hash,
        Err(e) => {
            error!("Signup error: {:?}", e);

            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to create user")),
            )
                .into_response();
        }
    };

    let resolved_name = identity.name.clone().or_else(|| request.name.clone());

    match store
        .upsert(&request.email, resolved_name.as_deref(), &password_hash)
        .await
    {
        Ok(saved) => debug!(id = saved.id, email = %saved.email, "local user row synced"),
        Err(e) => {
            // The remote identity now exists without a local mirror, login's
            // create-if-missing path reconciles it later.
            error!("Error upserting user: {:?}", e);

            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to create user")),
            )
                .into_response();
        }
    }

    // Best-effort metadata sync, requires the administrative key
    if let Some(name) = resolved_name.as_deref() {
        if provider.can_update_metadata() {
            if let Err(e) = provider.update_user_metadata(&identity.id, name).await {
                warn!("Provider metadata sync failed (non-fatal): {}", e);
            }
        }
    }

    let token = match token::issue(
        globals.jwt_secret.expose_secret().as_bytes(),
        &identity.id,
        &identity.email,
        Utc::now().timestamp(),
    ) {
        Ok(token) => token,
        Err(e) => {
            error!("Signup error: {:?}", e);

            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to create user")),
            )
                .into_response();
        }
    };

    (
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User created successfully".to_string(),
            token,
            user: UserView {
                id: identity.id,
                email: identity.email,
                name: resolved_name,
            },
        }),
    )
        .into_response()
}
