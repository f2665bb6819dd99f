//! API handlers and shared response types.
//!
//! Every failure surfaces as an HTTP status plus a JSON `{"error": ...}`
//! body. The 500 path always carries a generic message, detail stays in the
//! server-side logs.

pub mod health;
pub use self::health::health;

pub mod login;
pub use self::login::login;

pub mod root;
pub use self::root::root;

pub mod signup;
pub use self::signup::signup;

pub mod users;
pub use self::users::users;

#[cfg(test)]
pub mod test_support;


use axum::http::HeaderMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// User view model returned by signup and login, id and email come from the
/// remote identity rather than the local row.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct UserView {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: UserView,
}

/// Lightweight email sanity check used before any provider call.
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

/// Extract the token from an `Authorization: Bearer ...` header.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
