//! Identity provider adapter.
//!
//! The provider is the source of truth for authentication. Two operations are
//! consumed on the low-privilege key (`sign_up`, `sign_in_with_password`) and
//! one privileged operation (`update_user_metadata`) that requires the
//! administrative key; without that key the gateway skips the call rather
//! than fail the overall operation.

use crate::APP_USER_AGENT;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

/// Remote identity as reported by the provider, `name` is flattened out of
/// the provider's `user_metadata` object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
}

#[derive(Debug, Error)]
pub enum Error {
    /// The provider rejected the request, carries its human-readable message.
    #[error("{0}")]
    Rejected(String),
    #[error("provider request failed")]
    Transport(#[from] reqwest::Error),
    #[error("invalid provider URL")]
    Url(#[from] url::ParseError),
    #[error("invalid provider URL: {0}")]
    BadUrl(String),
    #[error("administrative key not configured")]
    AdminKeyMissing,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create a new remote identity. `Ok(None)` means the provider reported
    /// success but returned no identity object.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<Option<Identity>, Error>;

    /// Verify an email/password pair. `Ok(None)` means the provider reported
    /// success but returned no identity object.
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<Identity>, Error>;

    /// Push a display name into the remote identity's metadata. Privileged,
    /// requires the administrative key.
    async fn update_user_metadata(&self, id: &str, name: &str) -> Result<(), Error>;

    /// Whether the administrative key is configured.
    fn can_update_metadata(&self) -> bool;
}

/// HTTP implementation targeting a GoTrue-style REST surface.
#[derive(Debug, Clone)]
pub struct HttpProvider {
    client: Client,
    base_url: String,
    api_key: SecretString,
    admin_key: Option<SecretString>,
}

impl HttpProvider {
    /// Build the provider client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(
        base_url: String,
        api_key: SecretString,
        admin_key: Option<SecretString>,
    ) -> Result<Self, Error> {
        let client = Client::builder().user_agent(APP_USER_AGENT).build()?;

        Ok(Self {
            client,
            base_url,
            api_key,
            admin_key,
        })
    }

    fn endpoint_url(&self, endpoint: &str) -> Result<String, Error> {
        endpoint_url(&self.base_url, endpoint)
    }
}

#[instrument]
fn endpoint_url(base_url: &str, endpoint: &str) -> Result<String, Error> {
    let url = Url::parse(base_url)?;

    let scheme = url.scheme();

    let host = url
        .host()
        .ok_or_else(|| Error::BadUrl("no host specified".to_string()))?
        .to_owned();

    let port = match url.port() {
        Some(p) => p,
        None => match scheme {
            "http" => 80,
            "https" => 443,
            _ => return Err(Error::BadUrl(format!("unsupported scheme {scheme}"))),
        },
    };

    let endpoint_url = format!("{scheme}://{host}:{port}{endpoint}");

    debug!("endpoint URL: {}", endpoint);

    Ok(endpoint_url)
}

/// Extract the identity object from a provider response body. Signup returns
/// the identity directly while the password grant wraps it in a session.
fn parse_identity(body: &Value) -> Option<Identity> {
    let user = if body["user"].is_object() {
        &body["user"]
    } else {
        body
    };

    let id = user["id"].as_str()?;
    let email = user["email"].as_str()?;

    Some(Identity {
        id: id.to_string(),
        email: email.to_string(),
        name: user["user_metadata"]["name"].as_str().map(String::from),
    })
}

/// First human-readable message found in a provider error body.
fn extract_message(body: &Value, fallback: &str) -> String {
    ["msg", "error_description", "message", "error"]
        .iter()
        .find_map(|key| body[*key].as_str())
        .unwrap_or(fallback)
        .to_string()
}

async fn rejection(response: reqwest::Response) -> Error {
    let status = response.status();
    let fallback = format!("provider returned {status}");

    match response.json::<Value>().await {
        Ok(body) => Error::Rejected(extract_message(&body, &fallback)),
        Err(_) => Error::Rejected(fallback),
    }
}

#[async_trait]
impl IdentityProvider for HttpProvider {
    #[instrument(skip(self, password))]
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<Option<Identity>, Error> {
        let signup_url = self.endpoint_url("/auth/v1/signup")?;

        let payload = json!({
            "email": email,
            "password": password,
            "data": { "name": name },
        });

        let response = self
            .client
            .post(&signup_url)
            .header("apikey", self.api_key.expose_secret())
            .bearer_auth(self.api_key.expose_secret())
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        let body: Value = response.json().await?;

        Ok(parse_identity(&body))
    }

    #[instrument(skip(self, password))]
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<Identity>, Error> {
        let token_url = self.endpoint_url("/auth/v1/token?grant_type=password")?;

        let payload = json!({
            "email": email,
            "password": password,
        });

        let response = self
            .client
            .post(&token_url)
            .header("apikey", self.api_key.expose_secret())
            .bearer_auth(self.api_key.expose_secret())
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        let body: Value = response.json().await?;

        Ok(parse_identity(&body))
    }

    #[instrument(skip(self))]
    async fn update_user_metadata(&self, id: &str, name: &str) -> Result<(), Error> {
        let Some(admin_key) = &self.admin_key else {
            return Err(Error::AdminKeyMissing);
        };

        let admin_url = self.endpoint_url(&format!("/auth/v1/admin/users/{id}"))?;

        let payload = json!({
            "user_metadata": { "name": name },
        });

        let response = self
            .client
            .put(&admin_url)
            .header("apikey", admin_key.expose_secret())
            .bearer_auth(admin_key.expose_secret())
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        Ok(())
    }

    fn can_update_metadata(&self) -> bool {
        self.admin_key.is_some()
    }
}
