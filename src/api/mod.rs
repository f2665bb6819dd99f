use crate::{
    cli::globals::{Environment, GlobalArgs},
    provider::{HttpProvider, IdentityProvider},
    store::{PgUserStore, UserStore},
};
use anyhow::{anyhow, Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method, Request,
    },
    routing::{get, post},
    Extension, Router,
};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;
use url::Url;

pub mod handlers;
mod openapi;

pub use openapi::ApiDoc;

/// Start the server
///
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, dsn: String, globals: &GlobalArgs) -> Result<()> {
    // Connect to database
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&dsn)
        .await
        .context("Failed to connect to database")?;

    // Dependencies are constructed once here and injected as trait objects,
    // tests substitute in-memory fakes.
    let store: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool));
    let provider: Arc<dyn IdentityProvider> = Arc::new(
        HttpProvider::new(
            globals.provider_url.clone(),
            globals.provider_key.clone(),
            globals.provider_admin_key.clone(),
        )
        .context("Failed to build identity provider client")?,
    );

    let app = router(globals, store, provider)?;

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

/// Build the application router with the middleware stack and dependencies.
///
/// # Errors
/// Returns an error if a configured frontend origin cannot be parsed.
pub fn router(
    globals: &GlobalArgs,
    store: Arc<dyn UserStore>,
    provider: Arc<dyn IdentityProvider>,
) -> Result<Router> {
    let cors = CorsLayer::new()
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(allow_origin(globals)?)
        .allow_credentials(true);

    let mut app = Router::new()
        .route("/api", get(handlers::root))
        .route("/api/openapi.json", get(openapi::openapi_json))
        .route("/api/auth/health", get(handlers::health))
        .route("/api/auth/signup", post(handlers::signup))
        .route("/api/auth/login", post(handlers::login));

    // Debug-only listing, mounted only when explicitly enabled and gated by
    // a bearer token in the handler.
    if globals.debug_users {
        app = app.route("/api/auth/users", get(handlers::users));
    }

    Ok(app.layer(
        ServiceBuilder::new()
            .layer(SetRequestHeaderLayer::if_not_present(
                HeaderName::from_static("x-request-id"),
                |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
            ))
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                "x-request-id",
            )))
            .layer(TraceLayer::new_for_http().make_span_with(make_span))
            .layer(cors)
            .layer(Extension(globals.clone()))
            .layer(Extension(store))
            .layer(Extension(provider)),
    ))
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

/// CORS origin policy: the configured allow-list when present, otherwise
/// mirror any origin outside production and allow nothing in production.
fn allow_origin(globals: &GlobalArgs) -> Result<AllowOrigin> {
    if globals.frontend_urls.is_empty() {
        return Ok(match globals.environment {
            Environment::Production => AllowOrigin::list(Vec::<HeaderValue>::new()),
            Environment::Development => AllowOrigin::mirror_request(),
        });
    }

    let mut origins = Vec::with_capacity(globals.frontend_urls.len());
    for url in &globals.frontend_urls {
        origins.push(frontend_origin(url)?);
    }

    Ok(AllowOrigin::list(origins))
}

fn frontend_origin(frontend_url: &str) -> Result<HeaderValue> {
    let parsed =
        Url::parse(frontend_url).with_context(|| format!("Invalid frontend URL: {frontend_url}"))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| anyhow!("Frontend URL must include a valid host: {frontend_url}"))?;
    let port = parsed
        .port()
        .map_or_else(String::new, |port| format!(":{port}"));
    let origin = format!("{}://{}{}", parsed.scheme(), host, port);
    HeaderValue::from_str(&origin).context("Failed to build frontend origin header")
}
