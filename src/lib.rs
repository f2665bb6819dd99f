//! # Espejo (Account Sync Gateway)
//!
//! `espejo` is a thin HTTP gateway that delegates credential verification to
//! an external identity provider and mirrors every successfully authenticated
//! account into a local Postgres store.
//!
//! ## Mirror Model
//!
//! The identity provider owns the remote identity and is the source of truth
//! for authentication outcomes. The local `users` row is a denormalized
//! mirror keyed by email, refreshed on signup (upsert) and self-healed on
//! login (create-if-missing). There is no transaction spanning the provider
//! and the store: a provider signup that succeeds while the local write fails
//! leaves an un-mirrored identity until the next successful login recreates
//! the row. This is an accepted eventually-consistent design, not a bug to
//! paper over with retries.
//!
//! ## Session Tokens
//!
//! Sessions are stateless HS256 JWTs carrying the **provider's** user id and
//! email, valid for seven days from issuance. No refresh, no revocation list;
//! validity is purely signature plus expiry.
//!
//! ## Dependencies as Objects
//!
//! The credential store and the identity provider are injected into the
//! handlers as trait objects (`Arc<dyn UserStore>`, `Arc<dyn
//! IdentityProvider>`) constructed once at process start, so tests substitute
//! in-memory fakes without touching global state.

pub mod api;
pub mod cli;
pub mod password;
pub mod provider;
pub mod store;
pub mod token;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
