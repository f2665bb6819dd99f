use crate::{
    api,
    cli::globals::{Environment, GlobalArgs},
};
use anyhow::Result;
use secrecy::SecretString;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub jwt_secret: SecretString,
    pub provider_url: String,
    pub provider_key: SecretString,
    pub provider_admin_key: Option<SecretString>,
    pub frontend_urls: Vec<String>,
    pub environment: Environment,
    pub debug_users: bool,
    pub debug_token: Option<SecretString>,
}

/// Execute the server action.
///
/// # Errors
/// Returns an error if the database connection or the listener fails.
pub async fn execute(args: Args) -> Result<()> {
    let mut globals = GlobalArgs::new(args.jwt_secret, args.provider_url, args.provider_key);
    globals.provider_admin_key = args.provider_admin_key;
    globals.frontend_urls = args.frontend_urls;
    globals.environment = args.environment;
    globals.debug_users = args.debug_users;
    globals.debug_token = args.debug_token;

    api::new(args.port, args.dsn, &globals).await
}
