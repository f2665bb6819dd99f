use secrecy::SecretString;

/// Deployment environment, gates the CORS default and the debug endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("production") {
            Self::Production
        } else {
            Self::Development
        }
    }

    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Clone)]
pub struct GlobalArgs {
    pub jwt_secret: SecretString,
    pub provider_url: String,
    pub provider_key: SecretString,
    pub provider_admin_key: Option<SecretString>,
    pub frontend_urls: Vec<String>,
    pub environment: Environment,
    pub debug_users: bool,
    pub debug_token: Option<SecretString>,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(jwt_secret: SecretString, provider_url: String, provider_key: SecretString) -> Self {
        Self {
            jwt_secret,
            provider_url,
            provider_key,
            provider_admin_key: None,
            frontend_urls: Vec::new(),
            environment: Environment::default(),
            debug_users: false,
            debug_token: None,
        }
    }
}

impl std::fmt::Debug for GlobalArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalArgs")
            .field("jwt_secret", &"***")
            .field("provider_url", &self.provider_url)
            .field("provider_key", &"***")
            .field(
                "provider_admin_key",
                &self.provider_admin_key.as_ref().map(|_| "***"),
            )
            .field("frontend_urls", &self.frontend_urls)
            .field("environment", &self.environment)
            .field("debug_users", &self.debug_users)
            .field("debug_token", &self.debug_token.as_ref().map(|_| "***"))
            .finish()
    }
}
