use storefront_auth_types::token::validate_signing_key;

/// SMTP settings. An empty host switches the mailer to no-op mode.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// SMTP relay host. Env var: `SMTP_HOST` (optional).
    pub host: String,
    /// SMTP relay port (default 587). Env var: `SMTP_PORT`.
    pub port: u16,
    /// Sender mailbox (e.g. `Storefront <noreply@example.com>`). Env var: `SMTP_FROM`.
    pub from: String,
    /// Env var: `SMTP_USERNAME` (optional).
    pub username: Option<String>,
    /// Env var: `SMTP_PASSWORD` (optional).
    pub password: Option<String>,
}

/// Identity service configuration loaded from environment variables.
#[derive(Debug)]
pub struct IdentityConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Redis connection URL (message transport).
    pub redis_url: String,
    /// HMAC secret for signing access tokens. Must be at least 256 bits.
    pub jwt_secret: String,
    /// Topic exchange name for lifecycle events (default `storefront.users`).
    /// Env var: `EVENT_EXCHANGE`.
    pub exchange: String,
    /// TCP port to listen on (default 3210). Env var: `IDENTITY_PORT`.
    pub identity_port: u16,
    pub smtp: SmtpConfig,
}

impl IdentityConfig {
    pub fn from_env() -> Self {
        let jwt_secret = std::env::var("JWT_SECRET").expect("JWT_SECRET");
        // Weak signing keys are a fatal configuration error, not a runtime one.
        validate_signing_key(&jwt_secret).expect("JWT_SECRET too weak");

        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            redis_url: std::env::var("REDIS_URL").expect("REDIS_URL"),
            jwt_secret,
            exchange: std::env::var("EVENT_EXCHANGE")
                .unwrap_or_else(|_| "storefront.users".to_owned()),
            identity_port: std::env::var("IDENTITY_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3210),
            smtp: SmtpConfig {
                host: std::env::var("SMTP_HOST").unwrap_or_default(),
                port: std::env::var("SMTP_PORT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(587),
                from: std::env::var("SMTP_FROM")
                    .unwrap_or_else(|_| "Storefront <noreply@storefront.local>".to_owned()),
                username: std::env::var("SMTP_USERNAME").ok(),
                password: std::env::var("SMTP_PASSWORD").ok(),
            },
        }
    }
}
