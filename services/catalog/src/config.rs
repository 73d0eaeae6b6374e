/// Catalog service configuration loaded from environment variables.
#[derive(Debug)]
pub struct CatalogConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Redis connection URL (message transport).
    pub redis_url: String,
    /// HMAC secret for validating access tokens (shared with identity).
    pub jwt_secret: String,
    /// Topic exchange name for lifecycle events (default `storefront.users`).
    /// Env var: `EVENT_EXCHANGE`.
    pub exchange: String,
    /// Consumer group for the lifecycle queue (default `catalog`).
    /// Env var: `CONSUMER_GROUP`.
    pub consumer_group: String,
    /// TCP port to listen on (default 3211). Env var: `CATALOG_PORT`.
    pub catalog_port: u16,
}

impl CatalogConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            redis_url: std::env::var("REDIS_URL").expect("REDIS_URL"),
            jwt_secret: std::env::var("JWT_SECRET").expect("JWT_SECRET"),
            exchange: std::env::var("EVENT_EXCHANGE")
                .unwrap_or_else(|_| "storefront.users".to_owned()),
            consumer_group: std::env::var("CONSUMER_GROUP")
                .unwrap_or_else(|_| "catalog".to_owned()),
            catalog_port: std::env::var("CATALOG_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3211),
        }
    }
}
