use sea_orm::Database;
use tracing::info;

use storefront_bus::{BusConnection, ReconnectPolicy, StreamPublisher};
use storefront_core::tracing::init_tracing;
use storefront_identity::config::IdentityConfig;
use storefront_identity::infra::mailer::SmtpMailer;
use storefront_identity::router::build_router;
use storefront_identity::state::AppState;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = IdentityConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let redis_cfg = deadpool_redis::Config::from_url(&config.redis_url);
    let redis = redis_cfg
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .expect("failed to create Redis pool");

    let bus = BusConnection::new(redis, ReconnectPolicy::default());
    let publisher = StreamPublisher::new(bus, config.exchange.clone());

    let mailer = SmtpMailer::new(&config.smtp).expect("failed to configure mailer");

    let state = AppState {
        db,
        publisher,
        mailer,
        jwt_secret: config.jwt_secret,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.identity_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("identity service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
