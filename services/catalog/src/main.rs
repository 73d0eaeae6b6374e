use sea_orm::Database;
use tokio::sync::watch;
use tracing::info;
use uuid::Uuid;

use storefront_bus::{BusConnection, ReconnectPolicy, StreamSubscriber};
use storefront_catalog::config::CatalogConfig;
use storefront_catalog::consumer::lifecycle_consumer;
use storefront_catalog::infra::db::DbProductRepository;
use storefront_catalog::router::build_router;
use storefront_catalog::state::AppState;
use storefront_core::tracing::init_tracing;
use storefront_events::ROUTING_KEYS;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = CatalogConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let redis_cfg = deadpool_redis::Config::from_url(&config.redis_url);
    let redis = redis_cfg
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .expect("failed to create Redis pool");

    // The consumer owns its own transport connection; request handlers never
    // touch it, so publish-side and consume-side traffic cannot interleave on
    // one channel.
    let bus = BusConnection::new(redis, ReconnectPolicy::default());
    let consumer_name = format!("catalog-{}", Uuid::new_v4());
    let subscriber = StreamSubscriber::bind(
        bus,
        config.exchange.clone(),
        config.consumer_group.clone(),
        consumer_name,
        &ROUTING_KEYS,
    )
    .await
    .expect("failed to bind lifecycle queue");

    let consumer = lifecycle_consumer(
        subscriber,
        DbProductRepository { db: db.clone() },
    );
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let consumer_handle = tokio::spawn(consumer.run(shutdown_rx));

    let state = AppState {
        db,
        jwt_secret: config.jwt_secret,
    };
    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.catalog_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("catalog service listening on {addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .expect("server error");

    // Stop intake, let the in-flight handler finish, release the connection.
    let _ = shutdown_tx.send(true);
    let _ = consumer_handle.await;
    info!("catalog service stopped");
}
