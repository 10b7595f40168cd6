use std::sync::Arc;
use std::time::Duration;

use salvo::conn::TcpListener;
use salvo::{Listener, Router};
use tracing_subscriber::{fmt, layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

use schedula_app::api::routes;
use schedula_app::middleware::deadline::DeadlineMiddleware;
use schedula_app::service_handler::ServiceHandler;
use schedula_core::config::load_config;
use schedula_db::db::connection::{create_pool, PoolOptions};
use schedula_db::store::PgCalendarStore;
use schedula_service::appointments::AppointmentService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt::layer().with_target(true))
        .init();

    tracing::info!("Starting Schedula appointment server");

    let config = load_config()?;

    tracing::info!(config = ?config, "Configuration loaded");

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping info");
    }

    let pool = create_pool(
        &config.database.url,
        PoolOptions {
            max_size: config.database.max_open_conns,
            min_idle: config.database.max_idle_conns,
            max_lifetime: Duration::from_secs(config.database.conn_max_lifetime_secs),
            idle_timeout: Duration::from_secs(config.database.conn_max_idle_time_secs),
        },
    )
    .await?;

    let store = Arc::new(PgCalendarStore::new(pool));
    let service = Arc::new(AppointmentService::new(store));

    let bind_addr = config.server.bind_addr();
    let acceptor = TcpListener::new(bind_addr.clone()).bind().await;

    let router = Router::new()
        .hoop(ServiceHandler { service })
        .hoop(DeadlineMiddleware::new(Duration::from_secs(
            config.rpc.request_timeout_secs,
        )))
        .push(routes());

    let server = salvo::Server::new(acceptor);
    let handle = server.handle();
    let shutdown_timeout = Duration::from_secs(config.shutdown.timeout_secs);

    // Refuse new requests on SIGINT/SIGTERM and grant in-flight handlers a
    // bounded grace period before forceful stop.
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!(
                timeout_secs = shutdown_timeout.as_secs(),
                "shutdown signal received"
            );
            handle.stop_graceful(shutdown_timeout);
        }
    });

    tracing::info!("Server listening on {bind_addr}");

    server.serve(router).await;

    tracing::info!("Server stopped");

    Ok(())
}
