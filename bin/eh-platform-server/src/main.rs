//! EventHub Platform Server
//!
//! Serves the REST API under `/api/v1`, `/health`, and Swagger UI at
//! `/swagger-ui`. Configuration comes from the environment; see
//! `eh_platform::config` for the full variable list.

use anyhow::Result;
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use eh_platform::api::{platform_router, PlatformServices};
use eh_platform::config::{LogFormat, PlatformConfig};
use eh_platform::repository::{connect_pool, init_schema};
use eh_platform::service::Argon2Config;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = PlatformConfig::from_env()?;
    init_tracing(config.log_format);

    info!("Starting EventHub Platform Server");

    info!("Connecting to database: {}", config.database_url);
    let pool = connect_pool(&config.database_url, config.db_max_connections).await?;
    init_schema(&pool).await?;
    info!("Schema ready");

    let services = PlatformServices::sqlite(
        pool.clone(),
        config.auth_config(),
        Argon2Config::default(),
        config.store_timeout,
    );
    info!(
        token_ttl_hours = config.token_ttl_hours,
        store_timeout_ms = config.store_timeout.as_millis() as u64,
        "Services initialized"
    );

    let app = platform_router(services)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any));

    let api_addr = format!("0.0.0.0:{}", config.api_port);
    info!("API server listening on http://{}", api_addr);

    let listener = TcpListener::bind(&api_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    info!("EventHub Platform Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received...");
}
