use std::net::SocketAddr;
use std::sync::Arc;

use portal_core::middleware::rate_limit::create_ip_rate_limiter;
use portal_core::observability::logging::init_tracing;
use portal_service::{
    build_router,
    config::PortalConfig,
    db,
    services::{AccessGate, AuditRecorder, AuthService, TokenService},
    store::{PgStore, Store},
    AppState,
};
use tokio::signal;

#[tokio::main]
async fn main() -> Result<(), portal_core::error::AppError> {
    // Fail fast on bad or missing configuration, JWT_SECRET included.
    let config = Arc::new(PortalConfig::from_env()?);

    init_tracing(&config.service_name, &config.log_level);

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        environment = ?config.environment,
        "starting access portal service"
    );

    let pool = db::create_pool(&config.database)
        .await
        .map_err(|e| portal_core::error::AppError::DatabaseError(anyhow::anyhow!(e)))?;
    db::run_migrations(&pool)
        .await
        .map_err(|e| portal_core::error::AppError::DatabaseError(anyhow::anyhow!(e)))?;

    let store: Arc<dyn Store> = Arc::new(PgStore::new(pool));

    let tokens = TokenService::new(&config.jwt);
    let audit = AuditRecorder::new(store.clone());
    let auth = AuthService::new(store.clone(), tokens.clone(), audit.clone());
    let gate = AccessGate::new(store.clone(), tokens);

    let login_rate_limiter = create_ip_rate_limiter(
        config.rate_limit.login_attempts,
        config.rate_limit.login_window_seconds,
    );
    let register_rate_limiter = create_ip_rate_limiter(
        config.rate_limit.register_attempts,
        config.rate_limit.register_window_seconds,
    );

    let state = AppState {
        config: config.clone(),
        store,
        auth,
        gate,
        audit,
        login_rate_limiter,
        register_rate_limiter,
    };

    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
    tracing::info!(address = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("service shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
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
        _ = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        },
    }
}
