use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::{net::TcpListener, signal};
use tracing::{error, info, warn};

use crate::blacklist::{spawn_purge_task, PgBlacklist, TokenBlacklist};
use crate::config;
use crate::database::DatabaseManager;
use crate::routes;
use crate::state::AppState;

pub async fn handle(port: Option<u16>) -> anyhow::Result<()> {
    let config = config::config();
    info!("Starting Astronomy Catalog API in {:?} mode", config.environment);

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    if config.database.run_migrations {
        DatabaseManager::migrate(&pool).await.context("failed to apply migrations")?;
    }

    let blacklist: Arc<dyn TokenBlacklist> = Arc::new(PgBlacklist::new(pool.clone()));
    let state = AppState::new(pool, config, blacklist.clone()).context("JWT_SECRET must be set")?;
    let purge = spawn_purge_task(
        blacklist,
        Duration::from_secs(config.security.blacklist_purge_interval_secs.max(1)),
    );

    if crate::is_production!() && config.security.cors_origins.iter().any(|o| o == "*") {
        warn!("CORS allows any origin in production");
    }

    let app = routes::app(state, &config.security.cors_origins);
    let addr = SocketAddr::from(([0, 0, 0, 0], port.unwrap_or(config.server.port)));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    purge.abort();
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
