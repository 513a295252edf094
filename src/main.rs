use anyhow::Context;
use axum::serve;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use employee_hr::{
    AppState,
    config::Config,
    db::{self, MongoEmployeeStore},
    router,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("employee_hr=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let db = match db::connect(&config).await {
        Ok(db) => db,
        Err(e) => {
            error!(database = %config.database, "could not connect to MongoDB: {}", e);
            return Err(e).context("database connection failed");
        }
    };

    let state = AppState::new(MongoEmployeeStore::new(&db, config.request_timeout));
    let app = router(state);

    let listener = TcpListener::bind(&config.server_address)
        .await
        .with_context(|| format!("failed to bind {}", config.server_address))?;
    info!("listening on {}", config.server_address);

    serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutting down");
}
