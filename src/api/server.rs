//! API server lifecycle — binds the configured address, mounts
//! `api_router()` and serves until ctrl-c.

use crate::api::router::api_router;
use crate::api::types::ApiContext;
use crate::{config, db};

/// Run the API server until shutdown.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let data_dir = config::data_dir();
    std::fs::create_dir_all(&data_dir)?;

    // Open once up front so migrations run before the first request.
    let db_path = config::db_path();
    db::open_database(&db_path)?;

    let (admin_email, admin_password) = config::admin_credentials();
    let ctx = ApiContext::new(db_path, config::jwt_secret(), admin_email, admin_password);
    let app = api_router(ctx);

    let addr = config::bind_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("{} listening on {addr}", config::APP_NAME);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Shutdown signal received");
}
